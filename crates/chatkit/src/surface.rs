//! Composition entry point: data source + reaction palette + slots in, one render frame
//! out per pass.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use url::Url;

use crate::attachment::AttachmentOutcome;
use crate::capability::{AttachmentKind, AttachmentPreview, ChatAttachment, ChatMessage};
use crate::ids::{AttachmentId, MessageId, ReactionId};
use crate::model::{ImageData, MessageStatus, Reaction, Sender, ThinkingSession, ThinkingThought};
use crate::presentation::{day_label, starts_new_day, status_glyph, timestamp_label};
use crate::reactions::{QuickReaction, ReactionPalette};
use crate::scroll::{ScrollObservation, ScrollPosition, ScrollState};
use crate::slots::{ChatSlots, SlotKind};
use crate::source::{ChatDataSource, Subscription};
use crate::theme::{DesignTokens, ThemePreset, ThemeScope, TokenOverrides};

/// Input bar state the renderer reports on each pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub text: String,
    /// Stand-in for keyboard visibility: the input accessory shows only while focused.
    pub is_focused: bool,
}

impl InputSnapshot {
    pub fn new(text: impl Into<String>, is_focused: bool) -> Self {
        Self {
            text: text.into(),
            is_focused,
        }
    }
}

/// Owned copy of an attachment, detached from the host snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentSummary {
    pub id: AttachmentId,
    pub display_name: String,
    pub size_bytes: Option<u64>,
    pub payload: AttachmentPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentPayload {
    Image {
        image: ImageData,
        thumbnail: Option<ImageData>,
    },
    Link {
        url: Url,
        title: Option<String>,
        summary: Option<String>,
    },
    Generic,
}

impl AttachmentSummary {
    pub fn from_attachment(attachment: &dyn ChatAttachment) -> Self {
        let payload = match attachment.preview() {
            AttachmentPreview::Image { image, thumbnail } => AttachmentPayload::Image {
                image: image.clone(),
                thumbnail: thumbnail.cloned(),
            },
            AttachmentPreview::Link { url, preview } => AttachmentPayload::Link {
                url: url.clone(),
                title: preview.and_then(|preview| preview.title.clone()),
                summary: preview.and_then(|preview| preview.summary.clone()),
            },
            AttachmentPreview::Generic => AttachmentPayload::Generic,
        };

        Self {
            id: attachment.id().clone(),
            display_name: attachment.display_name().to_string(),
            size_bytes: attachment.size_bytes(),
            payload,
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        match self.payload {
            AttachmentPayload::Image { .. } => AttachmentKind::Image,
            AttachmentPayload::Link { .. } => AttachmentKind::Link,
            AttachmentPayload::Generic => AttachmentKind::Generic,
        }
    }
}

/// Everything needed to draw one message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: MessageId,
    pub sender: Sender,
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
    pub timestamp_label: String,
    /// Section header shown above this row when it starts a new calendar day.
    pub day_separator: Option<String>,
    pub text: Option<String>,
    pub attachments: Vec<AttachmentSummary>,
    pub reactions: Vec<Reaction>,
    /// Palette options; empty for system messages and messages without reactions.
    pub quick_reactions: Vec<QuickReaction>,
    /// True exactly when the message failed to deliver.
    pub show_retry: bool,
    pub status_glyph: Option<&'static str>,
    pub thinking: Option<ThinkingSession>,
}

/// Output of one composition pass.
pub struct SurfaceFrame<E> {
    pub tokens: DesignTokens,
    pub rows: Vec<MessageRow>,
    pub is_typing: bool,
    /// In-progress thoughts, present only while the host reports thinking.
    pub thinking: Option<Vec<ThinkingThought>>,
    pub scroll: ScrollPosition,
    /// Whether the list should jump to its newest row this pass.
    pub follow_tail: bool,
    pub staged_attachments: Vec<AttachmentSummary>,
    pub accessory: Option<E>,
    pub input_accessory: Option<E>,
    pub suggestions: Option<E>,
}

impl<E> SurfaceFrame<E> {
    fn empty(tokens: DesignTokens, scroll: ScrollPosition) -> Self {
        Self {
            tokens,
            rows: Vec::new(),
            is_typing: false,
            thinking: None,
            scroll,
            follow_tail: false,
            staged_attachments: Vec::new(),
            accessory: None,
            input_accessory: None,
            suggestions: None,
        }
    }

    /// Slot regions that occupy layout space this pass.
    pub fn occupied_slots(&self) -> Vec<SlotKind> {
        let mut kinds = Vec::new();
        if self.accessory.is_some() {
            kinds.push(SlotKind::Accessory);
        }
        if self.input_accessory.is_some() {
            kinds.push(SlotKind::InputAccessory);
        }
        if self.suggestions.is_some() {
            kinds.push(SlotKind::Suggestions);
        }
        kinds
    }

    pub fn row(&self, message_id: &MessageId) -> Option<&MessageRow> {
        self.rows.iter().find(|row| &row.id == message_id)
    }
}

/// A reaction change the user made that the host has not echoed back yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingReaction {
    Added,
    Removed,
}

/// The chat surface, generic over the host's data source `D` and render output `E`.
///
/// Holds only a weak reference to the source; the host stays the single owner. Dropping
/// the surface drops its change subscription.
pub struct ChatSurface<D, E>
where
    D: ChatDataSource,
{
    source: Weak<RefCell<D>>,
    palette: ReactionPalette,
    slots: ChatSlots<E>,
    theme: ThemeScope,
    scroll: ScrollState,
    changed: Rc<Cell<bool>>,
    pending_reactions: HashMap<(MessageId, String), PendingReaction>,
    staged_attachments: Vec<D::Attachment>,
    _subscription: Subscription,
}

impl<D, E> ChatSurface<D, E>
where
    D: ChatDataSource,
{
    pub fn new(source: &Rc<RefCell<D>>, palette: ReactionPalette, slots: ChatSlots<E>) -> Self {
        let changed = Rc::new(Cell::new(true));
        let flag = changed.clone();
        let subscription = source.borrow().subscribe(Box::new(move || flag.set(true)));

        Self {
            source: Rc::downgrade(source),
            palette,
            slots,
            theme: ThemeScope::root(),
            scroll: ScrollState::new(),
            changed,
            pending_reactions: HashMap::new(),
            staged_attachments: Vec::new(),
            _subscription: subscription,
        }
    }

    pub fn with_theme(mut self, tokens: DesignTokens) -> Self {
        self.set_theme(tokens);
        self
    }

    pub fn with_preset(mut self, preset: ThemePreset) -> Self {
        self.set_preset(preset);
        self
    }

    pub fn with_theme_overrides(mut self, overrides: TokenOverrides) -> Self {
        self.theme = self.theme.child(overrides);
        self
    }

    pub fn set_theme(&mut self, tokens: DesignTokens) {
        self.theme = ThemeScope::from_tokens(tokens);
    }

    pub fn set_preset(&mut self, preset: ThemePreset) {
        self.theme = ThemeScope::from_preset(preset);
    }

    pub fn set_theme_scope(&mut self, scope: ThemeScope) {
        self.theme = scope;
    }

    pub fn tokens(&self) -> DesignTokens {
        self.theme.resolve()
    }

    pub fn palette(&self) -> &ReactionPalette {
        &self.palette
    }

    pub fn slots(&self) -> &ChatSlots<E> {
        &self.slots
    }

    /// True when the host reported a change since the last composed frame.
    pub fn has_pending_changes(&self) -> bool {
        self.changed.get()
    }

    pub fn scroll_position(&self) -> &ScrollPosition {
        self.scroll.position()
    }

    pub fn compose(&mut self, input: &InputSnapshot) -> SurfaceFrame<E> {
        self.compose_at(input, Utc::now())
    }

    /// Builds a frame with day labels relative to `now`.
    pub fn compose_at(&mut self, input: &InputSnapshot, now: DateTime<Utc>) -> SurfaceFrame<E> {
        let tokens = self.theme.resolve();
        let Some(source) = self.source.upgrade() else {
            return SurfaceFrame::empty(tokens, self.scroll.position().clone());
        };

        let (rows, is_typing, thinking, follow_tail) = {
            let source = source.borrow();
            let messages = source.messages();

            let mut follow_tail = false;
            if self.changed.replace(false) {
                // A fresh snapshot is authoritative, so optimistic edits are dropped.
                self.pending_reactions.clear();
                follow_tail = self.scroll.messages_changed(messages);
            }

            let sessions = source
                .completed_thinking_sessions()
                .iter()
                .map(|session| (session.message_id().clone(), session))
                .collect::<HashMap<_, _>>();

            let mut previous_timestamp = None;
            let rows = messages
                .iter()
                .map(|message| {
                    let timestamp = message.timestamp();
                    let day_separator = starts_new_day(previous_timestamp, timestamp)
                        .then(|| day_label(timestamp, now));
                    previous_timestamp = Some(timestamp);

                    let thinking = sessions.get(message.id()).map(|session| (*session).clone());
                    self.build_row(message, day_separator, thinking)
                })
                .collect::<Vec<_>>();

            let thinking = source
                .is_thinking()
                .then(|| source.current_thoughts().to_vec());
            (rows, source.is_typing(), thinking, follow_tail)
        };

        // Producers may touch the host's state, so the snapshot borrow ends first.
        SurfaceFrame {
            tokens,
            rows,
            is_typing,
            thinking,
            scroll: self.scroll.position().clone(),
            follow_tail,
            staged_attachments: self
                .staged_attachments
                .iter()
                .map(|attachment| AttachmentSummary::from_attachment(attachment))
                .collect(),
            accessory: self.slots.produce_accessory(),
            input_accessory: self.slots.produce_input_accessory(input.is_focused),
            suggestions: self.slots.produce_suggestions(&input.text),
        }
    }

    fn build_row(
        &self,
        message: &D::Message,
        day_separator: Option<String>,
        thinking: Option<ThinkingSession>,
    ) -> MessageRow {
        let sender = message.sender();
        let status = message.status();
        let reactable = message.as_reactable();

        let reactions = reactable
            .map(|facet| self.reactions_with_pending(message.id(), facet.reactions()))
            .unwrap_or_default();
        let quick_reactions = match (reactable, sender) {
            (Some(_), Sender::CurrentUser | Sender::OtherUser) => {
                self.palette.options_for(&reactions)
            }
            _ => Vec::new(),
        };

        MessageRow {
            id: message.id().clone(),
            sender,
            status,
            timestamp: message.timestamp(),
            timestamp_label: timestamp_label(message.timestamp()),
            day_separator,
            text: message.as_text().map(|facet| facet.text().to_string()),
            attachments: message
                .as_media()
                .map(|media| {
                    media
                        .attachment_views()
                        .into_iter()
                        .map(AttachmentSummary::from_attachment)
                        .collect()
                })
                .unwrap_or_default(),
            reactions,
            quick_reactions,
            show_retry: status.is_failed(),
            status_glyph: status_glyph(sender, status),
            thinking,
        }
    }

    fn reactions_with_pending(&self, message_id: &MessageId, reactions: &[Reaction]) -> Vec<Reaction> {
        let mut reactions = reactions.to_vec();

        for ((pending_message_id, emoji), pending) in &self.pending_reactions {
            if pending_message_id != message_id {
                continue;
            }

            let existing = reactions.iter().position(|reaction| &reaction.emoji == emoji);
            match (pending, existing) {
                (PendingReaction::Added, None) => reactions.push(Reaction::new(
                    ReactionId::new(format!("pending-{message_id}-{emoji}")),
                    emoji.clone(),
                    1,
                    true,
                )),
                (PendingReaction::Added, Some(index)) if !reactions[index].is_selected => {
                    reactions[index].count += 1;
                    reactions[index].is_selected = true;
                }
                (PendingReaction::Removed, Some(index)) if reactions[index].is_selected => {
                    if reactions[index].count <= 1 {
                        reactions.remove(index);
                    } else {
                        reactions[index].count -= 1;
                        reactions[index].is_selected = false;
                    }
                }
                _ => {}
            }
        }

        reactions
    }

    fn find_message(&self, message_id: &MessageId) -> Option<(Rc<RefCell<D>>, D::Message)> {
        let source = self.source.upgrade()?;
        let message = source
            .borrow()
            .messages()
            .iter()
            .find(|message| message.id() == message_id)
            .cloned();

        match message {
            Some(message) => Some((source, message)),
            None => {
                tracing::debug!("message {message_id} is not in the current snapshot");
                None
            }
        }
    }

    /// Sends the input text together with any staged attachments.
    ///
    /// Blank text with nothing staged is ignored. Returns whether the host was called.
    pub fn send(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() && self.staged_attachments.is_empty() {
            return false;
        }
        let Some(source) = self.source.upgrade() else {
            return false;
        };

        let attachments = std::mem::take(&mut self.staged_attachments);
        tracing::debug!(attachments = attachments.len(), "forwarding send to data source");
        source
            .borrow_mut()
            .send_message(text.to_string(), attachments);
        self.scroll.scroll_to_bottom();
        true
    }

    /// Forwards a retry for a failed message. Anything else is ignored.
    pub fn retry(&mut self, message_id: &MessageId) -> bool {
        let Some((source, message)) = self.find_message(message_id) else {
            return false;
        };
        if !message.status().is_failed() {
            tracing::debug!("ignoring retry for {message_id}: message has not failed");
            return false;
        }

        source.borrow_mut().retry_message(&message);
        true
    }

    /// Quick-react from the palette. Glyphs outside the palette are ignored.
    pub fn react(&mut self, message_id: &MessageId, emoji: &str) -> bool {
        if !self.palette.offers(emoji) {
            tracing::debug!("ignoring reaction {emoji:?}: not in the configured palette");
            return false;
        }
        let Some((source, message)) = self.find_message(message_id) else {
            return false;
        };
        if message.sender() == Sender::System || message.as_reactable().is_none() {
            tracing::debug!("ignoring reaction on {message_id}: message does not take reactions");
            return false;
        }

        self.pending_reactions.insert(
            (message_id.clone(), emoji.to_string()),
            PendingReaction::Added,
        );
        source.borrow_mut().react_to_message(&message, emoji);
        true
    }

    pub fn remove_reaction(&mut self, message_id: &MessageId, emoji: &str) -> bool {
        let Some((source, message)) = self.find_message(message_id) else {
            return false;
        };

        self.pending_reactions.insert(
            (message_id.clone(), emoji.to_string()),
            PendingReaction::Removed,
        );
        source.borrow_mut().remove_reaction(&message, emoji);
        true
    }

    /// Removes the current user's reaction if selected, otherwise adds it.
    pub fn toggle_reaction(&mut self, message_id: &MessageId, emoji: &str) -> bool {
        let selected = self
            .find_message(message_id)
            .and_then(|(_, message)| {
                message.as_reactable().map(|facet| {
                    facet
                        .reactions()
                        .iter()
                        .any(|reaction| reaction.emoji == emoji && reaction.is_selected)
                })
            })
            .unwrap_or(false);

        if selected {
            self.remove_reaction(message_id, emoji)
        } else {
            self.react(message_id, emoji)
        }
    }

    /// Stages a picked attachment for the next send; cancellations are dropped.
    pub fn stage_attachment(&mut self, outcome: AttachmentOutcome<D::Attachment>) -> bool {
        match outcome.picked() {
            Some(attachment) => {
                self.staged_attachments.push(attachment);
                true
            }
            None => false,
        }
    }

    pub fn unstage_attachment(&mut self, attachment_id: &AttachmentId) {
        self.staged_attachments
            .retain(|attachment| attachment.id() != attachment_id);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
    }

    pub fn scroll_to_message(&mut self, message_id: &MessageId) -> bool {
        let Some(source) = self.source.upgrade() else {
            return false;
        };
        let source = source.borrow();
        self.scroll.scroll_to_message(message_id, source.messages())
    }

    pub fn user_scrolled(&mut self, observation: ScrollObservation) {
        self.scroll.user_scrolled(observation);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::memory::{DeliveryOutcome, InMemoryChatSource};
    use crate::model::{LinkAttachment, LinkPreview, StandardAttachment, StandardMessage};
    use crate::source::ChatDataProvider;

    fn source_with(messages: Vec<StandardMessage>) -> Rc<RefCell<InMemoryChatSource>> {
        Rc::new(RefCell::new(InMemoryChatSource::with_messages(messages)))
    }

    fn message(id: &str, status: MessageStatus) -> StandardMessage {
        StandardMessage::text(id, Sender::CurrentUser, status, format!("body {id}"))
    }

    fn surface(
        source: &Rc<RefCell<InMemoryChatSource>>,
    ) -> ChatSurface<InMemoryChatSource, String> {
        ChatSurface::new(source, ReactionPalette::new(["👍", "👎"]), ChatSlots::new())
    }

    #[test]
    fn rows_follow_snapshot_order_exactly() {
        let source = source_with(vec![
            message("c", MessageStatus::Sent),
            message("a", MessageStatus::Sent),
            message("c", MessageStatus::Read),
        ]);
        let mut surface = surface(&source);

        let frame = surface.compose(&InputSnapshot::default());
        let ids = frame.rows.iter().map(|row| row.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["c", "a", "c"]);
    }

    #[test]
    fn only_failed_messages_offer_retry() {
        let source = source_with(vec![
            message("1", MessageStatus::Sent),
            message("2", MessageStatus::Sent),
            message("3", MessageStatus::Failed),
        ]);
        let mut surface = surface(&source);

        let frame = surface.compose(&InputSnapshot::default());
        assert!(!frame.is_typing);
        let retry_rows = frame
            .rows
            .iter()
            .filter(|row| row.show_retry)
            .map(|row| row.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(retry_rows, ["3"]);
    }

    #[test]
    fn absent_slots_reserve_no_space() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);

        let frame = surface.compose(&InputSnapshot::new("hello", true));
        assert!(frame.occupied_slots().is_empty());
    }

    #[test]
    fn slots_compose_from_input_state() {
        let source = source_with(Vec::new());
        let slots = ChatSlots::new()
            .accessory(|| Some("attach".to_string()))
            .input_accessory(|| Some("toolbar".to_string()))
            .suggestions(|text: &str| text.starts_with('/').then(|| format!("commands for {text}")));
        let mut surface: ChatSurface<InMemoryChatSource, String> =
            ChatSurface::new(&source, ReactionPalette::default(), slots);

        let idle = surface.compose(&InputSnapshot::new("hi", false));
        assert_eq!(idle.occupied_slots(), [SlotKind::Accessory]);

        let typing = surface.compose(&InputSnapshot::new("/he", true));
        assert_eq!(
            typing.occupied_slots(),
            [
                SlotKind::Accessory,
                SlotKind::InputAccessory,
                SlotKind::Suggestions
            ]
        );
        assert_eq!(typing.suggestions.as_deref(), Some("commands for /he"));
    }

    #[test]
    fn quick_react_outside_palette_is_ignored() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);
        let id = MessageId::new("1");

        assert!(!surface.react(&id, "🎉"));
        assert!(source.borrow().messages()[0].reactions.is_empty());

        assert!(surface.react(&id, "👍"));
        assert_eq!(source.borrow().messages()[0].reactions.len(), 1);

        let frame = surface.compose(&InputSnapshot::default());
        let options = &frame.rows[0].quick_reactions;
        assert_eq!(
            options.iter().map(|option| option.emoji.as_str()).collect::<Vec<_>>(),
            ["👍", "👎"]
        );
        assert!(options[0].is_selected);
    }

    #[test]
    fn react_then_remove_restores_reactions() {
        let source = source_with(vec![message("1", MessageStatus::Sent).with_reactions(vec![
            Reaction::new("r1", "👎", 2, false),
        ])]);
        let mut surface = surface(&source);
        let id = MessageId::new("1");
        let before = surface.compose(&InputSnapshot::default()).rows[0].reactions.clone();

        surface.react(&id, "👍");
        surface.remove_reaction(&id, "👍");

        let after = surface.compose(&InputSnapshot::default()).rows[0].reactions.clone();
        assert_eq!(before, after);
    }

    #[test]
    fn replacing_a_reaction_and_removing_it_restores_the_earlier_pick() {
        let source = source_with(vec![message("1", MessageStatus::Sent).with_reactions(vec![
            Reaction::new("r1", "👎", 2, true),
        ])]);
        let mut surface = surface(&source);
        let id = MessageId::new("1");
        let before = surface.compose(&InputSnapshot::default()).rows[0].reactions.clone();

        assert!(surface.react(&id, "👍"));
        let replaced = surface.compose(&InputSnapshot::default()).rows[0].reactions.clone();
        assert!(replaced.iter().all(|reaction| reaction.emoji != "👎" || !reaction.is_selected));

        assert!(surface.remove_reaction(&id, "👍"));
        let after = surface.compose(&InputSnapshot::default()).rows[0].reactions.clone();
        assert_eq!(before, after);
    }

    #[test]
    fn pending_reaction_shows_until_next_snapshot() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);
        surface.compose(&InputSnapshot::default());

        // Simulate a host that applies reactions later by swallowing the notification.
        surface.pending_reactions.insert(
            (MessageId::new("1"), "👎".to_string()),
            PendingReaction::Added,
        );
        let frame = surface.compose(&InputSnapshot::default());
        assert_eq!(frame.rows[0].reactions.len(), 1);
        assert!(frame.rows[0].reactions[0].is_selected);

        source
            .borrow_mut()
            .mark_delivery(&MessageId::new("1"), DeliveryOutcome::Delivered);
        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.rows[0].reactions.is_empty());
    }

    #[test]
    fn retry_reaches_host_only_for_failed_messages() {
        let source = source_with(vec![
            message("ok", MessageStatus::Sent),
            message("bad", MessageStatus::Failed),
        ]);
        let mut surface = surface(&source);

        assert!(!surface.retry(&MessageId::new("ok")));
        assert!(!surface.retry(&MessageId::new("missing")));
        assert!(surface.retry(&MessageId::new("bad")));
        assert_eq!(source.borrow().messages()[1].status, MessageStatus::Sending);
    }

    #[test]
    fn appends_keep_pinned_view_following() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);
        assert!(surface.compose(&InputSnapshot::default()).follow_tail);

        source
            .borrow_mut()
            .push_message(message("2", MessageStatus::Sent));
        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.follow_tail);
        assert_eq!(frame.scroll, ScrollPosition::Bottom);
    }

    #[test]
    fn appends_leave_anchor_in_place() {
        let source = source_with(vec![
            message("1", MessageStatus::Sent),
            message("2", MessageStatus::Sent),
        ]);
        let mut surface = surface(&source);
        surface.compose(&InputSnapshot::default());
        assert!(surface.scroll_to_message(&MessageId::new("1")));

        source
            .borrow_mut()
            .push_message(message("3", MessageStatus::Sent));
        let frame = surface.compose(&InputSnapshot::default());
        assert!(!frame.follow_tail);
        assert_eq!(
            frame.scroll,
            ScrollPosition::Anchored {
                message_id: MessageId::new("1"),
                offset: 0.0
            }
        );
    }

    #[test]
    fn send_forwards_staged_attachments_and_pins_bottom() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);
        surface.scroll_to_message(&MessageId::new("1"));

        assert!(!surface.send("   "));

        let link: StandardAttachment = LinkAttachment::new(
            "a1",
            Url::parse("https://example.com").unwrap(),
        )
        .with_preview(LinkPreview {
            title: Some("Example".to_string()),
            ..Default::default()
        })
        .into();
        assert!(surface.stage_attachment(AttachmentOutcome::Picked(link)));
        assert!(!surface.stage_attachment(AttachmentOutcome::Cancelled));

        let staged = surface.compose(&InputSnapshot::default()).staged_attachments;
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].kind(), AttachmentKind::Link);

        assert!(surface.send(""));
        assert!(surface.scroll_position() == &ScrollPosition::Bottom);

        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.staged_attachments.is_empty());
        let sent = frame.rows.last().unwrap();
        assert_eq!(sent.status, MessageStatus::Sending);
        assert_eq!(sent.attachments.len(), 1);
        assert!(matches!(
            &sent.attachments[0].payload,
            AttachmentPayload::Link { title: Some(title), .. } if title == "Example"
        ));
    }

    #[test]
    fn dropped_source_renders_empty_frame() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let mut surface = surface(&source);
        drop(source);

        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.rows.is_empty());
        assert!(!surface.send("hello"));
        assert!(!surface.retry(&MessageId::new("1")));
    }

    #[test]
    fn day_separators_open_each_calendar_day() {
        let day_one = Utc.with_ymd_and_hms(2026, 3, 9, 22, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let source = source_with(vec![
            StandardMessage::new("1", Sender::OtherUser, MessageStatus::Read, day_one),
            StandardMessage::new("2", Sender::OtherUser, MessageStatus::Read, day_one),
            StandardMessage::new("3", Sender::CurrentUser, MessageStatus::Read, day_two),
        ]);
        let mut surface = surface(&source);

        let frame = surface.compose_at(&InputSnapshot::default(), day_two);
        let separators = frame
            .rows
            .iter()
            .map(|row| row.day_separator.as_deref())
            .collect::<Vec<_>>();
        assert_eq!(separators, [Some("Yesterday"), None, Some("Today")]);
        assert_eq!(frame.rows[2].status_glyph, Some("Read"));
        assert_eq!(frame.rows[0].status_glyph, None);
    }

    #[test]
    fn system_messages_get_no_quick_reactions() {
        let source = source_with(vec![StandardMessage::text(
            "s",
            Sender::System,
            MessageStatus::Sent,
            "joined",
        )]);
        let mut surface = surface(&source);
        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.rows[0].quick_reactions.is_empty());

        assert!(!surface.react(&MessageId::new("s"), "👍"));
        assert!(!surface.toggle_reaction(&MessageId::new("s"), "👍"));
        assert!(source.borrow().messages()[0].reactions.is_empty());
    }

    #[test]
    fn slot_producers_may_borrow_the_source() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        let producer_source = source.clone();
        let slots = ChatSlots::new().accessory(move || {
            let source = producer_source.borrow_mut();
            Some(format!("{} messages", source.messages().len()))
        });
        let mut surface = ChatSurface::new(&source, ReactionPalette::new(["👍"]), slots);

        let frame = surface.compose(&InputSnapshot::default());
        assert_eq!(frame.accessory.as_deref(), Some("1 messages"));
    }

    #[test]
    fn completed_sessions_attach_to_their_message() {
        let source = source_with(vec![message("1", MessageStatus::Sent)]);
        {
            let mut source = source.borrow_mut();
            source.begin_thinking();
            source.push_thought("considering");
        }
        let mut surface = surface(&source);
        let frame = surface.compose(&InputSnapshot::default());
        assert_eq!(frame.thinking.as_ref().map(Vec::len), Some(1));

        source.borrow_mut().finish_thinking(&MessageId::new("1"));
        source.borrow_mut().finish_thinking(&MessageId::new("ghost"));
        let frame = surface.compose(&InputSnapshot::default());
        assert!(frame.thinking.is_none());
        assert_eq!(
            frame.rows[0]
                .thinking
                .as_ref()
                .map(|session| session.thoughts().len()),
            Some(1)
        );
    }

    #[test]
    fn theme_presets_resolve_per_surface() {
        let source = source_with(Vec::new());
        let surface = surface(&source).with_preset(ThemePreset::Dark);
        assert_eq!(surface.tokens(), ThemePreset::Dark.tokens());

        let mut overrides = TokenOverrides::default();
        overrides.spacing.md = Some(16.0);
        let surface = surface.with_theme_overrides(overrides);
        let tokens = surface.tokens();
        assert_eq!(tokens.spacing.md, 16.0);
        assert_eq!(tokens.colors, ThemePreset::Dark.tokens().colors);
    }
}
