use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::capability::{
    AttachmentPreview, ChatAttachment, ChatMessage, MediaFacet, MediaMessage, ReactableMessage,
    TextMessage,
};
use crate::ids::{AttachmentId, MessageId, ReactionId, ThoughtId};

/// Who authored a message, relative to the person looking at the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    CurrentUser,
    OtherUser,
    System,
}

/// Delivery lifecycle reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Short glyph shown next to outgoing messages.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Sending => "…",
            Self::Sent => "✓",
            Self::Delivered => "✓✓",
            Self::Read => "Read",
            Self::Failed => "!",
        }
    }
}

/// Aggregated reaction for one emoji on one message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    pub emoji: String,
    pub count: u32,
    /// Whether the current user is one of the `count` reactors.
    pub is_selected: bool,
}

impl Reaction {
    pub fn new(
        id: impl Into<ReactionId>,
        emoji: impl Into<String>,
        count: u32,
        is_selected: bool,
    ) -> Self {
        Self {
            id: id.into(),
            emoji: emoji.into(),
            count: count.max(1),
            is_selected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEncoding {
    Png,
    Jpeg,
    Gif,
    Webp,
}

/// Encoded image bytes. Cloning shares the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub encoding: ImageEncoding,
    pub bytes: Arc<[u8]>,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
}

impl ImageData {
    pub fn new(encoding: ImageEncoding, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            encoding,
            bytes: bytes.into(),
            width_px: None,
            height_px: None,
        }
    }

    pub fn with_dimensions(mut self, width_px: u32, height_px: u32) -> Self {
        self.width_px = Some(width_px);
        self.height_px = Some(height_px);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub id: AttachmentId,
    pub display_name: String,
    pub size_bytes: Option<u64>,
    pub image: ImageData,
    pub thumbnail: Option<ImageData>,
}

impl ImageAttachment {
    pub fn new(id: impl Into<AttachmentId>, display_name: impl Into<String>, image: ImageData) -> Self {
        let size_bytes = Some(image.bytes.len() as u64);
        Self {
            id: id.into(),
            display_name: display_name.into(),
            size_bytes,
            image,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: ImageData) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}

/// Metadata fetched by the host for a shared link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttachment {
    pub id: AttachmentId,
    pub display_name: String,
    pub url: Url,
    pub preview: Option<LinkPreview>,
}

impl LinkAttachment {
    pub fn new(id: impl Into<AttachmentId>, url: Url) -> Self {
        let display_name = url.host_str().unwrap_or(url.as_str()).to_string();
        Self {
            id: id.into(),
            display_name,
            url,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: LinkPreview) -> Self {
        self.preview = Some(preview);
        self
    }
}

impl ChatAttachment for ImageAttachment {
    fn id(&self) -> &AttachmentId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    fn preview(&self) -> AttachmentPreview<'_> {
        AttachmentPreview::Image {
            image: &self.image,
            thumbnail: self.thumbnail.as_ref(),
        }
    }
}

impl ChatAttachment for LinkAttachment {
    fn id(&self) -> &AttachmentId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn size_bytes(&self) -> Option<u64> {
        None
    }

    fn preview(&self) -> AttachmentPreview<'_> {
        AttachmentPreview::Link {
            url: &self.url,
            preview: self.preview.as_ref(),
        }
    }
}

/// Built-in attachment shapes. Hosts with their own attachment types implement
/// [`ChatAttachment`] directly instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardAttachment {
    Image(ImageAttachment),
    Link(LinkAttachment),
}

impl StandardAttachment {
    fn inner(&self) -> &dyn ChatAttachment {
        match self {
            Self::Image(image) => image,
            Self::Link(link) => link,
        }
    }
}

impl ChatAttachment for StandardAttachment {
    fn id(&self) -> &AttachmentId {
        self.inner().id()
    }

    fn display_name(&self) -> &str {
        self.inner().display_name()
    }

    fn size_bytes(&self) -> Option<u64> {
        self.inner().size_bytes()
    }

    fn preview(&self) -> AttachmentPreview<'_> {
        match self {
            Self::Image(image) => image.preview(),
            Self::Link(link) => link.preview(),
        }
    }
}

impl From<ImageAttachment> for StandardAttachment {
    fn from(value: ImageAttachment) -> Self {
        Self::Image(value)
    }
}

impl From<LinkAttachment> for StandardAttachment {
    fn from(value: LinkAttachment) -> Self {
        Self::Link(value)
    }
}

/// One intermediate reasoning fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingThought {
    pub id: ThoughtId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ThinkingThought {
    pub fn new(
        id: impl Into<ThoughtId>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// Completed reasoning trace tied to exactly one message.
///
/// Fields are private so a session cannot change after construction; a newer trace for
/// the same message is a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingSession {
    message_id: MessageId,
    thoughts: Vec<ThinkingThought>,
}

impl ThinkingSession {
    pub fn new(message_id: impl Into<MessageId>, thoughts: Vec<ThinkingThought>) -> Self {
        Self {
            message_id: message_id.into(),
            thoughts,
        }
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn thoughts(&self) -> &[ThinkingThought] {
        &self.thoughts
    }

    /// Time between the first and last thought, zero for fewer than two thoughts.
    pub fn duration(&self) -> chrono::Duration {
        match (self.thoughts.first(), self.thoughts.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => chrono::Duration::zero(),
        }
    }
}

/// Ready-made message type carrying every facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardMessage {
    pub id: MessageId,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub status: MessageStatus,
    pub text: Option<String>,
    pub attachments: Vec<StandardAttachment>,
    pub reactions: Vec<Reaction>,
}

impl StandardMessage {
    pub fn new(
        id: impl Into<MessageId>,
        sender: Sender,
        status: MessageStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            sender,
            status,
            text: None,
            attachments: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Text message stamped with the current time.
    pub fn text(
        id: impl Into<MessageId>,
        sender: Sender,
        status: MessageStatus,
        text: impl Into<String>,
    ) -> Self {
        Self::new(id, sender, status, Utc::now()).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<StandardAttachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions = reactions;
        self
    }
}

impl ChatMessage for StandardMessage {
    fn id(&self) -> &MessageId {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn sender(&self) -> Sender {
        self.sender
    }

    fn status(&self) -> MessageStatus {
        self.status
    }

    fn as_text(&self) -> Option<&dyn TextMessage> {
        self.text.as_ref().map(|_| self as &dyn TextMessage)
    }

    fn as_media(&self) -> Option<&dyn MediaFacet> {
        if self.attachments.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn as_reactable(&self) -> Option<&dyn ReactableMessage> {
        Some(self)
    }
}

impl TextMessage for StandardMessage {
    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl MediaMessage for StandardMessage {
    type Attachment = StandardAttachment;

    fn attachments(&self) -> &[StandardAttachment] {
        &self.attachments
    }
}

impl ReactableMessage for StandardMessage {
    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::capability::AttachmentKind;

    #[test]
    fn standard_message_exposes_only_carried_facets() {
        let system = StandardMessage::new("m1", Sender::System, MessageStatus::Sent, Utc::now());
        assert!(system.as_text().is_none());
        assert!(system.as_media().is_none());
        assert!(system.as_reactable().is_some_and(|facet| facet.reactions().is_empty()));

        let link = LinkAttachment::new("a1", Url::parse("https://example.com/post").unwrap());
        let text = StandardMessage::text("m2", Sender::OtherUser, MessageStatus::Read, "hello")
            .with_attachments(vec![link.into()]);
        assert_eq!(text.as_text().map(|facet| facet.text()), Some("hello"));

        let views = text.as_media().map(|media| media.attachment_views()).unwrap_or_default();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].display_name(), "example.com");
        assert_eq!(views[0].preview().kind(), AttachmentKind::Link);
    }

    #[test]
    fn reaction_count_never_drops_below_one() {
        let reaction = Reaction::new("r1", "👍", 0, true);
        assert_eq!(reaction.count, 1);
    }

    #[test]
    fn thinking_session_duration_spans_first_to_last_thought() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let session = ThinkingSession::new(
            "m1",
            vec![
                ThinkingThought::new("t1", "reading", start),
                ThinkingThought::new("t2", "planning", start + chrono::Duration::seconds(3)),
            ],
        );

        assert_eq!(session.duration(), chrono::Duration::seconds(3));
        assert_eq!(session.message_id().as_str(), "m1");
        assert_eq!(ThinkingSession::new("m2", Vec::new()).duration(), chrono::Duration::zero());
    }

    #[test]
    fn image_attachment_reports_encoded_size() {
        let image = ImageData::new(ImageEncoding::Png, vec![0u8; 64]).with_dimensions(8, 8);
        let attachment = ImageAttachment::new("img", "photo.png", image);
        assert_eq!(attachment.size_bytes(), Some(64));
        assert!(matches!(
            attachment.preview(),
            AttachmentPreview::Image { thumbnail: None, .. }
        ));
    }
}
