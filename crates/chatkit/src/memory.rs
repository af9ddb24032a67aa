//! Reference data source backed by plain vectors.
//!
//! Useful for demos, previews and tests. It enforces the one-active-reaction-per-user
//! convention and keeps delivery under the caller's control through
//! [`InMemoryChatSource::mark_delivery`].
//!
//! A reaction that replaced the user's earlier pick remembers it, so removing the new
//! reaction puts the earlier one back and react/remove stay inverse operations.

use std::collections::HashMap;

use chrono::Utc;

use crate::capability::ChatMessage;
use crate::ids::{MessageId, ThoughtId};
use crate::model::{
    MessageStatus, Reaction, Sender, StandardAttachment, StandardMessage, ThinkingSession,
    ThinkingThought,
};
use crate::source::{
    ChangeBroadcaster, ChangeNotifier, ChatActionHandler, ChatContent, ChatDataProvider,
    Subscription,
};

/// Final delivery state a host reports for an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl From<DeliveryOutcome> for MessageStatus {
    fn from(value: DeliveryOutcome) -> Self {
        match value {
            DeliveryOutcome::Sent => Self::Sent,
            DeliveryOutcome::Delivered => Self::Delivered,
            DeliveryOutcome::Read => Self::Read,
            DeliveryOutcome::Failed => Self::Failed,
        }
    }
}

/// The user's earlier pick, withdrawn when they reacted with `by`.
#[derive(Debug, Clone)]
struct DisplacedReaction {
    by: String,
    index: usize,
    original: Reaction,
}

#[derive(Default)]
pub struct InMemoryChatSource {
    messages: Vec<StandardMessage>,
    is_typing: bool,
    is_thinking: bool,
    current_thoughts: Vec<ThinkingThought>,
    completed_sessions: Vec<ThinkingSession>,
    next_local_id: u64,
    displaced: HashMap<MessageId, DisplacedReaction>,
    broadcaster: ChangeBroadcaster,
}

impl InMemoryChatSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<StandardMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn push_message(&mut self, message: StandardMessage) {
        self.messages.push(message);
        self.broadcaster.notify();
    }

    /// Moves a message to its delivery outcome. Returns `false` for unknown ids.
    pub fn mark_delivery(&mut self, message_id: &MessageId, outcome: DeliveryOutcome) -> bool {
        let Some(message) = self.message_mut(message_id) else {
            return false;
        };

        message.status = outcome.into();
        self.broadcaster.notify();
        true
    }

    pub fn set_typing(&mut self, is_typing: bool) {
        if self.is_typing != is_typing {
            self.is_typing = is_typing;
            self.broadcaster.notify();
        }
    }

    /// Starts a fresh reasoning trace, discarding any unfinished one.
    pub fn begin_thinking(&mut self) {
        self.is_thinking = true;
        self.current_thoughts.clear();
        self.broadcaster.notify();
    }

    pub fn push_thought(&mut self, content: impl Into<String>) {
        if !self.is_thinking {
            tracing::debug!("dropping thought pushed outside a thinking session");
            return;
        }

        let thought_id = ThoughtId::new(format!("thought-{}", self.current_thoughts.len() + 1));
        self.current_thoughts
            .push(ThinkingThought::new(thought_id, content, Utc::now()));
        self.broadcaster.notify();
    }

    /// Seals the in-progress thoughts into a session for `message_id`.
    ///
    /// Returns `false` when no trace is in progress.
    pub fn finish_thinking(&mut self, message_id: &MessageId) -> bool {
        if !self.is_thinking {
            return false;
        }

        let thoughts = std::mem::take(&mut self.current_thoughts);
        self.completed_sessions
            .push(ThinkingSession::new(message_id.clone(), thoughts));
        self.is_thinking = false;
        self.broadcaster.notify();
        true
    }

    fn message_mut(&mut self, message_id: &MessageId) -> Option<&mut StandardMessage> {
        let message = self
            .messages
            .iter_mut()
            .find(|message| &message.id == message_id);
        if message.is_none() {
            tracing::debug!("message {message_id} is not held by the in-memory source");
        }
        message
    }

    fn alloc_message_id(&mut self) -> MessageId {
        self.next_local_id += 1;
        MessageId::new(format!("local-{}", self.next_local_id))
    }
}

impl ChatContent for InMemoryChatSource {
    type Message = StandardMessage;
    type Attachment = StandardAttachment;
}

impl ChatDataProvider for InMemoryChatSource {
    fn messages(&self) -> &[StandardMessage] {
        &self.messages
    }

    fn is_typing(&self) -> bool {
        self.is_typing
    }

    fn is_thinking(&self) -> bool {
        self.is_thinking
    }

    fn current_thoughts(&self) -> &[ThinkingThought] {
        &self.current_thoughts
    }

    fn completed_thinking_sessions(&self) -> &[ThinkingSession] {
        &self.completed_sessions
    }
}

impl ChatActionHandler for InMemoryChatSource {
    fn send_message(&mut self, text: String, attachments: Vec<StandardAttachment>) {
        let id = self.alloc_message_id();
        let mut message =
            StandardMessage::new(id, Sender::CurrentUser, MessageStatus::Sending, Utc::now())
                .with_attachments(attachments);
        if !text.is_empty() {
            message = message.with_text(text);
        }

        self.push_message(message);
    }

    fn retry_message(&mut self, message: &StandardMessage) {
        let Some(stored) = self.message_mut(message.id()) else {
            return;
        };
        if stored.status != MessageStatus::Failed {
            tracing::debug!("retry ignored for {}: status is {:?}", stored.id, stored.status);
            return;
        }

        stored.status = MessageStatus::Sending;
        self.broadcaster.notify();
    }

    fn react_to_message(&mut self, message: &StandardMessage, emoji: &str) {
        let Some(stored) = self.message_mut(message.id()) else {
            return;
        };
        if stored
            .reactions
            .iter()
            .any(|reaction| reaction.emoji == emoji && reaction.is_selected)
        {
            return;
        }

        // One active reaction per user: picking a new glyph withdraws the previous one.
        let displaced = stored
            .reactions
            .iter()
            .position(|reaction| reaction.is_selected)
            .map(|index| {
                let original = stored.reactions[index].clone();
                withdraw(&mut stored.reactions, index);
                DisplacedReaction {
                    by: emoji.to_string(),
                    index,
                    original,
                }
            });

        match stored
            .reactions
            .iter_mut()
            .find(|reaction| reaction.emoji == emoji)
        {
            Some(reaction) => {
                reaction.count += 1;
                reaction.is_selected = true;
            }
            None => {
                let reaction_id = format!("{}-{emoji}", stored.id);
                stored
                    .reactions
                    .push(Reaction::new(reaction_id, emoji, 1, true));
            }
        }

        let message_id = stored.id.clone();
        match displaced {
            Some(displaced) => {
                self.displaced.insert(message_id, displaced);
            }
            None => {
                self.displaced.remove(&message_id);
            }
        }
        self.broadcaster.notify();
    }

    fn remove_reaction(&mut self, message: &StandardMessage, emoji: &str) {
        let Some(stored) = self.message_mut(message.id()) else {
            return;
        };
        let Some(index) = stored
            .reactions
            .iter()
            .position(|reaction| reaction.emoji == emoji && reaction.is_selected)
        else {
            return;
        };

        withdraw(&mut stored.reactions, index);
        let message_id = stored.id.clone();

        if self
            .displaced
            .get(&message_id)
            .is_some_and(|displaced| displaced.by == emoji)
            && let Some(displaced) = self.displaced.remove(&message_id)
            && let Some(stored) = self.message_mut(&message_id)
        {
            restore(&mut stored.reactions, displaced);
        }
        self.broadcaster.notify();
    }
}

impl ChangeNotifier for InMemoryChatSource {
    fn subscribe(&self, listener: Box<dyn Fn()>) -> Subscription {
        self.broadcaster.subscribe(listener)
    }
}

fn restore(reactions: &mut Vec<Reaction>, displaced: DisplacedReaction) {
    match reactions
        .iter_mut()
        .find(|reaction| reaction.emoji == displaced.original.emoji)
    {
        Some(reaction) => {
            reaction.count += 1;
            reaction.is_selected = true;
        }
        None => {
            let index = displaced.index.min(reactions.len());
            reactions.insert(index, displaced.original);
        }
    }
}

fn withdraw(reactions: &mut Vec<Reaction>, index: usize) {
    if reactions[index].count <= 1 {
        reactions.remove(index);
    } else {
        reactions[index].count -= 1;
        reactions[index].is_selected = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn source_with_one_message() -> InMemoryChatSource {
        InMemoryChatSource::with_messages(vec![StandardMessage::text(
            "m1",
            Sender::OtherUser,
            MessageStatus::Read,
            "hi",
        )])
    }

    #[test]
    fn send_appends_a_sending_message() {
        let mut source = InMemoryChatSource::new();
        source.send_message("hello".to_string(), Vec::new());
        source.send_message(String::new(), Vec::new());

        let messages = source.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].status, MessageStatus::Sending);
        assert_eq!(messages[0].sender, Sender::CurrentUser);
        assert_eq!(messages[0].text.as_deref(), Some("hello"));
        assert_eq!(messages[1].text, None);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[test]
    fn delivery_and_retry_cycle() {
        let mut source = InMemoryChatSource::new();
        source.send_message("hello".to_string(), Vec::new());
        let id = source.messages()[0].id.clone();

        let snapshot = source.messages()[0].clone();
        source.retry_message(&snapshot);
        assert_eq!(source.messages()[0].status, MessageStatus::Sending);

        assert!(source.mark_delivery(&id, DeliveryOutcome::Failed));
        let failed = source.messages()[0].clone();
        source.retry_message(&failed);
        assert_eq!(source.messages()[0].status, MessageStatus::Sending);

        assert!(!source.mark_delivery(&MessageId::new("nope"), DeliveryOutcome::Sent));
    }

    #[test]
    fn react_then_remove_is_a_round_trip() {
        let mut source = InMemoryChatSource::with_messages(vec![
            StandardMessage::text("m1", Sender::OtherUser, MessageStatus::Read, "hi")
                .with_reactions(vec![Reaction::new("r1", "👍", 2, false)]),
        ]);
        let before = source.messages()[0].reactions.clone();
        let message = source.messages()[0].clone();

        source.react_to_message(&message, "👍");
        assert_eq!(source.messages()[0].reactions[0].count, 3);
        source.remove_reaction(&message, "👍");
        assert_eq!(source.messages()[0].reactions, before);

        source.react_to_message(&message, "🔥");
        source.remove_reaction(&message, "🔥");
        assert_eq!(source.messages()[0].reactions, before);
    }

    #[test]
    fn removing_a_replacement_reaction_restores_the_earlier_pick() {
        let mut source = InMemoryChatSource::with_messages(vec![
            StandardMessage::text("m1", Sender::OtherUser, MessageStatus::Read, "hi")
                .with_reactions(vec![
                    Reaction::new("r1", "😂", 1, true),
                    Reaction::new("r2", "🎉", 3, false),
                ]),
        ]);
        let before = source.messages()[0].reactions.clone();
        let message = source.messages()[0].clone();

        source.react_to_message(&message, "👍");
        let swapped = &source.messages()[0].reactions;
        assert_eq!(swapped.len(), 2);
        assert!(swapped.iter().all(|reaction| reaction.emoji != "😂"));
        source.remove_reaction(&message, "👍");
        assert_eq!(source.messages()[0].reactions, before);

        source.react_to_message(&message, "🎉");
        assert_eq!(source.messages()[0].reactions[0].emoji, "🎉");
        source.remove_reaction(&message, "🎉");
        assert_eq!(source.messages()[0].reactions, before);
    }

    #[test]
    fn one_active_reaction_per_user() {
        let mut source = source_with_one_message();
        let message = source.messages()[0].clone();

        source.react_to_message(&message, "👍");
        source.react_to_message(&message, "👍");
        source.react_to_message(&message, "😂");

        let reactions = &source.messages()[0].reactions;
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].emoji, "😂");
        assert_eq!(reactions[0].count, 1);
        assert!(reactions[0].is_selected);
    }

    #[test]
    fn mutations_notify_subscribers() {
        let mut source = source_with_one_message();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let _subscription = source.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        source.set_typing(true);
        source.set_typing(true);
        source.begin_thinking();
        source.push_thought("weighing options");
        source.finish_thinking(&MessageId::new("m1"));
        assert_eq!(hits.get(), 4);

        assert!(!source.is_thinking());
        assert_eq!(source.completed_thinking_sessions().len(), 1);
        assert!(source.current_thoughts().is_empty());
    }

    #[test]
    fn thoughts_outside_a_session_are_dropped() {
        let mut source = InMemoryChatSource::new();
        source.push_thought("stray");
        assert!(source.current_thoughts().is_empty());
        assert!(!source.finish_thinking(&MessageId::new("m1")));
    }
}
