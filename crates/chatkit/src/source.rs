//! The seam between host state and the render layer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::capability::{ChatAttachment, ChatMessage};
use crate::model::{ThinkingSession, ThinkingThought};

/// Host's concrete content types. Both halves of the contract speak in these.
///
/// Messages are values: the render layer clones one out of the snapshot before handing
/// it back through [`ChatActionHandler`].
pub trait ChatContent {
    type Message: ChatMessage + Clone;
    type Attachment: ChatAttachment;
}

/// Read side: the snapshot the render layer pulls on every pass.
pub trait ChatDataProvider: ChatContent {
    /// Messages in render order. The render layer never reorders them.
    fn messages(&self) -> &[Self::Message];
    fn is_typing(&self) -> bool;
    fn is_thinking(&self) -> bool;
    fn current_thoughts(&self) -> &[ThinkingThought];
    fn completed_thinking_sessions(&self) -> &[ThinkingSession];
}

/// Write side. Every call is fire-and-forget: outcomes come back only through later
/// snapshots, e.g. a status flipping to `Failed`.
pub trait ChatActionHandler: ChatContent {
    /// Append a new outgoing message with status `Sending`.
    fn send_message(&mut self, text: String, attachments: Vec<Self::Attachment>);
    /// Re-attempt delivery of a `Failed` message. Other statuses are the host's call.
    fn retry_message(&mut self, message: &Self::Message);
    fn react_to_message(&mut self, message: &Self::Message, emoji: &str);
    fn remove_reaction(&mut self, message: &Self::Message, emoji: &str);
}

/// Change notification. Listeners run synchronously inside the host's mutation, so they
/// must only record that a change happened and never borrow the source again.
pub trait ChangeNotifier {
    fn subscribe(&self, listener: Box<dyn Fn()>) -> Subscription;
}

/// Everything a host hands to the composition entry point.
pub trait ChatDataSource: ChatDataProvider + ChatActionHandler + ChangeNotifier {}

impl<T> ChatDataSource for T where T: ChatDataProvider + ChatActionHandler + ChangeNotifier {}

type ListenerRegistry = RefCell<Vec<(u64, Rc<dyn Fn()>)>>;

/// Listener list a host embeds to implement [`ChangeNotifier`].
#[derive(Default)]
pub struct ChangeBroadcaster {
    listeners: Rc<ListenerRegistry>,
    next_listener_id: RefCell<u64>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Box<dyn Fn()>) -> Subscription {
        let listener_id = {
            let mut next = self.next_listener_id.borrow_mut();
            *next += 1;
            *next
        };
        self.listeners
            .borrow_mut()
            .push((listener_id, Rc::from(listener)));

        Subscription {
            registry: Rc::downgrade(&self.listeners),
            listener_id,
        }
    }

    pub fn notify(&self) {
        // Snapshot first so a listener may drop its own subscription while being called.
        let listeners = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();

        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Live registration. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    listener_id: u64,
}

impl Subscription {
    /// Subscription that is not attached to anything.
    pub fn detached() -> Self {
        Self {
            registry: Weak::new(),
            listener_id: 0,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .retain(|(listener_id, _)| *listener_id != self.listener_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn dropping_subscription_stops_notifications() {
        let broadcaster = ChangeBroadcaster::new();
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        let subscription = broadcaster.subscribe(Box::new(move || counter.set(counter.get() + 1)));
        broadcaster.notify();
        assert_eq!(hits.get(), 1);

        drop(subscription);
        broadcaster.notify();
        assert_eq!(hits.get(), 1);
        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_broadcaster_drops_cleanly() {
        let broadcaster = ChangeBroadcaster::new();
        let subscription = broadcaster.subscribe(Box::new(|| {}));
        drop(broadcaster);
        drop(subscription);
        drop(Subscription::detached());
    }

    #[test]
    fn every_listener_sees_each_change() {
        let broadcaster = ChangeBroadcaster::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let first_counter = first.clone();
        let _first = broadcaster.subscribe(Box::new(move || first_counter.set(first_counter.get() + 1)));
        let second_counter = second.clone();
        let _second =
            broadcaster.subscribe(Box::new(move || second_counter.set(second_counter.get() + 1)));

        broadcaster.notify();
        broadcaster.notify();
        assert_eq!((first.get(), second.get()), (2, 2));
    }
}
