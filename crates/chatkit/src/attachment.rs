use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

type ActionProducer<R> = Rc<dyn Fn() -> LocalBoxFuture<'static, Option<R>>>;

/// A host-defined way to pick something to attach, e.g. a photo picker or file import.
///
/// `R` is the concrete result the host wants back. The producer may suspend for as
/// long as the picker is open; yielding `None` means the user backed out.
pub struct AttachmentAction<R> {
    title: String,
    icon: Option<String>,
    producer: ActionProducer<R>,
}

impl<R: 'static> AttachmentAction<R> {
    pub fn new<F, Fut>(title: impl Into<String>, producer: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Option<R>> + 'static,
    {
        Self {
            title: title.into(),
            icon: None,
            producer: Rc::new(move || producer().boxed_local()),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Starts the producer. An empty result is reported as a cancellation, never an error.
    pub fn trigger(&self) -> LocalBoxFuture<'static, AttachmentOutcome<R>> {
        let pending = (self.producer)();
        let title = self.title.clone();

        async move {
            match pending.await {
                Some(result) => AttachmentOutcome::Picked(result),
                None => {
                    tracing::debug!("attachment action '{title}' finished without a result");
                    AttachmentOutcome::Cancelled
                }
            }
        }
        .boxed_local()
    }
}

impl<R> Clone for AttachmentAction<R> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            icon: self.icon.clone(),
            producer: self.producer.clone(),
        }
    }
}

impl<R> fmt::Debug for AttachmentAction<R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AttachmentAction")
            .field("title", &self.title)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOutcome<R> {
    Picked(R),
    Cancelled,
}

impl<R> AttachmentOutcome<R> {
    pub fn picked(self) -> Option<R> {
        match self {
            Self::Picked(result) => Some(result),
            Self::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;

    use super::*;

    #[test]
    fn picked_result_is_forwarded() {
        let action = AttachmentAction::new("Photo", || async { Some(42u32) }).with_icon("image");
        assert_eq!(action.icon(), Some("image"));
        assert_eq!(block_on(action.trigger()), AttachmentOutcome::Picked(42));
    }

    #[test]
    fn empty_result_is_a_cancellation() {
        let action: AttachmentAction<String> = AttachmentAction::new("File", || async { None });
        let outcome = block_on(action.trigger());
        assert_eq!(outcome, AttachmentOutcome::Cancelled);
        assert_eq!(outcome.picked(), None);
    }

    #[test]
    fn producer_is_deferred_until_triggered() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let action = AttachmentAction::new("Camera", move || {
            counter.set(counter.get() + 1);
            async { Some(()) }
        });
        assert_eq!(calls.get(), 0);

        let cloned = action.clone();
        block_on(cloned.trigger());
        block_on(action.trigger());
        assert_eq!(calls.get(), 2);
    }
}
