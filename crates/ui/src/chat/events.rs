use chatkit::{MessageId, ScrollObservation};

/// Emitted when the user submits the input. The text may be blank when attachments are
/// staged; the coordinator decides whether anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted whenever the input text or focus changes, so slots keyed by input state can
/// be recomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputStateChanged;

/// Emitted from a failed message's retry control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequested {
    pub message_id: MessageId,
}

/// Emitted from a reaction chip or a quick-react button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionToggled {
    pub message_id: MessageId,
    pub emoji: String,
}

/// Emitted when the user moves the message list viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportScrolled {
    pub observation: ScrollObservation,
}
