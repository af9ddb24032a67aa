use crate::capability::ChatMessage;
use crate::ids::MessageId;

/// Near-bottom distance used to resume follow mode deterministically.
pub const AUTO_FOLLOW_RESUME_THRESHOLD: f32 = 24.0;

/// Where the message list is looking.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScrollPosition {
    /// Pinned to the newest message; appends keep it pinned.
    #[default]
    Bottom,
    /// Held at a message with a pixel offset from that message's top edge.
    Anchored { message_id: MessageId, offset: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    TowardOlder,
    TowardNewer,
}

/// One user-driven scroll step as measured by the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollObservation {
    pub direction: ScrollDirection,
    pub distance_from_bottom: f32,
    /// Topmost visible message and how far into it the viewport starts.
    pub first_visible: Option<(MessageId, f32)>,
}

/// Follow-bottom state independent from any toolkit scroll handle.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    position: ScrollPosition,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &ScrollPosition {
        &self.position
    }

    pub fn is_at_bottom(&self) -> bool {
        matches!(self.position, ScrollPosition::Bottom)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.position = ScrollPosition::Bottom;
    }

    /// Anchors at `message_id` if the current snapshot contains it.
    ///
    /// Returns `false` and leaves the position untouched otherwise; whether that is an
    /// error is up to the caller.
    pub fn scroll_to_message<M: ChatMessage>(
        &mut self,
        message_id: &MessageId,
        messages: &[M],
    ) -> bool {
        if !messages.iter().any(|message| message.id() == message_id) {
            tracing::debug!("scroll target {message_id} is not in the current snapshot");
            return false;
        }

        self.position = ScrollPosition::Anchored {
            message_id: message_id.clone(),
            offset: 0.0,
        };
        true
    }

    /// Reconciles the position with a new snapshot and returns whether the list should
    /// jump to its tail.
    ///
    /// Appends never move an anchored view. An anchor whose message disappeared falls
    /// back to the bottom.
    pub fn messages_changed<M: ChatMessage>(&mut self, messages: &[M]) -> bool {
        if let ScrollPosition::Anchored { message_id, .. } = &self.position
            && !messages.iter().any(|message| message.id() == message_id)
        {
            tracing::debug!("scroll anchor {message_id} vanished, pinning to bottom");
            self.position = ScrollPosition::Bottom;
        }

        self.is_at_bottom()
    }

    /// Applies follow-mode hysteresis to a user scroll.
    pub fn user_scrolled(&mut self, observation: ScrollObservation) {
        let near_bottom = observation.distance_from_bottom <= AUTO_FOLLOW_RESUME_THRESHOLD;

        match (self.is_at_bottom(), observation.direction) {
            (true, ScrollDirection::TowardOlder) => {
                // Pause follow mode only when the user manually scrolls away from the tail.
                if let Some((message_id, offset)) = observation.first_visible {
                    self.position = ScrollPosition::Anchored { message_id, offset };
                }
            }
            (true, ScrollDirection::TowardNewer) => {}
            (false, ScrollDirection::TowardNewer) if near_bottom => {
                self.position = ScrollPosition::Bottom;
            }
            (false, _) => {
                if let Some((message_id, offset)) = observation.first_visible {
                    self.position = ScrollPosition::Anchored { message_id, offset };
                }
            }
        }
    }
}
