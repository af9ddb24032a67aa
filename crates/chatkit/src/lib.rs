#![deny(unsafe_code)]

//! Headless core of a composable chat surface.
//!
//! A host plugs its own message types in through the capability traits, exposes its
//! state through [`ChatDataSource`], and gets back one [`SurfaceFrame`] per render pass
//! from [`ChatSurface`]. Nothing here depends on a UI toolkit.

pub mod attachment;
pub mod capability;
pub mod error;
pub mod ids;
/// Vector-backed data source for demos and tests.
pub mod memory;
pub mod model;
pub mod presentation;
pub mod reactions;
pub mod scroll;
/// Persisted surface configuration.
pub mod settings;
pub mod slots;
pub mod source;
pub mod surface;
/// Design tokens, presets and scoped overrides.
pub mod theme;

pub use attachment::{AttachmentAction, AttachmentOutcome};
pub use capability::{
    AttachmentKind, AttachmentPreview, ChatAttachment, ChatMessage, MediaFacet, MediaMessage,
    ReactableMessage, TextMessage,
};
pub use error::{ChatKitError, ChatKitResult};
pub use ids::{AttachmentId, MessageId, ReactionId, ThoughtId};
pub use memory::{DeliveryOutcome, InMemoryChatSource};
pub use model::{
    ImageAttachment, ImageData, ImageEncoding, LinkAttachment, LinkPreview, MessageStatus,
    Reaction, Sender, StandardAttachment, StandardMessage, ThinkingSession, ThinkingThought,
};
pub use reactions::{DEFAULT_REACTIONS, QuickReaction, ReactionPalette};
pub use scroll::{
    AUTO_FOLLOW_RESUME_THRESHOLD, ScrollDirection, ScrollObservation, ScrollPosition,
    ScrollState,
};
pub use settings::{SettingsStore, SurfaceSettings};
pub use slots::{ChatSlots, SlotKind};
pub use source::{
    ChangeBroadcaster, ChangeNotifier, ChatActionHandler, ChatContent, ChatDataProvider,
    ChatDataSource, Subscription,
};
pub use surface::{
    AttachmentPayload, AttachmentSummary, ChatSurface, InputSnapshot, MessageRow, SurfaceFrame,
};
pub use theme::{Color, DesignTokens, ThemePreset, ThemeScope, TokenOverrides};
