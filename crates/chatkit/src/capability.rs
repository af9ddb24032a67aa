//! Capability traits a host type implements to take part in rendering.
//!
//! There is no shared base type. A host message implements [`ChatMessage`] and then
//! opts into whichever facets it actually carries. The render layer cannot name the
//! host's concrete type, so each facet is reached through a probe method on
//! [`ChatMessage`] that defaults to `None`; a type that implements the facet overrides
//! the probe with `Some(self)`.

use chrono::{DateTime, Utc};
use url::Url;

use crate::ids::{AttachmentId, MessageId};
use crate::model::{ImageData, LinkPreview, MessageStatus, Reaction, Sender};

/// Minimal contract for anything that can appear in a message list.
pub trait ChatMessage {
    fn id(&self) -> &MessageId;
    fn timestamp(&self) -> DateTime<Utc>;
    fn sender(&self) -> Sender;
    fn status(&self) -> MessageStatus;

    /// Text facet, when the message implements [`TextMessage`].
    fn as_text(&self) -> Option<&dyn TextMessage> {
        None
    }

    /// Attachment facet, when the message implements [`MediaMessage`].
    fn as_media(&self) -> Option<&dyn MediaFacet> {
        None
    }

    /// Reaction facet, when the message implements [`ReactableMessage`].
    fn as_reactable(&self) -> Option<&dyn ReactableMessage> {
        None
    }
}

pub trait TextMessage: ChatMessage {
    fn text(&self) -> &str;
}

/// A message carrying an ordered list of attachments of one host-chosen type.
pub trait MediaMessage: ChatMessage {
    type Attachment: ChatAttachment;

    fn attachments(&self) -> &[Self::Attachment];
}

pub trait ReactableMessage: ChatMessage {
    fn reactions(&self) -> &[Reaction];
}

/// Type-erased view over [`MediaMessage`] so the render layer can walk attachments
/// without knowing the host's attachment type.
pub trait MediaFacet {
    fn attachment_views(&self) -> Vec<&dyn ChatAttachment>;
}

impl<M> MediaFacet for M
where
    M: MediaMessage,
{
    fn attachment_views(&self) -> Vec<&dyn ChatAttachment> {
        self.attachments()
            .iter()
            .map(|attachment| attachment as &dyn ChatAttachment)
            .collect()
    }
}

pub trait ChatAttachment {
    fn id(&self) -> &AttachmentId;
    fn display_name(&self) -> &str;
    fn size_bytes(&self) -> Option<u64>;

    /// Payload shape used to pick a renderer. Host extensions fall back to a generic chip.
    fn preview(&self) -> AttachmentPreview<'_> {
        AttachmentPreview::Generic
    }
}

/// Borrowed description of an attachment payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachmentPreview<'a> {
    Image {
        image: &'a ImageData,
        thumbnail: Option<&'a ImageData>,
    },
    Link {
        url: &'a Url,
        preview: Option<&'a LinkPreview>,
    },
    Generic,
}

impl AttachmentPreview<'_> {
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Self::Image { .. } => AttachmentKind::Image,
            Self::Link { .. } => AttachmentKind::Link,
            Self::Generic => AttachmentKind::Generic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Image,
    Link,
    Generic,
}
