#![deny(unsafe_code)]

//! gpui rendering for `chatkit` surfaces.
//!
//! [`chat::ChatView`] hosts any `chatkit::ChatDataSource` inside a gpui window and draws
//! the frames its `ChatSurface` composes, using gpui-component widgets themed from the
//! surface's design tokens.

/// Chat view, message list and input components.
pub mod chat;
/// Bridges design tokens to gpui colors and component themes.
pub mod theme;

pub use chat::ChatView;
