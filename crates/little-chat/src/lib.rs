//! A terminal chat client for OpenAI-compatible completion services.
//!
//! The crate ships the `little-chat` binary. The terminal rendering used by
//! it is exposed in [`render`], so other front ends can draw a transcript
//! the same way.

#![deny(missing_docs)]

pub mod input;
pub mod render;

/// Re-exports of [`little_chat_core`] crate.
pub mod core {
    pub use little_chat_core::*;
}

/// Re-exports of [`little_chat_model`] crate.
pub mod model {
    pub use little_chat_model::*;
}
