//! Shared vocabulary between the chat session and the completion services.
//!
//! This crate defines what a conversation turn looks like and the seam a
//! completion service has to implement. It doesn't perform any I/O itself;
//! transports live in their own crates (see `little-chat-openai-model`),
//! and so do fakes used for testing (see `little-chat-test-model`).

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod turn;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use turn::*;
