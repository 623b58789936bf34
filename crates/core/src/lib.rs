//! Conversation state and the turn-exchange protocol of a chat session.
//!
//! A [`Session`] owns the transcript, the input draft and the pending flag.
//! It admits one exchange with the completion service at a time and makes
//! sure every user turn is answered by exactly one assistant turn, either
//! the real reply or [`FALLBACK_REPLY`].

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod event_loop;
mod exchange;
mod session;
pub mod transcript;

pub use session::{FALLBACK_REPLY, Session, SessionBuilder, SessionView};
pub use transcript::Transcript;
