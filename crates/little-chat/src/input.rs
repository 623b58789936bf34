//! Handing typed lines to a session.

use little_chat_core::Session;

/// What became of a line passed to [`commit_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    /// The line is now a user turn and an exchange has started.
    Sent,
    /// The session was busy or the line was blank, so the line was dropped.
    Discarded,
    /// The session is gone.
    Closed,
}

/// Places `line` in the session's draft and submits it.
///
/// The session decides whether the line is accepted: an accepted submit
/// clears the draft, a rejected one leaves it in place. A leftover draft is
/// cleared again so it doesn't linger into the next line.
pub async fn commit_line(session: &Session, line: &str) -> Commit {
    session.set_draft(line);
    session.submit(line);
    let Some(view) = session.snapshot().await else {
        return Commit::Closed;
    };
    if view.draft.is_empty() {
        Commit::Sent
    } else {
        session.set_draft("");
        Commit::Discarded
    }
}
