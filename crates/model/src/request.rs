use crate::turn::Turn;

/// A request to be sent to the model provider.
///
/// The request always carries the complete conversation history, in the
/// order it was recorded, with the latest user turn at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The conversation so far.
    pub turns: Vec<Turn>,
}

impl ModelRequest {
    /// Creates a request from a conversation snapshot.
    #[inline]
    pub fn with_turns(turns: impl Into<Vec<Turn>>) -> Self {
        Self {
            turns: turns.into(),
        }
    }

    /// Returns the most recent turn, which is usually the user input that
    /// triggered this request.
    #[inline]
    pub fn latest(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
