//! The append-only record of a conversation.

use little_chat_model::Turn;

/// Error returned when a turn can't be recorded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    /// The turn has no content.
    #[error("refusing to record an empty {0} turn")]
    EmptyContent(little_chat_model::Role),
}

/// Ordered turns of a conversation.
///
/// Turns can only be appended. The order is the display order and also the
/// exact order in which the history is sent to the completion service.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Adds a turn to the end.
    ///
    /// Only emptiness is checked here. Trimming user input is up to the
    /// caller.
    pub fn append(&mut self, turn: Turn) -> Result<(), TranscriptError> {
        if turn.content().is_empty() {
            return Err(TranscriptError::EmptyContent(turn.role()));
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Returns a copy of every turn, oldest first.
    #[inline]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Returns the number of recorded turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the most recent turn.
    #[inline]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Iterates over the turns, oldest first.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use little_chat_model::Role;

    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut transcript = Transcript::default();
        transcript.append(Turn::user("Hello")).unwrap();
        transcript.append(Turn::assistant("Hi there")).unwrap();
        transcript.append(Turn::user("Next")).unwrap();

        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.snapshot(),
            vec![
                Turn::user("Hello"),
                Turn::assistant("Hi there"),
                Turn::user("Next"),
            ]
        );
        assert_eq!(transcript.last(), Some(&Turn::user("Next")));
    }

    #[test]
    fn test_reject_empty() {
        let mut transcript = Transcript::default();
        let err = transcript.append(Turn::assistant("")).unwrap_err();
        assert_eq!(err, TranscriptError::EmptyContent(Role::Assistant));
        assert!(transcript.is_empty());

        // Whitespace is content as far as the store is concerned.
        transcript.append(Turn::user(" ")).unwrap();
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut transcript = Transcript::default();
        transcript.append(Turn::user("Hello")).unwrap();
        let snapshot = transcript.snapshot();
        transcript.append(Turn::assistant("Hi")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.iter().count(), 2);
    }
}
