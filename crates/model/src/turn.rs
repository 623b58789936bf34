use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the session.
    User,
    /// The completion service.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => "user".fmt(f),
            Role::Assistant => "assistant".fmt(f),
        }
    }
}

/// One utterance in the conversation.
///
/// A turn can't be modified once created. Its serialized form is the
/// `{"role": ..., "content": ...}` object that chat-completion services
/// exchange on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Creates a turn with an explicit role.
    #[inline]
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user turn.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns the role that produced this turn.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the body of this turn.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the turn and returns its body.
    #[inline]
    pub fn into_content(self) -> String {
        self.content
    }
}
