use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a scripted exchange settles.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    /// Resolves to an assistant turn with this content.
    #[serde(rename = "reply")]
    Reply(String),
    /// Resolves to a transport error.
    #[serde(rename = "failure")]
    Failure,
    /// Never resolves.
    #[serde(rename = "hang")]
    Hang,
    /// Panics while being polled.
    #[serde(rename = "panic")]
    Panic,
}

/// The preset response for one exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// How the exchange settles.
    pub reply: PresetReply,
    /// If set, the exchange settles only after this delay.
    pub delay: Option<Duration>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` replying with `content`.
    #[inline]
    pub fn reply(content: impl Into<String>) -> Self {
        Self {
            reply: PresetReply::Reply(content.into()),
            delay: None,
        }
    }

    /// Creates a `PresetResponse` that fails.
    #[inline]
    pub fn failure() -> Self {
        Self {
            reply: PresetReply::Failure,
            delay: None,
        }
    }

    /// Creates a `PresetResponse` that never settles.
    #[inline]
    pub fn hang() -> Self {
        Self {
            reply: PresetReply::Hang,
            delay: None,
        }
    }

    /// Creates a `PresetResponse` whose future panics.
    #[inline]
    pub fn panic() -> Self {
        Self {
            reply: PresetReply::Panic,
            delay: None,
        }
    }

    /// Delays settlement by `delay`.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::reply("I have left a message for you.")
            .with_delay(Duration::from_millis(20));

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }
}
