use little_chat_model::{ModelRequest, Role, Turn};
use serde::{Deserialize, Serialize};

use crate::{Error, OpenAIConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: Option<Turn>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Turn>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.turns.clone(),
    }
}

/// Extracts the assistant turn from a completion body.
///
/// Only the first choice is considered.
pub fn parse_response(body: &[u8]) -> Result<Turn, Error> {
    let completion = serde_json::from_slice::<ChatCompletion>(body)?;
    let Some(choice) = completion.choices.into_iter().next() else {
        return Err(Error::NoChoices);
    };
    let Some(turn) = choice.message else {
        return Err(Error::NoMessage);
    };
    if turn.role() != Role::Assistant {
        return Err(Error::UnexpectedRole(turn.role()));
    }
    if turn.content().is_empty() {
        return Err(Error::EmptyContent);
    }
    Ok(turn)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = ModelRequest::with_turns([
            Turn::user("Hello"),
            Turn::assistant("Hi there"),
            Turn::user("Next"),
        ]);
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Turn::user("Hello"),
                Turn::assistant("Hi there"),
                Turn::user("Next"),
            ],
        };
        let created = create_request(&request, &config);
        assert_eq!(created, expected);
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({
                "model": "custom",
                "messages": [
                    { "role": "user", "content": "Hello" },
                    { "role": "assistant", "content": "Hi there" },
                    { "role": "user", "content": "Next" },
                ],
            })
        );
    }

    #[test]
    fn test_parse_fixture() {
        let turn =
            parse_response(include_bytes!("../fixtures/completion.json"))
                .unwrap();
        assert_eq!(turn.role(), Role::Assistant);
        assert!(turn.content().starts_with("Hi there!"));
    }

    #[test]
    fn test_first_choice_wins() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } },
            ]
        });
        let turn = parse_response(body.to_string().as_bytes()).unwrap();
        assert_eq!(turn.content(), "first");
    }

    #[test]
    fn test_unusable_bodies() {
        let cases = [
            (json!({ "choices": [] }), "no choices"),
            (json!({ "error": { "message": "bad key" } }), "no choices"),
            (json!({ "choices": [{ "index": 0 }] }), "no message"),
            (
                json!({ "choices": [{ "message": { "role": "user", "content": "hi" } }] }),
                "not from the assistant",
            ),
            (
                json!({ "choices": [{ "message": { "role": "assistant", "content": "" } }] }),
                "empty",
            ),
            (
                json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] }),
                "malformed",
            ),
        ];
        for (body, expected) in cases {
            let err = parse_response(body.to_string().as_bytes()).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{body} produced {err}"
            );
        }

        let err = parse_response(b"<html>").unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }
}
