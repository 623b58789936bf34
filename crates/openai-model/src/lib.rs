//! A model provider for OpenAI-compatible chat-completion APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::sync::Arc;

use bytes::Bytes;
use little_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, Role, Turn,
};
use mime::Mime;
use reqwest::{Client, StatusCode, header};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};

/// Error type for [`OpenAIProvider`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the response could not be read.
    #[error("failed to reach the completion service: {0}")]
    Transport(#[source] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("completion service answered with status {0}")]
    Status(StatusCode),
    /// The body is not a valid completion object.
    #[error("malformed completion: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The completion carries no choices.
    #[error("completion has no choices")]
    NoChoices,
    /// The first choice carries no message.
    #[error("completion choice has no message")]
    NoMessage,
    /// The first choice was not produced by the assistant.
    #[error("completion message is not from the assistant (got {0})")]
    UnexpectedRole(Role),
    /// The first choice has an empty body.
    #[error("completion message is empty")]
    EmptyContent,
}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Status(_) => ErrorKind::Status,
            Error::Malformed(_)
            | Error::NoChoices
            | Error::NoMessage
            | Error::UnexpectedRole(_)
            | Error::EmptyContent => ErrorKind::Malformed,
        }
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration this provider was created with.
    #[inline]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Turn, Self::Error>> + Send + 'static {
        let openai_req = proto::create_request(req, &self.config);
        let mut builder = self
            .client
            .post(self.config.completions_url())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(&openai_req);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        let resp_fut = builder.send();
        let turns = req.turns.len();

        async move {
            debug!("sending {turns} turns");
            let resp = resp_fut.await.map_err(Error::Transport)?;

            let status = resp.status();
            if !status.is_success() {
                return Err(Error::Status(status));
            }

            // Some gateways mislabel completions, so the body parser has
            // the final say.
            if let Some(content_type) = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !is_json(v))
            {
                warn!("completion served as {content_type}, parsing anyway");
            }

            let body: Bytes = resp.bytes().await.map_err(Error::Transport)?;
            trace!("got completion body: {} bytes", body.len());
            proto::parse_response(&body)
        }
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .parse::<Mime>()
        .map(|m| {
            m.subtype() == mime::JSON
                || m.suffix().is_some_and(|suffix| suffix == mime::JSON)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/html"));
        assert!(!is_json("text/event-stream"));
        assert!(!is_json("not a mime"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::Status(StatusCode::UNAUTHORIZED).kind(),
            ErrorKind::Status
        );
        assert_eq!(Error::NoChoices.kind(), ErrorKind::Malformed);
    }
}
