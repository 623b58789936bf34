use std::pin::Pin;
use std::sync::Arc;

use little_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, Role, Turn,
};
use tracing::Instrument;

type BoxedExchangeFuture = Pin<Box<dyn Future<Output = ExchangeOutcome> + Send>>;
type ExchangeFn = Arc<dyn Fn(ModelRequest) -> BoxedExchangeFuture + Send + Sync>;

/// The settled result of one exchange with the completion service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ExchangeOutcome {
    /// The service produced an assistant turn.
    Success(Turn),
    /// Anything else happened.
    Failure(ExchangeFailure),
}

impl ExchangeOutcome {
    /// Classifies a provider result.
    ///
    /// A reply that is not a non-empty assistant turn can't be recorded, so
    /// it counts as a failure too.
    pub(crate) fn from_result<E: ModelProviderError>(
        result: Result<Turn, E>,
    ) -> Self {
        match result {
            Ok(turn)
                if turn.role() == Role::Assistant
                    && !turn.content().is_empty() =>
            {
                ExchangeOutcome::Success(turn)
            }
            Ok(turn) => ExchangeOutcome::Failure(ExchangeFailure::new(
                ErrorKind::Malformed,
                format!("unusable {} reply", turn.role()),
            )),
            Err(err) => ExchangeOutcome::Failure(ExchangeFailure::new(
                err.kind(),
                err.to_string(),
            )),
        }
    }
}

/// Why an exchange didn't produce a reply.
///
/// The session treats every failure the same way; the details are kept
/// only for logging.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("remote exchange failed ({kind:?}): {reason}")]
pub(crate) struct ExchangeFailure {
    kind: ErrorKind,
    reason: String,
}

impl ExchangeFailure {
    #[inline]
    pub(crate) fn new(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// The exchange task went away before reporting an outcome.
    #[inline]
    pub(crate) fn abandoned() -> Self {
        Self::new(ErrorKind::Other, "exchange ended without an outcome")
    }
}

/// A type-erased wrapper around a model provider.
///
/// Errors never escape from here, every request resolves to an
/// [`ExchangeOutcome`].
#[derive(Clone)]
pub(crate) struct ExchangeClient {
    exchange_fn: ExchangeFn,
}

impl ExchangeClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // Erase `P` so that the session state doesn't need a generic
        // parameter.
        let exchange_fn: ExchangeFn = Arc::new(move |req: ModelRequest| {
            let turns = req.turns.len();
            let fut = provider.send_request(&req);
            let exchange: BoxedExchangeFuture = Box::pin(
                async move {
                    trace!("dispatched {turns} turns");
                    let outcome = ExchangeOutcome::from_result(fut.await);
                    trace!("settled: {outcome:?}");
                    outcome
                }
                .instrument(trace_span!("exchange")),
            );
            exchange
        });
        Self { exchange_fn }
    }

    /// Sends the request and waits for it to settle.
    #[inline]
    pub async fn exchange(&self, req: ModelRequest) -> ExchangeOutcome {
        (self.exchange_fn)(req).await
    }
}

#[cfg(test)]
mod tests {
    use little_chat_test_model::{PresetResponse, TestModelProvider};

    use super::*;

    #[tokio::test]
    async fn test_success() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::reply("Hi there"));

        let client = ExchangeClient::new(provider.clone());
        let req = ModelRequest::with_turns([Turn::user("Hello")]);
        let outcome = client.exchange(req.clone()).await;
        assert_eq!(outcome, ExchangeOutcome::Success(Turn::assistant("Hi there")));
        assert_eq!(provider.requests(), vec![req]);
    }

    #[tokio::test]
    async fn test_failure() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::failure());

        let client = ExchangeClient::new(provider);
        let outcome = client
            .exchange(ModelRequest::with_turns([Turn::user("Hello")]))
            .await;
        assert_eq!(
            outcome,
            ExchangeOutcome::Failure(ExchangeFailure::new(
                ErrorKind::Transport,
                "scripted failure"
            ))
        );
    }

    #[derive(Debug, thiserror::Error)]
    #[error("unreachable")]
    struct NeverError;

    impl ModelProviderError for NeverError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn test_unusable_replies_are_failures() {
        let outcome =
            ExchangeOutcome::from_result::<NeverError>(Ok(Turn::user("echo")));
        assert!(matches!(
            outcome,
            ExchangeOutcome::Failure(ExchangeFailure {
                kind: ErrorKind::Malformed,
                ..
            })
        ));

        let outcome =
            ExchangeOutcome::from_result::<NeverError>(Ok(Turn::assistant("")));
        assert!(matches!(outcome, ExchangeOutcome::Failure(_)));

        let outcome = ExchangeOutcome::from_result::<NeverError>(Err(NeverError));
        assert_eq!(
            outcome,
            ExchangeOutcome::Failure(ExchangeFailure::new(
                ErrorKind::Other,
                "unreachable"
            ))
        );
    }
}
