use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use little_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, Role, Turn,
};
use tokio::time::sleep;

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the latest user turn after a short delay.
struct EchoModelProvider;

impl ModelProvider for EchoModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Turn, Self::Error>> + Send + 'static {
        let latest = req
            .latest()
            .filter(|turn| turn.role() == Role::User)
            .map(|turn| turn.content().to_owned());
        let history_len = req.turns.len();
        async move {
            sleep(Duration::from_millis(1)).await;
            let Some(latest) = latest else {
                return Err(FakeModelProviderError(ErrorKind::Malformed));
            };
            Ok(Turn::assistant(format!(
                "You said {latest} ({history_len} turns so far)"
            )))
        }
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = EchoModelProvider;
        let req = ModelRequest::with_turns([
            Turn::user("Hello"),
            Turn::assistant("Hi"),
            Turn::user("Good morning"),
        ]);
        let turn = provider.send_request(&req).await.unwrap();
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.content(), "You said Good morning (3 turns so far)");
    }

    #[tokio::test]
    async fn test_future_outlives_request() {
        let provider = EchoModelProvider;
        let fut = {
            let req = ModelRequest::with_turns([Turn::user("Bye")]);
            provider.send_request(&req)
        };
        let turn = tokio::spawn(fut).await.unwrap().unwrap();
        assert_eq!(turn.content(), "You said Bye (1 turns so far)");
    }

    #[tokio::test]
    async fn test_error() {
        let provider = EchoModelProvider;
        let req = ModelRequest::default();
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }
}
