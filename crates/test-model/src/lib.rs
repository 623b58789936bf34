//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::pending;
use std::sync::{Arc, Mutex, MutexGuard};

use little_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, Turn,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Shared {
    script: Vec<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each exchange. The `n`-th request (counting from
/// zero) is answered with the `n`-th scripted response, no matter what the
/// request contains. If the script runs out, the request fails.
///
/// Every request is recorded and can be inspected with
/// [`TestModelProvider::requests`]. Clones share the same script and
/// records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    shared: Arc<Mutex<Shared>>,
}

impl TestModelProvider {
    /// Appends a response to the script.
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.lock().script.push(preset);
    }

    /// Returns all requests received so far, in order.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    /// Returns how many requests have been received.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // A panicking test thread must not hide the records from the others.
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("TestModelProvider")
            .field("script", &shared.script)
            .field("requests", &shared.requests.len())
            .finish()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Turn, Self::Error>> + Send + 'static {
        let preset = {
            let mut shared = self.lock();
            let step_idx = shared.requests.len();
            shared.requests.push(req.clone());
            shared.script.get(step_idx).cloned()
        };

        async move {
            let Some(preset) = preset else {
                return Err(Error {
                    message: "no enough steps",
                    kind: ErrorKind::Other,
                });
            };
            if let Some(delay) = preset.delay {
                sleep(delay).await;
            }
            match preset.reply {
                PresetReply::Reply(content) => Ok(Turn::assistant(content)),
                PresetReply::Failure => Err(Error {
                    message: "scripted failure",
                    kind: ErrorKind::Transport,
                }),
                PresetReply::Hang => pending().await,
                PresetReply::Panic => panic!("scripted panic"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::reply("Hello, world!"));
        provider.add_response(PresetResponse::failure());

        let mut req = ModelRequest::with_turns([Turn::user("Hi")]);
        let turn = provider.send_request(&req).await.unwrap();
        assert_eq!(turn, Turn::assistant("Hello, world!"));

        req.turns.push(turn);
        req.turns.push(Turn::user("Again"));
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].turns, vec![Turn::user("Hi")]);
        assert_eq!(requests[1].turns.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let provider = TestModelProvider::default();
        provider.add_response(
            PresetResponse::reply("late").with_delay(Duration::from_secs(3)),
        );

        let req = ModelRequest::with_turns([Turn::user("Hi")]);
        let started = tokio::time::Instant::now();
        let turn = provider.send_request(&req).await.unwrap();
        assert_eq!(turn.content(), "late");
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let provider = TestModelProvider::default();
        let clone = provider.clone();
        clone.add_response(PresetResponse::reply("ok"));

        let req = ModelRequest::with_turns([Turn::user("Hi")]);
        provider.send_request(&req).await.unwrap();
        assert_eq!(clone.request_count(), 1);
    }
}
