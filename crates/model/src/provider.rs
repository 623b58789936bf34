use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::turn::Turn;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a completion service.
///
/// Once the provider is created, it should behave like a stateless object.
/// Credentials and endpoints are fixed at construction time, and the
/// provider should be prepared for being dropped anytime.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends the whole conversation to the service and resolves to the turn
    /// it produced.
    ///
    /// The returned future must not borrow from `self` or `req`, so that it
    /// can be driven on a separate task.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Turn, Self::Error>> + Send + 'static;
}
