use little_chat_model::{ModelProvider, Turn};

use super::{IdleCallback, PendingCallback, Session, TurnCallback};
use crate::exchange::ExchangeClient;

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) exchange_client: ExchangeClient,
    pub(crate) on_turn: Option<TurnCallback>,
    pub(crate) on_pending: Option<PendingCallback>,
    pub(crate) on_idle: Option<IdleCallback>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified model provider.
    ///
    /// The provider carries all configuration needed to reach the service,
    /// the session doesn't look anywhere else for it.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            exchange_client: ExchangeClient::new(provider),
            on_turn: None,
            on_pending: None,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked for every recorded turn.
    #[inline]
    pub fn on_turn(
        mut self,
        on_turn: impl Fn(&Turn) + Send + Sync + 'static,
    ) -> Self {
        self.on_turn = Some(Box::new(on_turn));
        self
    }

    /// Attaches a callback to be invoked whenever an exchange starts
    /// (`true`) or settles (`false`).
    #[inline]
    pub fn on_pending(
        mut self,
        on_pending: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_pending = Some(Box::new(on_pending));
        self
    }

    /// Attaches a callback to be invoked when the session is ready for the
    /// next input after an exchange.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the session.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[inline]
    pub fn build(self) -> Session {
        Session::spawn_from_builder(self)
    }
}
