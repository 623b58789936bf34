mod builder;
mod state;

use little_chat_model::Turn;
use tokio::sync::oneshot;

use crate::event_loop::{Event, Handle};
use crate::exchange::ExchangeClient;
use crate::transcript::Transcript;
pub use builder::SessionBuilder;
use state::{SetDraft, Stage, Submit, TakeSnapshot};

/// The assistant turn recorded when an exchange fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";

type TurnCallback = Box<dyn Fn(&Turn) + Send + Sync>;
type PendingCallback = Box<dyn Fn(bool) + Send + Sync>;
type IdleCallback = Box<dyn Fn() + Send + Sync>;

/// Everything the presentation layer needs to draw a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionView {
    /// The transcript, oldest first.
    pub turns: Vec<Turn>,
    /// Whether an exchange is in flight.
    pub pending: bool,
    /// The uncommitted input.
    pub draft: String,
}

pub(crate) struct SessionState {
    exchange_client: ExchangeClient,
    transcript: Transcript,
    draft: String,
    stage: Stage,

    on_turn: Option<TurnCallback>,
    on_pending: Option<PendingCallback>,
    on_idle: Option<IdleCallback>,
}

/// A chat session: the transcript, the input draft and at most one
/// exchange in flight.
///
/// The session state lives on its own event loop task. Methods on this
/// type only post events to it and return immediately, and events are
/// applied in the order they were posted. Cloning a `Session` gives
/// another handle to the same conversation.
#[derive(Clone)]
pub struct Session {
    handle: Handle<SessionState>,
}

impl Session {
    /// Commits `text` as the next user turn and asks the model for a reply.
    ///
    /// Nothing happens if `text` is blank or an exchange is already in
    /// flight. Input dropped this way is not kept for later.
    pub fn submit<S: Into<String>>(&self, text: S) {
        self.post(Submit(text.into()));
    }

    /// Replaces the uncommitted input.
    pub fn set_draft<S: Into<String>>(&self, text: S) {
        self.post(SetDraft(text.into()));
    }

    /// Returns the current state of the session.
    ///
    /// The view reflects every event posted before this call. Returns
    /// `None` if the session's event loop is gone.
    pub async fn snapshot(&self) -> Option<SessionView> {
        let (tx, rx) = oneshot::channel();
        self.handle.send(TakeSnapshot(tx)).ok()?;
        rx.await.ok()
    }

    fn post<E: Event<SessionState>>(&self, event: E) {
        if let Err(err) = self.handle.send(event) {
            error!("failed to post to the session: {err}");
        }
    }
}

impl Session {
    fn spawn_from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            exchange_client,
            on_turn,
            on_pending,
            on_idle,
        } = builder;

        let state = SessionState {
            exchange_client,
            transcript: Default::default(),
            draft: Default::default(),
            stage: Default::default(),
            on_turn,
            on_pending,
            on_idle,
        };
        Self {
            handle: Handle::spawn(state, "session"),
        }
    }
}
