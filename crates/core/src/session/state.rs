use little_chat_model::{ModelRequest, Turn};
use tokio::sync::oneshot;

use super::{FALLBACK_REPLY, SessionState, SessionView};
use crate::event_loop::{Event, Handle};
use crate::exchange::{ExchangeFailure, ExchangeOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    Sending,
}

impl SessionState {
    fn submit(&mut self, text: String, handle: &Handle<Self>) {
        if self.stage != Stage::Idle {
            // Input is dropped, not queued.
            debug!("an exchange is in flight, dropping input");
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank input");
            return;
        }

        self.record(Turn::user(text));
        self.draft.clear();
        self.set_stage(Stage::Sending);

        let request = ModelRequest::with_turns(self.transcript.snapshot());
        let exchange_client = self.exchange_client.clone();
        let guard = SettleGuard::new(handle.clone());
        tokio::spawn(async move {
            let outcome = exchange_client.exchange(request).await;
            guard.settle(outcome);
        });
    }

    fn settle(&mut self, outcome: ExchangeOutcome) {
        if self.stage != Stage::Sending {
            warn!("got an outcome while no exchange is in flight: {outcome:?}");
            return;
        }

        let turn = match outcome {
            ExchangeOutcome::Success(turn) => turn,
            ExchangeOutcome::Failure(failure) => {
                error!("{failure}");
                Turn::assistant(FALLBACK_REPLY)
            }
        };
        self.record(turn);
        self.set_stage(Stage::Idle);

        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn record(&mut self, turn: Turn) {
        if let Err(err) = self.transcript.append(turn) {
            error!("{err}");
            return;
        }
        if let (Some(on_turn), Some(turn)) =
            (&self.on_turn, self.transcript.last())
        {
            on_turn(turn);
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        if let Some(on_pending) = &self.on_pending {
            on_pending(stage == Stage::Sending);
        }
    }

    fn view(&self) -> SessionView {
        SessionView {
            turns: self.transcript.snapshot(),
            pending: self.stage == Stage::Sending,
            draft: self.draft.clone(),
        }
    }
}

/// Reports the outcome of an exchange back to the session exactly once.
///
/// If the guard is dropped without [`SettleGuard::settle`] being called,
/// for example because the exchange panicked, a failure is reported
/// instead, so the session never stays in [`Stage::Sending`] because of a
/// broken exchange.
struct SettleGuard {
    handle: Option<Handle<SessionState>>,
}

impl SettleGuard {
    #[inline]
    fn new(handle: Handle<SessionState>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn settle(mut self, outcome: ExchangeOutcome) {
        if let Some(handle) = self.handle.take() {
            handle.send(ExchangeSettled(outcome)).ok();
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            warn!("exchange dropped before settling");
            let failure = ExchangeFailure::abandoned();
            handle
                .send(ExchangeSettled(ExchangeOutcome::Failure(failure)))
                .ok();
        }
    }
}

#[derive(Debug)]
pub struct Submit(pub String);

impl Event<SessionState> for Submit {
    fn apply(
        self: Box<Self>,
        state: &mut SessionState,
        handle: &Handle<SessionState>,
    ) {
        state.submit(self.0, handle);
    }
}

#[derive(Debug)]
pub struct SetDraft(pub String);

impl Event<SessionState> for SetDraft {
    #[inline]
    fn apply(
        self: Box<Self>,
        state: &mut SessionState,
        _handle: &Handle<SessionState>,
    ) {
        state.draft = self.0;
    }
}

#[derive(Debug)]
pub struct TakeSnapshot(pub oneshot::Sender<SessionView>);

impl Event<SessionState> for TakeSnapshot {
    #[inline]
    fn apply(
        self: Box<Self>,
        state: &mut SessionState,
        _handle: &Handle<SessionState>,
    ) {
        // The caller may have given up waiting.
        self.0.send(state.view()).ok();
    }
}

#[derive(Debug)]
struct ExchangeSettled(ExchangeOutcome);

impl Event<SessionState> for ExchangeSettled {
    fn apply(
        self: Box<Self>,
        state: &mut SessionState,
        _handle: &Handle<SessionState>,
    ) {
        state.settle(self.0);
    }
}
