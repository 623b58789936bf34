//! A task that owns some state and applies events to it one at a time.
//!
//! Every mutation of the state happens inside [`Event::apply`], on the loop
//! task, so the state never needs a lock. Long-running work is spawned
//! elsewhere and reports back by sending another event.

use std::error::Error;
use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::Instrument;

type Mailbox<S> = mpsc::UnboundedSender<Box<dyn Event<S>>>;

/// Error returned when sending to an event loop that has terminated.
pub(crate) struct EventLoopClosed;

impl Debug for EventLoopClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoopClosed").finish()
    }
}

impl fmt::Display for EventLoopClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the event loop has terminated")
    }
}

impl Error for EventLoopClosed {}

/// Something that happens to the state `S`.
pub(crate) trait Event<S>: Send + Debug + 'static {
    fn apply(self: Box<Self>, state: &mut S, handle: &Handle<S>);
}

/// Handle to a running event loop.
///
/// The loop keeps running as long as a handle exists. Events applied by the
/// loop get a handle too, which they may clone into spawned tasks to report
/// back later.
pub(crate) struct Handle<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + 'static> Handle<S> {
    /// Spawns a loop owning `state` on the current tokio runtime.
    pub fn spawn(state: S, label: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mailbox = Arc::new(tx);
        tokio::spawn(
            run(Arc::downgrade(&mailbox), state, rx)
                .instrument(trace_span!("event loop", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub fn send<E: Event<S>>(&self, event: E) -> Result<(), EventLoopClosed> {
        self.mailbox
            .send(Box::new(event))
            .map_err(|_| EventLoopClosed)
    }
}

impl<S> Clone for Handle<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

async fn run<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut rx: mpsc::UnboundedReceiver<Box<dyn Event<S>>>,
) {
    debug!("started");
    while let Some(event) = rx.recv().await {
        trace!("received event: {event:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last handle has been dropped, discard the event");
            break;
        };
        trace_span!("apply event").in_scope(|| {
            event.apply(&mut state, &Handle { mailbox });
        });
    }
    debug!("will terminate");
}
