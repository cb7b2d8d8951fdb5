//! One-shot cancellation signals.
//!
//! A [`Signal`] is owned by exactly one party, usually the consuming side of an
//! engine. Closing it (explicitly or by dropping it) wakes every [`Listener`]
//! at once, which is how withdrawal reaches worker threads blocked on a
//! handoff.

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

/// Owner side of a one-shot broadcast.
///
/// ```rust
/// use seqflow::Signal;
///
/// let mut done = Signal::new();
/// let listener = done.listener();
/// assert!(!listener.is_closed());
///
/// done.close();
/// done.close(); // closing twice is fine
/// assert!(listener.is_closed());
/// listener.wait(); // returns immediately once closed
/// ```
pub struct Signal {
    // Never carries a message; dropping the sender is the broadcast.
    trigger: Option<flume::Sender<Infallible>>,
    listener: Listener,
}

/// Observer side of a [`Signal`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct Listener {
    rx: flume::Receiver<Infallible>,
}

impl Signal {
    /// Create an open signal.
    pub fn new() -> Self {
        let (trigger, rx) = flume::bounded(0);
        Self {
            trigger: Some(trigger),
            listener: Listener { rx },
        }
    }

    /// Get a listener for this signal.
    pub fn listener(&self) -> Listener {
        self.listener.clone()
    }

    /// Close the signal. Idempotent.
    pub fn close(&mut self) {
        if self.trigger.take().is_some() {
            tracing::trace!("signal closed");
        }
    }

    /// Check whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.trigger.is_none()
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Listener {
    /// Check whether the owning signal has been closed or dropped.
    pub fn is_closed(&self) -> bool {
        self.rx.is_disconnected()
    }

    /// Block until the owning signal is closed.
    pub fn wait(&self) {
        match self.rx.recv() {
            Ok(never) => match never {},
            Err(flume::RecvError::Disconnected) => {}
        }
    }

    /// Block until the signal is closed or `timeout` elapses.
    ///
    /// Returns `true` if the signal closed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(never) => match never {},
            Err(flume::RecvTimeoutError::Disconnected) => true,
            Err(flume::RecvTimeoutError::Timeout) => false,
        }
    }

    pub(crate) fn receiver(&self) -> &flume::Receiver<Infallible> {
        &self.rx
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("closed", &self.is_closed())
            .finish()
    }
}
