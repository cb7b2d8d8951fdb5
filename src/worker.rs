//! Worker threads and the handles used to join them.
//!
//! Every concurrent engine runs its branches on dedicated threads spawned
//! through a [`SpawnConfig`]. Each worker reports termination through a
//! [`WaitHandle`]; a worker that panics hands its payload to the handle so the
//! failure reaches whoever waits on it instead of vanishing with the thread.

use std::any::Any;
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

pub(crate) type Payload = Box<dyn Any + Send + 'static>;

/// Thread settings for the workers an engine spawns.
///
/// Workers are named `<name>-<role>`, e.g. `seqflow-merge-2` or
/// `seqflow-join-left`.
///
/// ```rust
/// use seqflow::SpawnConfig;
///
/// let config = SpawnConfig::new()
///     .with_name("ingest")
///     .with_stack_size(256 * 1024);
/// assert_eq!(config.name(), "ingest");
/// assert_eq!(config.stack_size(), Some(256 * 1024));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    name: Cow<'static, str>,
    stack_size: Option<usize>,
}

impl SpawnConfig {
    /// Default name prefix for worker threads.
    pub const DEFAULT_NAME: &'static str = "seqflow";

    /// Create a config with the default name and the platform stack size.
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed(Self::DEFAULT_NAME),
            stack_size: None,
        }
    }

    /// Set the thread name prefix.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the stack size of worker threads, in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }

    /// Start `body` on a new thread and return its join point.
    pub(crate) fn spawn<F>(&self, role: &str, body: F) -> Result<WaitHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let worker: Arc<str> = Arc::from(format!("{}-{}", self.name, role));
        let (report, done) = flume::bounded(1);

        let mut builder = thread::Builder::new().name(worker.to_string());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }

        let name = Arc::clone(&worker);
        builder
            .spawn(move || {
                tracing::trace!(worker = %name, "worker started");
                match panic::catch_unwind(AssertUnwindSafe(body)) {
                    Ok(()) => tracing::trace!(worker = %name, "worker finished"),
                    Err(payload) => {
                        tracing::error!(
                            worker = %name,
                            message = %panic_message(payload.as_ref()),
                            "worker panicked"
                        );
                        // Capacity 1 and a single send: never blocks.
                        let _ = report.send(payload);
                    }
                }
            })
            .map_err(|source| Error::Spawn {
                worker: worker.to_string(),
                source,
            })?;

        Ok(WaitHandle { worker, done })
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Deferred join point for a worker thread.
///
/// Calling [`wait`](Self::wait) blocks until the worker has fully terminated.
/// Handles are cheap to clone, and any clone may wait any number of times from
/// any thread. If the worker panicked, the first wait to observe it re-raises
/// the panic on the waiting thread; later waits return normally.
#[derive(Clone)]
pub struct WaitHandle {
    worker: Arc<str>,
    // Disconnects when the worker exits; carries the payload if it panicked.
    done: flume::Receiver<Payload>,
}

impl WaitHandle {
    /// Thread name of the worker.
    pub fn name(&self) -> &str {
        &self.worker
    }

    /// Check whether the worker has terminated, without blocking.
    pub fn is_finished(&self) -> bool {
        self.done.is_disconnected()
    }

    /// Block until the worker terminates.
    ///
    /// # Panics
    ///
    /// Resumes the worker's panic, if it had one that no other wait has
    /// observed yet.
    pub fn wait(&self) {
        if let Ok(payload) = self.done.recv() {
            panic::resume_unwind(payload);
        }
    }

    /// Block until the worker terminates or `timeout` elapses.
    ///
    /// Returns `true` if the worker terminated.
    ///
    /// # Panics
    ///
    /// Same as [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Ok(payload) => panic::resume_unwind(payload),
            Err(flume::RecvTimeoutError::Disconnected) => true,
            Err(flume::RecvTimeoutError::Timeout) => false,
        }
    }

    /// Completion channel: yields the payload if the worker panicked,
    /// disconnects once it has exited.
    pub(crate) fn done(&self) -> &flume::Receiver<Payload> {
        &self.done
    }

    /// Block until the worker terminates, reporting a panic as an error
    /// instead of resuming it.
    pub fn join(&self) -> Result<()> {
        match self.done.recv() {
            Ok(payload) => Err(Error::WorkerPanicked {
                worker: self.worker.to_string(),
                message: panic_message(payload.as_ref()),
            }),
            Err(flume::RecvError::Disconnected) => Ok(()),
        }
    }
}

impl fmt::Debug for WaitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitHandle")
            .field("worker", &self.worker)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Wait on every handle in turn, blocking until all workers have terminated.
///
/// # Panics
///
/// Resumes the first worker panic encountered.
pub fn wait_all<I>(handles: I)
where
    I: IntoIterator,
    I::Item: Borrow<WaitHandle>,
{
    for handle in handles {
        handle.borrow().wait();
    }
}

/// Re-raise a panic that one of `handles` already reported, without blocking
/// on workers that are still running.
///
/// Engines call this when their output is dropped, so a failure is not lost
/// just because the consumer stopped reading. Nothing is raised while the
/// current thread is already unwinding.
pub(crate) fn reraise_reported<'a>(handles: impl IntoIterator<Item = &'a WaitHandle>) {
    if thread::panicking() {
        return;
    }
    for handle in handles {
        if let Ok(payload) = handle.done.try_recv() {
            panic::resume_unwind(payload);
        }
    }
}

/// Unwrap the result of spawning for the entry points that have no error
/// channel, mirroring `std::thread::spawn`.
pub(crate) fn spawned<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
