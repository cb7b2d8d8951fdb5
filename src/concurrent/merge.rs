//! Merging parallel sequences into one.
//!
//! This module provides [`merge`], which drains several [`ParSeq`]s on their
//! own workers and funnels their elements through one shared handoff point.

use std::iter::FusedIterator;
use std::panic;

use crate::error::Result;
use crate::handoff::handoff;
use crate::par::ParSeq;
use crate::signal::Signal;
use crate::worker::{reraise_reported, spawned, Payload, SpawnConfig, WaitHandle};

/// Merge parallel sequences into a single sequence.
///
/// Every source gets its own worker, and all workers are started before this
/// function returns. The merged sequence yields elements in whatever order the
/// workers hand them off. Elements from one source keep their relative order.
/// It ends once every source is exhausted.
///
/// Dropping the merged sequence early cancels every worker, whether it is
/// mid-offer or between pulls.
///
/// # Panics
///
/// Panics if a worker thread cannot be spawned (see [`merge_with`]). A panic
/// in a worker is re-raised on the consuming thread by the next call to
/// `next`, and the remaining workers are cancelled. If the merged sequence is
/// dropped after a worker panicked, the drop re-raises it instead.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let mut got: Vec<_> = merge([in_par(vec![1, 2]), in_par(vec![3, 4])]).collect();
/// got.sort();
/// assert_eq!(got, vec![1, 2, 3, 4]);
/// ```
pub fn merge<I, S>(seqs: S) -> Merge<I::Item>
where
    S: IntoIterator<Item = ParSeq<I>>,
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    spawned(merge_with(&SpawnConfig::default(), seqs))
}

/// Merge parallel pair sequences. Each pair crosses the handoff as one unit,
/// so its halves are never separated.
pub fn merge2<I, S, A, B>(seqs: S) -> Merge<(A, B)>
where
    S: IntoIterator<Item = ParSeq<I>>,
    I: Iterator<Item = (A, B)> + Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    merge(seqs)
}

/// Like [`merge`], with explicit thread settings and a fallible spawn.
///
/// If spawning fails part way, the workers already started are cancelled.
pub fn merge_with<I, S>(config: &SpawnConfig, seqs: S) -> Result<Merge<I::Item>>
where
    S: IntoIterator<Item = ParSeq<I>>,
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    let cancel = Signal::new();
    let (link, data) = handoff(cancel.listener());
    let mut merged = Merge {
        data,
        cancel,
        workers: Vec::new(),
        running: Vec::new(),
        finished: false,
    };

    for (index, seq) in seqs.into_iter().enumerate() {
        let link = link.clone();
        let source = seq.into_inner();
        let worker = config.spawn(&format!("merge-{index}"), move || {
            for value in source {
                if link.offer(value).is_withdrawn() {
                    tracing::trace!(source = index, "merge consumer withdrew");
                    return;
                }
            }
        })?;
        merged.running.push(merged.workers.len());
        merged.workers.push(worker);
    }

    // From here on only the workers hold senders, so the merged sequence
    // ends exactly when the last worker exits.
    drop(link);
    Ok(merged)
}

/// Sequence returned by [`merge`].
pub struct Merge<T> {
    data: flume::Receiver<T>,
    cancel: Signal,
    workers: Vec<WaitHandle>,
    // Indices of workers not yet seen to exit.
    running: Vec<usize>,
    finished: bool,
}

enum Event<T> {
    Data(std::result::Result<T, flume::RecvError>),
    Exited(usize, std::result::Result<Payload, flume::RecvError>),
}

impl<T> Merge<T> {
    /// Handles of the workers draining each source, in source order.
    pub fn wait_handles(&self) -> &[WaitHandle] {
        &self.workers
    }

    /// Wait for the next value or the next worker exit. Exits are polled
    /// first so a busy source cannot hide a failing one.
    fn select(&self) -> Event<T> {
        let selector = self
            .running
            .iter()
            .fold(flume::Selector::new(), |selector, &index| {
                selector.recv(self.workers[index].done(), move |exit| {
                    Event::Exited(index, exit)
                })
            });
        selector.recv(&self.data, Event::Data).wait()
    }

    fn finish(&mut self) {
        self.finished = true;
        self.cancel.close();
    }
}

impl<T> Iterator for Merge<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while !self.finished {
            match self.select() {
                Event::Data(Ok(value)) => return Some(value),
                Event::Data(Err(flume::RecvError::Disconnected)) => {
                    self.finish();
                    // Every worker has dropped its sender, so these return
                    // promptly; they only matter for re-raising a panic.
                    for worker in &self.workers {
                        worker.wait();
                    }
                }
                Event::Exited(index, Ok(payload)) => {
                    tracing::debug!(source = index, "merge source panicked, cancelling the rest");
                    self.finish();
                    panic::resume_unwind(payload);
                }
                Event::Exited(index, Err(flume::RecvError::Disconnected)) => {
                    self.running.retain(|&running| running != index);
                }
            }
        }
        None
    }
}

impl<T> FusedIterator for Merge<T> {}

impl<T> Drop for Merge<T> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(workers = self.workers.len(), "merge consumer withdrew");
        }
        self.cancel.close();
        reraise_reported(&self.workers);
    }
}
