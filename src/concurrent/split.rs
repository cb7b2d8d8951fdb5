//! Splitting a pair sequence into two parallel sequences.

use std::iter::FusedIterator;

use crate::error::Result;
use crate::handoff::handoff;
use crate::par::ParSeq;
use crate::signal::Signal;
use crate::worker::{reraise_reported, spawned, SpawnConfig, WaitHandle};

/// Split a pair sequence into one sequence per half.
///
/// One worker pulls pairs from `source` and hands each half to its own
/// sequence. The two halves advance together, so they must be drained
/// concurrently: both are returned as [`ParSeq`]s.
///
/// Dropping one half only withdraws that half; the other keeps receiving its
/// values. Once both halves are dropped, the worker stops pulling and exits.
///
/// # Panics
///
/// Panics if the worker thread cannot be spawned (see [`split_with`]). A panic
/// while pulling `source` is re-raised by whichever half observes the end of
/// the stream or is dropped first.
pub fn split<I, A, B>(source: I) -> (ParSeq<SplitHalf<A>>, ParSeq<SplitHalf<B>>)
where
    I: IntoIterator<Item = (A, B)>,
    I::IntoIter: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    spawned(split_with(&SpawnConfig::default(), source))
}

/// Like [`split`], with explicit thread settings and a fallible spawn.
pub fn split_with<I, A, B>(
    config: &SpawnConfig,
    source: I,
) -> Result<(ParSeq<SplitHalf<A>>, ParSeq<SplitHalf<B>>)>
where
    I: IntoIterator<Item = (A, B)>,
    I::IntoIter: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
{
    let left_cancel = Signal::new();
    let right_cancel = Signal::new();
    let (left, left_data) = handoff(left_cancel.listener());
    let (right, right_data) = handoff(right_cancel.listener());
    let source = source.into_iter();

    let worker = config.spawn("split", move || {
        // Dropping a link ends its half; `None` marks a withdrawn half.
        let mut left = Some(left);
        let mut right = Some(right);
        for (a, b) in source {
            if left.as_ref().is_some_and(|link| link.offer(a).is_withdrawn()) {
                tracing::trace!("left split half withdrew");
                left = None;
            }
            if right.as_ref().is_some_and(|link| link.offer(b).is_withdrawn()) {
                tracing::trace!("right split half withdrew");
                right = None;
            }
            if left.is_none() && right.is_none() {
                tracing::debug!("both split halves withdrew, stopping");
                break;
            }
        }
    })?;

    let left = SplitHalf {
        data: left_data,
        cancel: left_cancel,
        worker: worker.clone(),
        finished: false,
    };
    let right = SplitHalf {
        data: right_data,
        cancel: right_cancel,
        worker,
        finished: false,
    };
    Ok((ParSeq::new(left), ParSeq::new(right)))
}

/// One half of a [`split`] pair sequence.
pub struct SplitHalf<T> {
    data: flume::Receiver<T>,
    cancel: Signal,
    worker: WaitHandle,
    finished: bool,
}

impl<T> SplitHalf<T> {
    /// Handle of the worker shared by both halves.
    pub fn wait_handle(&self) -> &WaitHandle {
        &self.worker
    }
}

impl<T> Iterator for SplitHalf<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.finished {
            return None;
        }
        match self.data.recv() {
            Ok(value) => Some(value),
            Err(flume::RecvError::Disconnected) => {
                // The link only drops without a withdrawal when the worker is
                // done, so this does not block.
                self.finished = true;
                self.worker.wait();
                None
            }
        }
    }
}

impl<T> FusedIterator for SplitHalf<T> {}

impl<T> Drop for SplitHalf<T> {
    fn drop(&mut self) {
        self.cancel.close();
        reraise_reported([&self.worker]);
    }
}
