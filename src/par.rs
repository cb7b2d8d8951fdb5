//! Parallel-marked sequences and the functions that drive them.
//!
//! Some sequences are fed by a worker that blocks until its output is taken:
//! the halves returned by [`split`](crate::split) are the typical case. Draining
//! such a sequence on the same thread as its sibling deadlocks. [`ParSeq`]
//! marks these sequences in the type system: it is not an [`Iterator`], so the
//! only ways to drain it are [`par_consume`], [`merge`](crate::merge), or the
//! explicit [`ParSeq::into_inner`] escape hatch.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use seqflow::prelude::*;
//!
//! let (names, ages) = split(vec![("ada", 36), ("alan", 41)]);
//!
//! let collected = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&collected);
//! let names_done = par_consume(names, move |seq| sink.lock().unwrap().extend(seq));
//! let ages_done = par_consume(ages, |seq| assert_eq!(seq.sum::<i32>(), 77));
//!
//! wait_all([names_done, ages_done]);
//! assert_eq!(*collected.lock().unwrap(), vec!["ada", "alan"]);
//! ```

use crate::error::Result;
use crate::worker::{spawned, SpawnConfig, WaitHandle};

/// A sequence that must be drained by a dedicated worker.
#[derive(Debug)]
#[must_use = "the producer behind a parallel sequence blocks until it is drained or dropped"]
pub struct ParSeq<I> {
    iter: I,
}

/// Mark `seq` as requiring parallel consumption.
///
/// Useful for feeding ordinary sequences into [`merge`](crate::merge).
pub fn in_par<I: IntoIterator>(seq: I) -> ParSeq<I::IntoIter> {
    ParSeq::new(seq.into_iter())
}

impl<I: Iterator> ParSeq<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self { iter }
    }

    /// Unwrap the underlying iterator.
    ///
    /// The caller takes over the obligation to drain it concurrently with any
    /// sibling sequence fed by the same worker.
    pub fn into_inner(self) -> I {
        self.iter
    }

    /// Borrow the underlying iterator without being able to drive it.
    pub fn get_ref(&self) -> &I {
        &self.iter
    }

    /// Map elements while keeping the parallel marker.
    pub fn map<B, F>(self, f: F) -> ParSeq<std::iter::Map<I, F>>
    where
        F: FnMut(I::Item) -> B,
    {
        ParSeq::new(self.iter.map(f))
    }

    /// Erase the iterator type, so sequences of different shapes can be
    /// merged together.
    pub fn boxed<'a>(self) -> ParSeq<Box<dyn Iterator<Item = I::Item> + Send + 'a>>
    where
        I: Send + 'a,
    {
        ParSeq::new(Box::new(self.iter))
    }

    /// Concatenate parallel sequences, draining each in order.
    ///
    /// The result is still parallel-marked.
    pub fn concat<S>(seqs: S) -> ParSeq<std::iter::Flatten<std::vec::IntoIter<I>>>
    where
        S: IntoIterator<Item = ParSeq<I>>,
    {
        let parts: Vec<I> = seqs.into_iter().map(ParSeq::into_inner).collect();
        ParSeq::new(parts.into_iter().flatten())
    }
}

/// Drain `seq` with `f` on a new worker thread.
///
/// Returns a handle that blocks until `f` has returned. A panic inside `f` is
/// re-raised by [`WaitHandle::wait`].
///
/// # Panics
///
/// Panics if the worker thread cannot be spawned. See [`par_consume_with`].
pub fn par_consume<I, F>(seq: ParSeq<I>, f: F) -> WaitHandle
where
    I: Iterator + Send + 'static,
    F: FnOnce(I) + Send + 'static,
{
    spawned(par_consume_with(&SpawnConfig::default(), seq, f))
}

/// Like [`par_consume`], with explicit thread settings and a fallible spawn.
pub fn par_consume_with<I, F>(config: &SpawnConfig, seq: ParSeq<I>, f: F) -> Result<WaitHandle>
where
    I: Iterator + Send + 'static,
    F: FnOnce(I) + Send + 'static,
{
    let iter = seq.into_inner();
    config.spawn("consume", move || f(iter))
}
