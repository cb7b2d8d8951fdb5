//! Advancing two sequences in lockstep.
//!
//! This module provides [`join`] and its two stock policies. Each side runs on
//! its own worker, so the two sources are pulled in parallel, while the joined
//! sequence pairs up one element from each side per step.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::Result;
use crate::handoff::handoff;
use crate::signal::Signal;
use crate::worker::{reraise_reported, spawned, SpawnConfig, WaitHandle};

/// Decides what a [`Join`] yields once one or both sides run dry.
///
/// `combine` is called once per step with the next element of each side,
/// `None` marking an exhausted side. Returning `None` ends the join.
pub trait JoinPolicy<A, B> {
    fn combine(&mut self, left: Option<A>, right: Option<B>) -> Option<(A, B)>;
}

/// Stop as soon as either side is exhausted.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trim;

impl<A, B> JoinPolicy<A, B> for Trim {
    fn combine(&mut self, left: Option<A>, right: Option<B>) -> Option<(A, B)> {
        left.zip(right)
    }
}

/// Keep going until both sides are exhausted, filling the shorter side with a
/// pad value.
#[derive(Debug, Default, Clone)]
pub struct Pad<A, B> {
    left: A,
    right: B,
}

impl<A, B> Pad<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Pad { left, right }
    }
}

impl<A: Clone, B: Clone> JoinPolicy<A, B> for Pad<A, B> {
    fn combine(&mut self, left: Option<A>, right: Option<B>) -> Option<(A, B)> {
        match (left, right) {
            (None, None) => None,
            (left, right) => Some((
                left.unwrap_or_else(|| self.left.clone()),
                right.unwrap_or_else(|| self.right.clone()),
            )),
        }
    }
}

/// Join two sequences under `policy`.
///
/// Both sources start being pulled on their own workers before this function
/// returns. Each side gets at most one element ahead of the joined sequence.
///
/// # Panics
///
/// Panics if a worker thread cannot be spawned (see [`join_with`]). A panic
/// while pulling either source is re-raised on the consuming thread once that
/// side is observed to end, or when the join is dropped after the panic.
pub fn join<L, R, P>(left: L, right: R, policy: P) -> Join<L::Item, R::Item, P>
where
    L: IntoIterator,
    R: IntoIterator,
    L::IntoIter: Send + 'static,
    R::IntoIter: Send + 'static,
    L::Item: Send + 'static,
    R::Item: Send + 'static,
    P: JoinPolicy<L::Item, R::Item>,
{
    spawned(join_with(&SpawnConfig::default(), left, right, policy))
}

/// Like [`join`], with explicit thread settings and a fallible spawn.
pub fn join_with<L, R, P>(
    config: &SpawnConfig,
    left: L,
    right: R,
    policy: P,
) -> Result<Join<L::Item, R::Item, P>>
where
    L: IntoIterator,
    R: IntoIterator,
    L::IntoIter: Send + 'static,
    R::IntoIter: Send + 'static,
    L::Item: Send + 'static,
    R::Item: Send + 'static,
    P: JoinPolicy<L::Item, R::Item>,
{
    let cancel = Signal::new();
    let (left_link, left_data) = handoff(cancel.listener());
    let (right_link, right_data) = handoff(cancel.listener());
    let left = left.into_iter();
    let right = right.into_iter();

    // A failed second spawn drops `cancel`, which stops the first worker.
    let left_worker = config.spawn("join-left", move || {
        for value in left {
            if left_link.offer(value).is_withdrawn() {
                tracing::trace!("left join side withdrew");
                return;
            }
        }
    })?;
    let right_worker = config.spawn("join-right", move || {
        for value in right {
            if right_link.offer(value).is_withdrawn() {
                tracing::trace!("right join side withdrew");
                return;
            }
        }
    })?;

    Ok(Join {
        left: Side::new(left_data, left_worker),
        right: Side::new(right_data, right_worker),
        cancel,
        policy,
        finished: false,
    })
}

/// Join two sequences, padding the shorter one with `Default::default()`.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let pairs: Vec<_> = join_pad(vec![1, 2, 3], vec!['a', 'b']).collect();
/// assert_eq!(pairs, vec![(1, 'a'), (2, 'b'), (3, '\0')]);
/// ```
pub fn join_pad<L, R>(left: L, right: R) -> Join<L::Item, R::Item, Pad<L::Item, R::Item>>
where
    L: IntoIterator,
    R: IntoIterator,
    L::IntoIter: Send + 'static,
    R::IntoIter: Send + 'static,
    L::Item: Send + Clone + Default + 'static,
    R::Item: Send + Clone + Default + 'static,
{
    join(left, right, Pad::default())
}

/// Join two sequences, padding the shorter one with the given values.
pub fn join_pad_or<L, R>(
    left: L,
    right: R,
    pad_left: L::Item,
    pad_right: R::Item,
) -> Join<L::Item, R::Item, Pad<L::Item, R::Item>>
where
    L: IntoIterator,
    R: IntoIterator,
    L::IntoIter: Send + 'static,
    R::IntoIter: Send + 'static,
    L::Item: Send + Clone + 'static,
    R::Item: Send + Clone + 'static,
{
    join(left, right, Pad::new(pad_left, pad_right))
}

/// Join two sequences, stopping at the end of the shorter one.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let pairs: Vec<_> = join_trim(vec![1, 2, 3], vec!['a', 'b']).collect();
/// assert_eq!(pairs, vec![(1, 'a'), (2, 'b')]);
/// ```
pub fn join_trim<L, R>(left: L, right: R) -> Join<L::Item, R::Item, Trim>
where
    L: IntoIterator,
    R: IntoIterator,
    L::IntoIter: Send + 'static,
    R::IntoIter: Send + 'static,
    L::Item: Send + 'static,
    R::Item: Send + 'static,
{
    join(left, right, Trim)
}

struct Side<T> {
    data: Option<flume::Receiver<T>>,
    worker: WaitHandle,
}

impl<T> Side<T> {
    fn new(data: flume::Receiver<T>, worker: WaitHandle) -> Self {
        Side {
            data: Some(data),
            worker,
        }
    }

    fn take(&mut self) -> Option<T> {
        let value = self.data.as_ref()?.recv().ok();
        if value.is_none() {
            self.data = None;
            self.worker.wait();
        }
        value
    }
}

/// Sequence returned by [`join`] and friends.
pub struct Join<A, B, P> {
    left: Side<A>,
    right: Side<B>,
    cancel: Signal,
    policy: P,
    finished: bool,
}

impl<A, B, P> Join<A, B, P> {
    /// Handles of the left and right workers.
    pub fn wait_handles(&self) -> [WaitHandle; 2] {
        [self.left.worker.clone(), self.right.worker.clone()]
    }

    fn finish(&mut self) {
        self.finished = true;
        self.cancel.close();
        self.left.data = None;
        self.right.data = None;
    }
}

impl<A, B, P: JoinPolicy<A, B>> Iterator for Join<A, B, P> {
    type Item = (A, B);

    fn next(&mut self) -> Option<(A, B)> {
        if self.finished {
            return None;
        }
        let left = self.left.take();
        let right = self.right.take();
        let pair = self.policy.combine(left, right);
        if pair.is_none() {
            tracing::debug!("join policy stopped");
            self.finish();
        }
        pair
    }
}

impl<A, B, P: JoinPolicy<A, B>> FusedIterator for Join<A, B, P> {}

impl<A, B, P> Drop for Join<A, B, P> {
    fn drop(&mut self) {
        self.cancel.close();
        reraise_reported([&self.left.worker, &self.right.worker]);
    }
}

impl<A, B, P: fmt::Debug> fmt::Debug for Join<A, B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join")
            .field("policy", &self.policy)
            .field("left_open", &self.left.data.is_some())
            .field("right_open", &self.right.data.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}
