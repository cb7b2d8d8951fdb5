//! Method-call syntax for the sequence combinators.
//!
//! [`SeqExt`] is implemented for every [`Iterator`], so the free functions in
//! this crate can also be chained:
//!
//! ```rust
//! use seqflow::prelude::*;
//!
//! let mut seen = Vec::new();
//! let doubled: Vec<_> = (1..=3).tee([to_vec(&mut seen)]).map(|x| x * 2).collect();
//!
//! assert_eq!(doubled, vec![2, 4, 6]);
//! assert_eq!(seen, vec![1, 2, 3]);
//! ```

use crate::concurrent::{self, Join, Pad, SplitHalf, Trim};
use crate::par::{self, ParSeq};
use crate::pull::{self, Pull};
use crate::sequential::{self, Dest, Partition, Tee};
use crate::sink::Sink;

/// Combinators available on every sequence.
pub trait SeqExt: Iterator + Sized {
    /// See [`pull()`](crate::pull()).
    fn pull(self) -> Pull<Self> {
        pull::pull(self)
    }

    /// See [`in_par`](crate::in_par).
    fn in_par(self) -> ParSeq<Self> {
        par::in_par(self)
    }

    /// See [`tee`](crate::tee).
    fn tee<S>(self, sinks: impl IntoIterator<Item = S>) -> Tee<Self, S>
    where
        Self::Item: Clone,
        S: Sink<Self::Item>,
    {
        sequential::tee(self, sinks)
    }

    /// See [`partition`](crate::partition).
    fn partition_into<'a, S>(
        self,
        dests: impl IntoIterator<Item = Dest<'a, Self::Item, S>>,
    ) -> Partition<'a, Self, S>
    where
        S: Sink<Self::Item>,
    {
        sequential::partition(self, dests)
    }

    /// See [`split`](crate::split).
    #[allow(clippy::type_complexity)]
    fn split<A, B>(self) -> (ParSeq<SplitHalf<A>>, ParSeq<SplitHalf<B>>)
    where
        Self: Iterator<Item = (A, B)> + Send + 'static,
        A: Send + 'static,
        B: Send + 'static,
    {
        concurrent::split(self)
    }

    /// See [`split_into`](crate::split_into).
    fn split_into<A, B, L, R>(self, left: L, right: R)
    where
        Self: Iterator<Item = (A, B)>,
        L: Sink<A>,
        R: Sink<B>,
    {
        sequential::split_into(self, left, right)
    }

    /// See [`join_pad`](crate::join_pad).
    fn join_pad<R>(self, right: R) -> Join<Self::Item, R::Item, Pad<Self::Item, R::Item>>
    where
        Self: Send + 'static,
        Self::Item: Send + Clone + Default + 'static,
        R: IntoIterator,
        R::IntoIter: Send + 'static,
        R::Item: Send + Clone + Default + 'static,
    {
        concurrent::join_pad(self, right)
    }

    /// See [`join_trim`](crate::join_trim).
    fn join_trim<R>(self, right: R) -> Join<Self::Item, R::Item, Trim>
    where
        Self: Send + 'static,
        Self::Item: Send + 'static,
        R: IntoIterator,
        R::IntoIter: Send + 'static,
        R::Item: Send + 'static,
    {
        concurrent::join_trim(self, right)
    }
}

impl<I: Iterator> SeqExt for I {}

/// Discard a sequence without draining it.
///
/// This runs the sequence's withdrawal path: engines cancel their workers and
/// close the sinks they own.
pub fn stop<I: IntoIterator>(seq: I) {
    let seq = seq.into_iter();
    tracing::trace!("sequence stopped by caller");
    drop(seq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_vec;
    use std::time::Duration;

    #[test]
    fn test_methods_match_free_functions() {
        let mut small = Vec::new();
        let big: Vec<_> = (0..6)
            .partition_into([Dest::new(|x: &i32| *x < 3, to_vec(&mut small))])
            .collect();
        assert_eq!(small, vec![0, 1, 2]);
        assert_eq!(big, vec![3, 4, 5]);

        let (mut a, mut b) = (Vec::new(), Vec::new());
        vec![(1, 'x'), (2, 'y')]
            .into_iter()
            .split_into(to_vec(&mut a), to_vec(&mut b));
        assert_eq!(a, vec![1, 2]);
        assert_eq!(b, vec!['x', 'y']);
    }

    #[test]
    fn test_join_methods() {
        let padded: Vec<_> = vec![1u8].into_iter().join_pad(vec![7u8, 8]).collect();
        assert_eq!(padded, vec![(1, 7), (0, 8)]);

        let trimmed: Vec<_> = (0..10).join_trim("ab".chars().collect::<Vec<_>>()).collect();
        assert_eq!(trimmed, vec![(0, 'a'), (1, 'b')]);
    }

    #[test]
    fn test_stop_withdraws_engine() {
        let merged = concurrent::merge([(0u64..).in_par()]);
        let workers = merged.wait_handles().to_vec();
        stop(merged);
        for worker in workers {
            assert!(worker.wait_timeout(Duration::from_secs(5)));
        }
    }

    #[test]
    fn test_pull_method() {
        let mut seq = (1..).pull();
        assert_eq!(seq.next(), Some(1));
        seq.stop();
        assert_eq!(seq.next(), None);
    }
}
