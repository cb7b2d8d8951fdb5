//! Explicit pull interface over a sequence.
//!
//! [`Pull`] exposes the two operations of the pull protocol: [`Iterator::next`]
//! asks for the next element, [`Pull::stop`] withdraws. Stopping drops the
//! underlying sequence right away, which releases whatever it holds (worker
//! threads, channels, sinks). After stopping, or once the sequence is
//! exhausted, `next` keeps returning `None` without touching the source again.
//!
//! # Examples
//!
//! ```rust
//! use seqflow::prelude::*;
//!
//! let mut letters = pull(['a', 'b', 'c']);
//! assert_eq!(letters.next(), Some('a'));
//!
//! letters.stop();
//! letters.stop(); // idempotent
//! assert_eq!(letters.next(), None);
//! assert!(letters.is_stopped());
//! ```

use std::iter::FusedIterator;

/// Pull adapter created by [`pull`] or [`SeqExt::pull`](crate::SeqExt::pull).
#[derive(Debug)]
pub struct Pull<I> {
    state: PullState<I>,
}

#[derive(Debug)]
enum PullState<I> {
    Active(I),
    Stopped,
}

/// Wrap a sequence in a [`Pull`].
pub fn pull<I: IntoIterator>(seq: I) -> Pull<I::IntoIter> {
    Pull::new(seq.into_iter())
}

impl<I: Iterator> Pull<I> {
    pub fn new(iter: I) -> Self {
        Self {
            state: PullState::Active(iter),
        }
    }

    /// Withdraw from the sequence, dropping it. Idempotent.
    pub fn stop(&mut self) {
        if let PullState::Active(_) = std::mem::replace(&mut self.state, PullState::Stopped) {
            tracing::trace!("pull stopped by consumer");
        }
    }

    /// Check whether the sequence was stopped or ran out.
    pub fn is_stopped(&self) -> bool {
        matches!(self.state, PullState::Stopped)
    }
}

impl<I: Iterator> Iterator for Pull<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            PullState::Active(iter) => match iter.next() {
                Some(value) => Some(value),
                None => {
                    self.state = PullState::Stopped;
                    None
                }
            },
            PullState::Stopped => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            PullState::Active(iter) => iter.size_hint(),
            PullState::Stopped => (0, Some(0)),
        }
    }
}

impl<I: Iterator> FusedIterator for Pull<I> {}
