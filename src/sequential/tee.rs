//! Copying every element of a sequence into sinks.
//!
//! This module provides the [`Tee`] combinator, which writes each element to a
//! set of sinks before handing it to its own consumer.

use std::iter::FusedIterator;

use crate::sink::Sink;

/// Copy each element of `source` into every sink, then yield it.
///
/// For each element, the open sinks are written in the order given, then the
/// element is returned from `next`. A sink that rejects a write is closed on the
/// spot and skipped from then on. Once `source` is exhausted, or the returned
/// sequence is dropped, every sink still open is closed. Each sink is closed
/// exactly once either way.
///
/// Pass `None` (with `Option<S>` sinks) for an absent sink; it is treated as
/// already closed.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let mut audit = Vec::new();
/// let mut mirror = Vec::new();
/// let doubled: Vec<_> = tee(1..=3, [to_vec(&mut audit), to_vec(&mut mirror)])
///     .map(|x| x * 2)
///     .collect();
///
/// assert_eq!(doubled, vec![2, 4, 6]);
/// assert_eq!(audit, vec![1, 2, 3]);
/// assert_eq!(mirror, vec![1, 2, 3]);
/// ```
pub fn tee<I, S>(source: I, sinks: impl IntoIterator<Item = S>) -> Tee<I::IntoIter, S>
where
    I: IntoIterator,
    I::Item: Clone,
    S: Sink<I::Item>,
{
    Tee {
        source: Some(source.into_iter()),
        sinks: sinks.into_iter().map(Some).collect(),
    }
}

/// Sequence returned by [`tee`].
pub struct Tee<I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    source: Option<I>,
    // `None` once a sink has been closed.
    sinks: Vec<Option<S>>,
}

impl<I, S> Tee<I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    /// Number of sinks that are still accepting values.
    pub fn open_sinks(&self) -> usize {
        self.sinks.iter().filter(|slot| slot.is_some()).count()
    }

    fn finish(&mut self) {
        self.source = None;
        for slot in &mut self.sinks {
            if let Some(mut sink) = slot.take() {
                sink.close();
            }
        }
    }
}

impl<I, S> Iterator for Tee<I, S>
where
    I: Iterator,
    I::Item: Clone,
    S: Sink<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(value) = self.source.as_mut()?.next() else {
            self.finish();
            return None;
        };

        for (index, slot) in self.sinks.iter_mut().enumerate() {
            let rejected = match slot {
                Some(sink) => !sink.write(value.clone()),
                None => false,
            };
            if rejected {
                tracing::debug!(sink = index, "tee sink rejected, closing it");
                if let Some(mut sink) = slot.take() {
                    sink.close();
                }
            }
        }
        Some(value)
    }
}

impl<I, S> FusedIterator for Tee<I, S>
where
    I: Iterator,
    I::Item: Clone,
    S: Sink<I::Item>,
{
}

impl<I, S> Drop for Tee<I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    fn drop(&mut self) {
        if self.source.is_some() {
            tracing::debug!("tee consumer withdrew");
        }
        self.finish();
    }
}
