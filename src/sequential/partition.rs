//! Routing elements of a sequence to sinks by predicate.

use std::fmt;
use std::iter::FusedIterator;
use std::thread;

use crate::sink::Sink;

/// A predicate and the sink that receives the elements it matches.
pub struct Dest<'a, T, S> {
    pred: Box<dyn FnMut(&T) -> bool + 'a>,
    sink: Option<S>,
}

impl<'a, T, S> Dest<'a, T, S>
where
    S: Sink<T>,
{
    pub fn new<P>(pred: P, sink: S) -> Self
    where
        P: FnMut(&T) -> bool + 'a,
    {
        Self {
            pred: Box::new(pred),
            sink: Some(sink),
        }
    }
}

impl<T, S> fmt::Debug for Dest<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dest")
            .field("open", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

/// Route each element of `source` to the sink of the first matching predicate.
///
/// Predicates are evaluated in list order and only the first match counts.
/// If the matching sink has already rejected a value, the element is dropped:
/// it does not fall through to later predicates or to the returned sequence.
/// Elements that match no predicate are yielded by the returned sequence.
///
/// Dropping the returned sequence early only withdraws the default output:
/// the rest of `source` is still routed into the open sinks, and unmatched
/// elements are discarded. Pulling stops once `source` is exhausted or every
/// sink has rejected. Every sink still open at that point is closed.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let mut small = Vec::new();
/// let mut even = Vec::new();
/// let rest: Vec<_> = partition(
///     1..=10,
///     [
///         Dest::new(|x: &i32| *x < 4, to_vec(&mut small)),
///         Dest::new(|x: &i32| x % 2 == 0, to_vec(&mut even)),
///     ],
/// )
/// .collect();
///
/// assert_eq!(small, vec![1, 2, 3]);
/// assert_eq!(even, vec![4, 6, 8, 10]);
/// assert_eq!(rest, vec![5, 7, 9]);
/// ```
pub fn partition<'a, I, S>(
    source: I,
    dests: impl IntoIterator<Item = Dest<'a, I::Item, S>>,
) -> Partition<'a, I::IntoIter, S>
where
    I: IntoIterator,
    S: Sink<I::Item>,
{
    Partition {
        source: Some(source.into_iter()),
        dests: dests.into_iter().collect(),
    }
}

/// Sequence of unmatched elements, returned by [`partition`].
pub struct Partition<'a, I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    source: Option<I>,
    dests: Vec<Dest<'a, I::Item, S>>,
}

impl<'a, I, S> Partition<'a, I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    /// Number of sinks that are still accepting values.
    pub fn open_sinks(&self) -> usize {
        self.dests.iter().filter(|dest| dest.sink.is_some()).count()
    }

    fn deliver(&mut self, index: usize, value: I::Item) {
        let slot = &mut self.dests[index].sink;
        let rejected = match slot {
            Some(sink) => !sink.write(value),
            None => {
                tracing::trace!(sink = index, "partition sink closed, dropping element");
                false
            }
        };
        if rejected {
            tracing::debug!(sink = index, "partition sink rejected, closing it");
            if let Some(mut sink) = slot.take() {
                sink.close();
            }
        }
    }

    /// Keep routing into the sinks after the default output withdrew.
    fn drain(&mut self) {
        while self.open_sinks() > 0 {
            let Some(value) = self.source.as_mut().and_then(Iterator::next) else {
                break;
            };
            if let Some(index) = self.dests.iter_mut().position(|dest| (dest.pred)(&value)) {
                self.deliver(index, value);
            }
        }
    }

    fn finish(&mut self) {
        self.source = None;
        for dest in &mut self.dests {
            if let Some(mut sink) = dest.sink.take() {
                sink.close();
            }
        }
    }
}

impl<'a, I, S> Iterator for Partition<'a, I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(value) = self.source.as_mut()?.next() else {
                self.finish();
                return None;
            };

            match self.dests.iter_mut().position(|dest| (dest.pred)(&value)) {
                Some(index) => self.deliver(index, value),
                None => return Some(value),
            }
        }
    }
}

impl<'a, I, S> FusedIterator for Partition<'a, I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
}

impl<'a, I, S> Drop for Partition<'a, I, S>
where
    I: Iterator,
    S: Sink<I::Item>,
{
    fn drop(&mut self) {
        if self.source.is_some() && !thread::panicking() {
            tracing::debug!(open = self.open_sinks(), "partition consumer withdrew, draining into sinks");
            self.drain();
        }
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{to_vec, ToVec};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Accepts up to `accept` values and counts closes.
    struct Limited {
        got: Rc<std::cell::RefCell<Vec<u32>>>,
        closes: Rc<Cell<usize>>,
        accept: usize,
    }

    impl Limited {
        fn new(accept: usize) -> (Self, Rc<std::cell::RefCell<Vec<u32>>>, Rc<Cell<usize>>) {
            let got = Rc::default();
            let closes = Rc::new(Cell::new(0));
            let sink = Self {
                got: Rc::clone(&got),
                closes: Rc::clone(&closes),
                accept,
            };
            (sink, got, closes)
        }
    }

    impl Sink<u32> for Limited {
        fn write(&mut self, value: u32) -> bool {
            if self.accept == 0 {
                return false;
            }
            self.accept -= 1;
            self.got.borrow_mut().push(value);
            true
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    #[test]
    fn test_first_matching_predicate_wins() {
        let mut fizz = Vec::new();
        let mut buzz = Vec::new();
        let rest: Vec<u32> = partition(
            1..=15,
            [
                Dest::new(|x: &u32| x % 3 == 0, to_vec(&mut fizz)),
                Dest::new(|x: &u32| x % 5 == 0, to_vec(&mut buzz)),
            ],
        )
        .collect();

        assert_eq!(fizz, vec![3, 6, 9, 12, 15]);
        assert_eq!(buzz, vec![5, 10]);
        assert_eq!(rest, vec![1, 2, 4, 7, 8, 11, 13, 14]);
    }

    #[test]
    fn test_each_element_goes_to_exactly_one_place() {
        let mut low = Vec::new();
        let mut mid = Vec::new();
        let rest: Vec<u32> = partition(
            0..100,
            [
                Dest::new(|x: &u32| *x < 30, to_vec(&mut low)),
                Dest::new(|x: &u32| *x < 60, to_vec(&mut mid)),
            ],
        )
        .collect();

        let mut all: Vec<u32> = low.iter().chain(&mid).chain(&rest).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_rejected_sink_drops_instead_of_falling_through() {
        let (first, first_got, first_closes) = Limited::new(1);
        let (second, second_got, second_closes) = Limited::new(usize::MAX);
        let rest: Vec<u32> = partition(
            vec![2, 4, 6, 7],
            [
                Dest::new(|x: &u32| x % 2 == 0, first),
                Dest::new(|_: &u32| true, second),
            ],
        )
        .collect();

        // 4 was rejected, 6 arrived after the sink closed: both dropped.
        assert_eq!(*first_got.borrow(), vec![2]);
        assert_eq!(first_closes.get(), 1);
        assert_eq!(*second_got.borrow(), vec![7]);
        assert_eq!(second_closes.get(), 1);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_withdrawal_keeps_feeding_open_sinks() {
        let (sink, got, closes) = Limited::new(usize::MAX);
        let mut seq = partition(0..10, [Dest::new(|x: &u32| x % 2 == 0, sink)]);

        assert_eq!(seq.next(), Some(1));
        assert_eq!(seq.open_sinks(), 1);
        drop(seq);

        assert_eq!(*got.borrow(), vec![0, 2, 4, 6, 8]);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_withdrawal_stops_once_every_sink_rejected() {
        let (sink, got, closes) = Limited::new(3);
        let pulled = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pulled);
        let source = (0u32..).inspect(move |_| counter.set(counter.get() + 1));

        let firsts: Vec<u32> = partition(source, [Dest::new(|x: &u32| x % 2 == 0, sink)])
            .take(1)
            .collect();

        assert_eq!(firsts, vec![1]);
        // 0, 2 and 4 are accepted, 6 is rejected and ends the drain.
        assert_eq!(*got.borrow(), vec![0, 2, 4]);
        assert_eq!(pulled.get(), 7);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_withdrawal_without_sinks_stops_at_once() {
        let dests: Vec<Dest<'_, u32, ToVec<'_, u32>>> = Vec::new();
        let firsts: Vec<u32> = partition(0u32.., dests).take(2).collect();
        assert_eq!(firsts, vec![0, 1]);
    }

    #[test]
    fn test_no_destinations_yields_everything() {
        let dests: Vec<Dest<'_, u32, ToVec<'_, u32>>> = Vec::new();
        let out: Vec<u32> = partition(1..=3, dests).collect();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "predicate exploded")]
    fn test_predicate_panic_propagates() {
        let mut sink = Vec::new();
        let seq = partition(
            1..=3,
            [Dest::new(
                |x: &u32| {
                    assert!(*x < 2, "predicate exploded");
                    false
                },
                to_vec(&mut sink),
            )],
        );
        seq.for_each(drop);
    }
}
