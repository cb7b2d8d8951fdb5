//! Distributing the halves of a pair sequence into two sinks.

use crate::sink::Sink;

/// Drain a pair sequence, writing the first half of each pair to `left` and
/// the second half to `right`.
///
/// A sink that rejects a write is closed and receives nothing more. Draining
/// stops early once both sinks have rejected. Whichever sinks are still open
/// when draining ends are closed, so each sink is closed exactly once.
///
/// Unlike [`split`](crate::split) this runs on the calling thread and needs no
/// parallel consumption.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let mut keys = Vec::new();
/// let mut values = Vec::new();
/// split_into([("a", 1), ("b", 2)], to_vec(&mut keys), to_vec(&mut values));
///
/// assert_eq!(keys, vec!["a", "b"]);
/// assert_eq!(values, vec![1, 2]);
/// ```
pub fn split_into<I, A, B, L, R>(source: I, left: L, right: R)
where
    I: IntoIterator<Item = (A, B)>,
    L: Sink<A>,
    R: Sink<B>,
{
    let mut left = Some(left);
    let mut right = Some(right);

    for (a, b) in source {
        write_or_close(&mut left, a, "left");
        write_or_close(&mut right, b, "right");
        if left.is_none() && right.is_none() {
            tracing::debug!("both split sinks rejected, stopping");
            break;
        }
    }

    if let Some(mut sink) = left {
        sink.close();
    }
    if let Some(mut sink) = right {
        sink.close();
    }
}

fn write_or_close<T, S: Sink<T>>(slot: &mut Option<S>, value: T, side: &str) {
    let rejected = match slot {
        Some(sink) => !sink.write(value),
        None => false,
    };
    if rejected {
        tracing::debug!(side, "split sink rejected, closing it");
        if let Some(mut sink) = slot.take() {
            sink.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{to_vec, ToVec};
    use std::cell::Cell;

    struct CountingCloses<'a, S> {
        inner: S,
        closes: &'a Cell<usize>,
    }

    impl<T, S: Sink<T>> Sink<T> for CountingCloses<'_, S> {
        fn write(&mut self, value: T) -> bool {
            self.inner.write(value)
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
            self.inner.close();
        }
    }

    #[test]
    fn test_split_into_distributes_halves() {
        let mut nums = Vec::new();
        let mut names = Vec::new();
        split_into(
            vec![(1, "one"), (2, "two"), (3, "three")],
            to_vec(&mut nums),
            to_vec(&mut names),
        );
        assert_eq!(nums, vec![1, 2, 3]);
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_rejected_side_closed_once_other_keeps_going() {
        let left_closes = Cell::new(0);
        let right_closes = Cell::new(0);
        let mut right_buf = Vec::new();
        split_into(
            (0..4).map(|i| (i, i * 10)),
            CountingCloses {
                inner: ToVec::<i32>::detached(),
                closes: &left_closes,
            },
            CountingCloses {
                inner: to_vec(&mut right_buf),
                closes: &right_closes,
            },
        );
        assert_eq!(left_closes.get(), 1);
        assert_eq!(right_closes.get(), 1);
        assert_eq!(right_buf, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_stops_pulling_when_both_reject() {
        let pulled = Cell::new(0);
        let source = std::iter::repeat_with(|| {
            pulled.set(pulled.get() + 1);
            (1u8, 2u8)
        });
        split_into(source, ToVec::<u8>::detached(), ToVec::<u8>::detached());
        assert_eq!(pulled.get(), 1);
    }
}
