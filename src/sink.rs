//! Push-style destinations for fan-out engines.
//!
//! A [`Sink`] receives values one at a time through [`Sink::write`] and is told
//! that no more will come through [`Sink::close`]. The engines in this crate
//! keep each sink in an owned slot and take it out of the slot to close it, so
//! every sink they are handed is closed exactly once and never written after
//! closing.
//!
//! # Examples
//!
//! ```rust
//! use seqflow::prelude::*;
//!
//! let mut evens = Vec::new();
//! let odds: Vec<_> = partition(1..=6, [Dest::new(|x: &i32| x % 2 == 0, to_vec(&mut evens))])
//!     .collect();
//!
//! assert_eq!(odds, vec![1, 3, 5]);
//! assert_eq!(evens, vec![2, 4, 6]);
//! ```

use either::Either;

use crate::handoff::Handoff;
use crate::signal::Listener;

/// A single-writer destination for values of type `T`.
///
/// Contract for callers:
/// - call [`close`](Self::close) exactly once, after the last write;
/// - never call [`write`](Self::write) after `close` (unchecked);
/// - once `write` returns `false` it keeps returning `false`, and `close` must
///   still be called.
///
/// Implementations may assume the caller honours this contract.
pub trait Sink<T> {
    /// Offer a value. Returns `false` if the sink will not accept any more
    /// values (full, cancelled, or its reader went away).
    fn write(&mut self, value: T) -> bool;

    /// Signal that no more values will be written.
    fn close(&mut self);
}

impl<T, S> Sink<T> for &mut S
where
    S: Sink<T> + ?Sized,
{
    fn write(&mut self, value: T) -> bool {
        (**self).write(value)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<T, S> Sink<T> for Box<S>
where
    S: Sink<T> + ?Sized,
{
    fn write(&mut self, value: T) -> bool {
        (**self).write(value)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// `None` is the absent sink: it rejects every value and has nothing to close.
impl<T, S> Sink<T> for Option<S>
where
    S: Sink<T>,
{
    fn write(&mut self, value: T) -> bool {
        match self {
            Some(sink) => sink.write(value),
            None => false,
        }
    }

    fn close(&mut self) {
        if let Some(sink) = self {
            sink.close();
        }
    }
}

impl<T, L, R> Sink<T> for Either<L, R>
where
    L: Sink<T>,
    R: Sink<T>,
{
    fn write(&mut self, value: T) -> bool {
        match self {
            Either::Left(l) => l.write(value),
            Either::Right(r) => r.write(value),
        }
    }

    fn close(&mut self) {
        match self {
            Either::Left(l) => l.close(),
            Either::Right(r) => r.close(),
        }
    }
}

/// Sink that appends to a borrowed `Vec`. Created by [`to_vec`].
#[derive(Debug)]
pub struct ToVec<'a, T> {
    buf: Option<&'a mut Vec<T>>,
}

/// Create a sink that appends every written value to `buf`.
pub fn to_vec<T>(buf: &mut Vec<T>) -> ToVec<'_, T> {
    ToVec { buf: Some(buf) }
}

impl<T> ToVec<'_, T> {
    /// A sink with no buffer behind it; rejects every write.
    pub fn detached() -> Self {
        ToVec { buf: None }
    }
}

impl<T> Default for ToVec<'_, T> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<T> Sink<T> for ToVec<'_, T> {
    fn write(&mut self, value: T) -> bool {
        match &mut self.buf {
            Some(buf) => {
                buf.push(value);
                true
            }
            None => false,
        }
    }

    fn close(&mut self) {}
}

/// Sink that forwards into a channel. Created by [`to_chan`].
///
/// Writes block until the channel accepts the value, and are rejected once the
/// cancellation listener fires or every receiver is gone. Closing drops the
/// sender, so the reading side sees the channel end once no other sender
/// remains.
pub struct ToChan<T> {
    link: Option<Handoff<T>>,
}

/// Create a sink writing into `data` that gives up when `cancel` fires.
pub fn to_chan<T>(data: flume::Sender<T>, cancel: Listener) -> ToChan<T> {
    ToChan {
        link: Some(Handoff::new(data, cancel)),
    }
}

impl<T> Sink<T> for ToChan<T> {
    fn write(&mut self, value: T) -> bool {
        match &self.link {
            Some(link) => !link.offer(value).is_withdrawn(),
            None => false,
        }
    }

    fn close(&mut self) {
        self.link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use std::thread;

    #[test]
    fn test_to_vec_appends() {
        let mut buf = vec![1];
        let mut sink = to_vec(&mut buf);
        assert!(sink.write(2));
        assert!(sink.write(3));
        sink.close();
        assert_eq!(buf, vec![1, 2, 3]);
    }

    #[test]
    fn test_detached_to_vec_rejects() {
        let mut sink = ToVec::<u8>::detached();
        assert!(!sink.write(1));
        assert!(!sink.write(2));
        sink.close();
    }

    #[test]
    fn test_absent_sink_rejects() {
        let mut sink: Option<ToVec<'_, u8>> = None;
        assert!(!sink.write(1));
        sink.close();
    }

    #[test]
    fn test_either_dispatches_to_inner_sink() {
        let mut left_buf = Vec::new();
        {
            let mut sink: Either<ToVec<'_, i32>, Option<ToVec<'_, i32>>> =
                Either::Left(to_vec(&mut left_buf));
            assert!(sink.write(5));
            sink.close();
        }
        let mut sink: Either<ToVec<'_, i32>, Option<ToVec<'_, i32>>> = Either::Right(None);
        assert!(!sink.write(6));
        assert_eq!(left_buf, vec![5]);
    }

    #[test]
    fn test_to_chan_forwards_and_closes() {
        let signal = Signal::new();
        let (tx, rx) = flume::bounded(0);
        let reader = thread::spawn(move || rx.iter().collect::<Vec<i32>>());

        let mut sink = to_chan(tx, signal.listener());
        for i in 0..4 {
            assert!(sink.write(i));
        }
        sink.close();

        assert_eq!(reader.join().expect("reader"), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_to_chan_rejects_after_cancel() {
        let mut signal = Signal::new();
        let (tx, _rx) = flume::bounded::<i32>(0);
        let mut sink = to_chan(tx, signal.listener());

        signal.close();
        assert!(!sink.write(1));
        assert!(!sink.write(2));
        sink.close();
    }

    #[test]
    fn test_to_chan_rejects_when_reader_gone() {
        let signal = Signal::new();
        let (tx, rx) = flume::bounded::<i32>(1);
        let mut sink = to_chan(tx, signal.listener());
        drop(rx);
        assert!(!sink.write(1));
        sink.close();
    }
}
