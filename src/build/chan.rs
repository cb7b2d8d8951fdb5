use std::iter::FusedIterator;

use crate::signal::Signal;

/// Turn a channel into a sequence.
///
/// The sequence yields everything received on `data` until every sender is
/// gone. `done` is closed once the sequence ends or is dropped, so a producer
/// holding one of its [`Listener`](crate::signal::Listener)s learns that nobody
/// is reading anymore.
///
/// # Examples
///
/// ```
/// use seqflow::prelude::*;
///
/// let (tx, rx) = flume::unbounded();
/// let done = Signal::new();
/// let stopped = done.listener();
///
/// tx.send(1).unwrap();
/// tx.send(2).unwrap();
/// drop(tx);
///
/// let got: Vec<_> = from_chan(rx, done).collect();
/// assert_eq!(got, vec![1, 2]);
/// assert!(stopped.is_closed());
/// ```
pub fn from_chan<T>(data: flume::Receiver<T>, done: Signal) -> FromChan<T> {
    FromChan {
        data: Some(data),
        done,
    }
}

/// Sequence returned by [`from_chan`].
#[derive(Debug)]
pub struct FromChan<T> {
    data: Option<flume::Receiver<T>>,
    done: Signal,
}

impl<T> Iterator for FromChan<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let value = self.data.as_ref()?.recv().ok();
        if value.is_none() {
            self.data = None;
            self.done.close();
        }
        value
    }
}

impl<T> FusedIterator for FromChan<T> {}

impl<T> Drop for FromChan<T> {
    fn drop(&mut self) {
        self.done.close();
    }
}
