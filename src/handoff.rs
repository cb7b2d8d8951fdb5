//! Single-slot handoff points between a worker and its consumer.
//!
//! A [`Handoff`] is the producing end of a rendezvous channel paired with a
//! cancellation [`Listener`]. An offer blocks until the consumer takes the
//! value, and gives up as soon as the consumer is gone or the cancellation
//! signal fires. At most one value is ever pending on a link, which is all the
//! backpressure the engines need.

use crate::signal::Listener;

/// Outcome of [`Handoff::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    /// The consumer received the value.
    Taken,
    /// The consumer withdrew; the value was dropped.
    Withdrawn,
}

impl Offer {
    pub(crate) fn is_withdrawn(self) -> bool {
        matches!(self, Offer::Withdrawn)
    }
}

/// Producing end of a handoff point.
///
/// Clones share the same consumer, so several workers can feed one
/// rendezvous (fan-in).
pub(crate) struct Handoff<T> {
    data: flume::Sender<T>,
    cancel: Listener,
}

/// Create a capacity-1 rendezvous link guarded by `cancel`.
pub(crate) fn handoff<T>(cancel: Listener) -> (Handoff<T>, flume::Receiver<T>) {
    let (data, rx) = flume::bounded(0);
    (Handoff::new(data, cancel), rx)
}

impl<T> Handoff<T> {
    /// Wrap an existing sender. The channel keeps whatever capacity it was
    /// created with.
    pub(crate) fn new(data: flume::Sender<T>, cancel: Listener) -> Self {
        Self { data, cancel }
    }

    /// Offer `value`, blocking until it is taken or the consumer withdraws.
    pub(crate) fn offer(&self, value: T) -> Offer {
        if self.cancel.is_closed() {
            return Offer::Withdrawn;
        }
        flume::Selector::new()
            .send(&self.data, value, |sent| match sent {
                Ok(()) => Offer::Taken,
                Err(_) => Offer::Withdrawn,
            })
            .recv(self.cancel.receiver(), |_| Offer::Withdrawn)
            .wait()
    }
}

impl<T> Clone for Handoff<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_offer_taken_by_consumer() {
        let signal = Signal::new();
        let (link, rx) = handoff(signal.listener());

        let producer = thread::spawn(move || link.offer(7));
        assert_eq!(rx.recv().expect("value offered"), 7);
        assert_eq!(producer.join().expect("producer"), Offer::Taken);
    }

    #[test]
    fn test_offer_withdrawn_when_signal_closes_mid_offer() {
        let mut signal = Signal::new();
        let (link, _rx) = handoff::<u32>(signal.listener());

        let producer = thread::spawn(move || link.offer(1));
        thread::sleep(Duration::from_millis(20));
        signal.close();
        assert_eq!(producer.join().expect("producer"), Offer::Withdrawn);
    }

    #[test]
    fn test_offer_withdrawn_when_receiver_dropped() {
        let signal = Signal::new();
        let (link, rx) = handoff::<u32>(signal.listener());

        let producer = thread::spawn(move || link.offer(1));
        thread::sleep(Duration::from_millis(20));
        drop(rx);
        assert!(producer.join().expect("producer").is_withdrawn());
    }

    #[test]
    fn test_offer_after_close_does_not_block() {
        let mut signal = Signal::new();
        let (link, _rx) = handoff::<u32>(signal.listener());
        signal.close();
        assert_eq!(link.offer(3), Offer::Withdrawn);
    }

    #[test]
    fn test_receiver_disconnects_when_all_handoffs_drop() {
        let signal = Signal::new();
        let (link, rx) = handoff::<u32>(signal.listener());
        let other = link.clone();
        drop(link);
        assert!(!rx.is_disconnected());
        drop(other);
        assert!(rx.recv().is_err());
    }
}
