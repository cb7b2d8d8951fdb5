//! # Seqflow: Concurrent Fan-in and Fan-out for Sequences
//!
//! Split one pull-driven sequence across several consumers, merge several
//! sequences into one, or advance two sequences in lockstep, without unbounded
//! buffering and without leaking threads when a consumer stops early.
//!
//! A sequence is anything that implements [`IntoIterator`]. Withdrawing from a
//! sequence means dropping it: every engine in this crate cancels its workers
//! and closes the sinks it owns when its output is dropped.
//!
//! ## Example
//!
//! ```
//! use seqflow::prelude::*;
//!
//! // Fan out into two halves drained on their own threads, then fan back in.
//! let (left, right) = split((1..=4).map(|i| (i, i * 10)));
//! let mut merged: Vec<_> = merge([left, right]).collect();
//! merged.sort();
//! assert_eq!(merged, vec![1, 2, 3, 4, 10, 20, 30, 40]);
//! ```
//!
//! ## Common Functions
//!
//! **Fan-out:**
//! - [`tee(source, sinks)`] - Yield every element and copy it into each sink
//! - [`partition(source, dests)`] - Route each element to the first matching sink
//! - [`split(pairs)`] - Split a pair sequence into two parallel sequences
//! - [`split_into(pairs, left, right)`] - Split a pair sequence into two sinks
//!
//! **Fan-in and lockstep:**
//! - [`merge(seqs)`] - Interleave parallel sequences into one
//! - [`join_pad(a, b)`] / [`join_trim(a, b)`] - Pair up two sequences pulled in parallel
//!
//! **Workers:**
//! - [`par_consume(seq, f)`] - Drain a parallel sequence on its own thread
//! - [`wait_all(handles)`] - Block until every worker finished
//!
//! [`tee(source, sinks)`]: tee
//! [`partition(source, dests)`]: partition
//! [`split(pairs)`]: split
//! [`split_into(pairs, left, right)`]: split_into
//! [`merge(seqs)`]: merge
//! [`join_pad(a, b)`]: join_pad
//! [`join_trim(a, b)`]: join_trim
//! [`par_consume(seq, f)`]: par_consume
//! [`wait_all(handles)`]: wait_all

pub mod build;
pub mod concurrent;
mod error;
mod handoff;
mod par;
pub mod prelude;
mod pull;
mod seq;
pub mod sequential;
mod signal;
pub mod sink;
mod worker;

pub use build::{from_chan, FromChan};
pub use concurrent::{
    join, join_pad, join_pad_or, join_trim, join_with, merge, merge2, merge_with, split, split_with,
    Join, JoinPolicy, Merge, Pad, SplitHalf, Trim,
};
pub use error::{Error, Result};
pub use par::{in_par, par_consume, par_consume_with, ParSeq};
pub use pull::{pull, Pull};
pub use seq::{stop, SeqExt};
pub use sequential::{partition, split_into, tee, Dest, Partition, Tee};
pub use signal::{Listener, Signal};
pub use sink::{to_chan, to_vec, Sink, ToChan, ToVec};
pub use worker::{wait_all, SpawnConfig, WaitHandle};
