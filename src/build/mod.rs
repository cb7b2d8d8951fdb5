//! Building sequences from external producers
//!
//! This module bridges channel-based producers into the sequence world. The
//! opposite direction is the [`ToChan`](crate::sink::ToChan) sink.

mod chan;

pub use chan::{from_chan, FromChan};
