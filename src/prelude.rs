//! Commonly used imports
//!
//! Use `use seqflow::prelude::*;` for quick access to the most common types and functions.

// Extension methods
pub use crate::seq::{stop, SeqExt};

// Sinks
pub use crate::sink::{to_chan, to_vec, Sink, ToChan, ToVec};

// Parallel sequences and their drivers
pub use crate::par::{in_par, par_consume, ParSeq};
pub use crate::worker::{wait_all, WaitHandle};

// Fan-out
pub use crate::sequential::{partition, split_into, tee, Dest};
pub use crate::concurrent::split;

// Fan-in and lockstep
pub use crate::concurrent::{join, join_pad, join_pad_or, join_trim, merge, merge2};

// Pull protocol and channel bridges
pub use crate::build::from_chan;
pub use crate::pull::pull;
pub use crate::signal::Signal;
