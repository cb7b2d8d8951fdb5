//! Concurrent fan-in, fan-out and lockstep engines
//!
//! Every engine here runs its branches on worker threads that rendezvous with
//! the consumer through single-slot handoffs. Dropping an engine's output
//! withdraws it and lets its workers exit.

mod join;
mod merge;
mod split;

pub use join::{join, join_pad, join_pad_or, join_trim, join_with, Join, JoinPolicy, Pad, Trim};
pub use merge::{merge, merge2, merge_with, Merge};
pub use split::{split, split_with, SplitHalf};
