//! Fan-out that runs on the consumer's thread
//!
//! These engines spawn nothing: every sink write happens inside the
//! consumer's own call to `next`.

mod partition;
mod split;
mod tee;

pub use partition::{partition, Dest, Partition};
pub use split::split_into;
pub use tee::{tee, Tee};
