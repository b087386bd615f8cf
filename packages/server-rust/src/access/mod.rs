//! Model- and record-level permission probing.

pub mod denial;
pub mod probe;

pub use denial::{parse_denial, Denial};
pub use probe::{AccessError, AccessProbe};
