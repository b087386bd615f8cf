//! Batched, partially-atomic create/write/unlink.
//!
//! A bulk request moves through `validating -> (validation_failed |
//! would_execute) -> executing -> done`. Validation happens before any remote
//! mutation. Execution submits fixed-size windows strictly in input order;
//! each window is all-or-nothing on the remote side, and there is no rollback
//! across windows.

pub mod engine;

pub use engine::{BatchMutationEngine, MutationError};
