// taskchain/src/collection/mod.rs

//! Defines the `Collection` orchestrator: queue construction, hook attachment,
//! and execution with rollback/completion handling.

pub mod definition;
pub mod execution;
pub mod hooks;

// Re-export the main Collection struct
pub use definition::{Collection, TIME_KEY};
