// taskchain/src/error.rs
use thiserror::Error;

/// Configuration errors detected while resolving a `Collection`'s queue.
///
/// These are returned by `Collection::run` before any entry executes. A failing
/// work unit is not an error; it is reported through the returned `Outcome`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
  #[error("Entry name '{name}' is used more than once")]
  DuplicateName { name: String },

  #[error("Entry name '{name}' is reserved")]
  ReservedName { name: String },

  #[error("Hook attached to unknown entry: {attach_point}")]
  UnknownAttachPoint { attach_point: String },

  #[error("Deferred configuration targets a task that was never added (type: {type_name})")]
  DeferTargetMissing { type_name: String },

  #[error("Deferred configuration target was added more than once (type: {type_name})")]
  DeferTargetAmbiguous { type_name: String },
}

pub type TaskchainResult<T, E = CollectionError> = std::result::Result<T, E>;
