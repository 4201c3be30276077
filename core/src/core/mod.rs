pub mod logger;
pub mod outcome;
pub mod state;
pub mod task;

// Re-export key types for easier access from other modules (and lib.rs)
pub use logger::{Logger, TracingLogger};
pub use outcome::{Data, Outcome, TaskOutput};
pub use state::State;
pub use task::{bind, task_fn, BoundMethod, IgnoreErrors, Task, TaskFn};
