// taskchain/src/lib.rs

//! Taskchain: a sequential task-orchestration engine.
//!
//! A `Collection` composes independently written units of work into one ordered
//! run:
//!  - Primary tasks, named or auto-named, executed in the order they were added.
//!  - `before` / `after` hooks attached to a named entry, merging their results
//!    into that entry's slot or into a slot of their own.
//!  - Shared state threaded through every step, readable by later tasks, code
//!    steps, and deferred configurators.
//!  - Stop on the first failure, with rollback actions fired only on failure and
//!    completion actions fired always.

pub mod collection;
pub mod core;
pub mod error;

// --- Re-exports for the Public API ---

pub use crate::core::logger::{Logger, TracingLogger};
pub use crate::core::outcome::{Data, Outcome, TaskOutput, FAILURE_CODE, SUCCESS_CODE};
pub use crate::core::state::State;
pub use crate::core::task::{bind, task_fn, BoundMethod, IgnoreErrors, Task, TaskFn};

pub use crate::collection::{Collection, TIME_KEY};

pub use crate::error::{CollectionError, TaskchainResult};

// Re-exported so units can build outcome values without a direct dependency.
pub use serde_json::{json, Value};

/*
    Core Workflow:
    1. Implement `Task` for your units (or wrap closures with `task_fn`).
    2. Create a `Collection` and queue work with `.add()` / `.add_named()` / `.add_code()`.
    3. Attach hooks with `.before()` / `.after()`; use `bind(&unit, Unit::method)`
       for hooks that transform the same unit instance.
    4. Register cleanup with `.rollback()` (failure only) and `.completion()` (always).
       Registrations only take effect if the run reaches them.
    5. Use `.defer(&unit, |unit, state| ...)` to configure a unit from earlier results.
    6. `collection.run().await` returns the aggregate `Outcome`; `collection.state()`
       holds the final shared state.
*/
