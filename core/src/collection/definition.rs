// taskchain/src/collection/definition.rs

//! Contains the `Collection` struct, its queue entries, and the builder methods
//! that append primary tasks, code steps, progress messages, and rollback /
//! completion registrations.

use crate::core::logger::{Logger, TracingLogger};
use crate::core::outcome::{Data, TaskOutput};
use crate::core::state::State;
use crate::core::task::{task_fn, Task};
use crate::error::CollectionError;
use std::any::type_name;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, Level};

/// Result key holding the wall-clock duration of a run, in seconds. Always last.
pub const TIME_KEY: &str = "time";

const UNNAMED_PREFIX: &str = "unnamed-";

/// A code step: receives the shared `State` and resolves to a `TaskOutput`.
pub(crate) type CodeHandler = Box<dyn Fn(State) -> Pin<Box<dyn Future<Output = TaskOutput> + Send>> + Send + Sync>;

/// A deferred configurator, already bound to its target unit.
pub(crate) type Configurator = Box<dyn Fn(&Data) + Send + Sync>;

/// Where a hook fires relative to its attach point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
  Before,
  After,
}

/// One slot in the queue, in builder-call order.
pub(crate) enum Entry {
  Task {
    name: String,
    /// Address of the unit's allocation; lets `defer` find the entry by instance.
    identity: usize,
    task: Arc<dyn Task>,
  },
  Hook {
    attach_point: String,
    position: Position,
    /// Own result name. When absent the outcome merges into the attach point's slot.
    name: Option<String>,
    task: Arc<dyn Task>,
  },
  Code {
    name: String,
    handler: CodeHandler,
  },
  Defer {
    target: usize,
    target_type: &'static str,
    configure: Configurator,
  },
  Progress {
    text: String,
  },
  Rollback {
    action: Arc<dyn Task>,
  },
  Completion {
    action: Arc<dyn Task>,
  },
}

impl Entry {
  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Entry::Task { .. } => "task",
      Entry::Hook { .. } => "hook",
      Entry::Code { .. } => "code",
      Entry::Defer { .. } => "defer",
      Entry::Progress { .. } => "progress",
      Entry::Rollback { .. } => "rollback",
      Entry::Completion { .. } => "completion",
    }
  }
}

/// An ordered queue of tasks, hooks, code steps, and rollback/completion
/// registrations, executed once by `run`.
///
/// Builder methods return `&mut Self` so calls can be chained. Naming mistakes
/// (duplicate or reserved names, hooks on unknown entries, `defer` on a task that
/// was never added) do not panic: the first one is recorded and returned by `run`
/// before anything executes.
pub struct Collection {
  pub(crate) entries: Vec<Entry>,
  /// Every result-visible name claimed so far, explicit or generated.
  pub(crate) names: HashSet<String>,
  pub(crate) config_error: Option<CollectionError>,
  pub(crate) logger: Arc<dyn Logger>,
  /// Shared state as it stood at the end of the most recent run.
  pub(crate) final_state: Data,
}

impl Default for Collection {
  fn default() -> Self {
    Self::new()
  }
}

impl Collection {
  pub fn new() -> Self {
    Self {
      entries: Vec::new(),
      names: HashSet::new(),
      config_error: None,
      logger: Arc::new(TracingLogger),
      final_state: Data::new(),
    }
  }

  /// Replaces the logger that receives progress messages.
  pub fn set_logger(&mut self, logger: Arc<dyn Logger>) -> &mut Self {
    self.logger = logger;
    self
  }

  /// Number of queued entries, hooks and registrations included.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// The shared state as it stood at the end of the most recent `run`.
  /// Empty before the first run.
  pub fn state(&self) -> &Data {
    &self.final_state
  }

  // --- Primary tasks ---

  /// Appends a primary task under a generated name (`unnamed-<queue index>`).
  pub fn add<T>(&mut self, task: Arc<T>) -> &mut Self
  where
    T: Task + 'static,
  {
    let name = self.generated_name();
    self.push_task(name, task)
  }

  /// Appends a primary task whose outcome is stored under `name`.
  pub fn add_named<T>(&mut self, name: impl Into<String>, task: Arc<T>) -> &mut Self
  where
    T: Task + 'static,
  {
    let name = name.into();
    self.claim_name(&name);
    self.push_task(name, task)
  }

  fn push_task<T>(&mut self, name: String, task: Arc<T>) -> &mut Self
  where
    T: Task + 'static,
  {
    let identity = Arc::as_ptr(&task) as *const () as usize;
    event!(Level::TRACE, %name, task_type = %type_name::<T>(), "Task queued.");
    self.entries.push(Entry::Task { name, identity, task });
    self
  }

  // --- Code steps ---

  /// Appends a code step. The closure receives the shared state and may return an
  /// `Outcome`, a bare code, `()`, or an `anyhow::Result` of those. A returned outcome
  /// is merged under a generated name and halts the run if it failed.
  pub fn add_code<F, Fut, R>(&mut self, code: F) -> &mut Self
  where
    F: Fn(State) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<TaskOutput> + Send + 'static,
  {
    let name = self.generated_name();
    let handler: CodeHandler = Box::new(move |state| {
      let fut = code(state);
      Box::pin(async move { Into::<TaskOutput>::into(fut.await) })
    });
    self.entries.push(Entry::Code { name, handler });
    self
  }

  /// Appends one code step per item; each invocation receives its item and the state.
  /// A failing item stops the run like any other step.
  pub fn add_iterable<I, F, Fut, R>(&mut self, items: I, code: F) -> &mut Self
  where
    I: IntoIterator,
    I::Item: Clone + Send + Sync + 'static,
    F: Fn(I::Item, State) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<TaskOutput> + Send + 'static,
  {
    let code = Arc::new(code);
    for item in items {
      let code = Arc::clone(&code);
      self.add_code(move |state| (*code)(item.clone(), state));
    }
    self
  }

  /// Appends a message for the logger. `{key}` placeholders are filled from the
  /// shared state at the moment the entry fires.
  pub fn progress_message(&mut self, text: impl Into<String>) -> &mut Self {
    self.entries.push(Entry::Progress { text: text.into() });
    self
  }

  // --- Rollback / completion registrations ---

  /// Queues a registration: once reached, `task` joins the rollback stack, which
  /// fires only if the run halts on a failure.
  pub fn rollback<T>(&mut self, task: T) -> &mut Self
  where
    T: Task + 'static,
  {
    self.entries.push(Entry::Rollback { action: Arc::new(task) });
    self
  }

  pub fn rollback_code<F, Fut, R>(&mut self, code: F) -> &mut Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<TaskOutput> + Send + 'static,
  {
    self.rollback(task_fn(code))
  }

  /// Queues a registration: once reached, `task` joins the completion stack, which
  /// fires at the end of every run.
  pub fn completion<T>(&mut self, task: T) -> &mut Self
  where
    T: Task + 'static,
  {
    self.entries.push(Entry::Completion { action: Arc::new(task) });
    self
  }

  pub fn completion_code<F, Fut, R>(&mut self, code: F) -> &mut Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<TaskOutput> + Send + 'static,
  {
    self.completion(task_fn(code))
  }

  // --- Naming bookkeeping ---

  /// `unnamed-<queue index>`, moving past indices an explicit name already took.
  pub(crate) fn generated_name(&mut self) -> String {
    let mut index = self.entries.len();
    let mut name = format!("{}{}", UNNAMED_PREFIX, index);
    while self.names.contains(&name) {
      index += 1;
      name = format!("{}{}", UNNAMED_PREFIX, index);
    }
    self.claim_name(&name);
    name
  }

  /// Reserves a result-visible name, recording a configuration error on conflict.
  pub(crate) fn claim_name(&mut self, name: &str) {
    if name == TIME_KEY {
      self.record_error(CollectionError::ReservedName { name: name.to_string() });
    } else if !self.names.insert(name.to_string()) {
      self.record_error(CollectionError::DuplicateName { name: name.to_string() });
    }
  }

  /// Keeps the first configuration error; later ones are only logged.
  pub(crate) fn record_error(&mut self, err: CollectionError) {
    event!(Level::ERROR, error = %err, "Collection configuration error.");
    if self.config_error.is_none() {
      self.config_error = Some(err);
    }
  }
}
