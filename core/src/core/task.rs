// taskchain/src/core/task.rs

//! Defines the `Task` trait (the work-unit capability consumed by a `Collection`)
//! and adapters that turn closures and methods into tasks.

use crate::core::outcome::{Outcome, TaskOutput};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// A unit of work the engine can run.
///
/// `run` takes `&self`: a unit that changes between invocations keeps its state
/// behind interior mutability (atomics, `parking_lot::Mutex`, ...). That lets a
/// single `Arc<T>` be queued as a primary task while hooks built from the same
/// `Arc` transform it before or after it runs.
#[async_trait]
pub trait Task: Send + Sync {
  async fn run(&self) -> TaskOutput;
}

#[async_trait]
impl<T: Task + ?Sized> Task for Arc<T> {
  async fn run(&self) -> TaskOutput {
    (**self).run().await
  }
}

#[async_trait]
impl<T: Task + ?Sized> Task for Box<T> {
  async fn run(&self) -> TaskOutput {
    (**self).run().await
  }
}

// --- Closures ---

/// A task backed by an async closure. See `task_fn`.
pub struct TaskFn<F>(F);

/// Wraps `Fn() -> impl Future` as a `Task`.
///
/// The closure's output may be anything convertible into `TaskOutput`:
/// an `Outcome`, a bare `i32` code, `()`, or an `anyhow::Result` of those.
pub fn task_fn<F, Fut, R>(f: F) -> TaskFn<F>
where
  F: Fn() -> Fut + Send + Sync,
  Fut: Future<Output = R> + Send + 'static,
  R: Into<TaskOutput> + Send + 'static,
{
  TaskFn(f)
}

#[async_trait]
impl<F, Fut, R> Task for TaskFn<F>
where
  F: Fn() -> Fut + Send + Sync,
  Fut: Future<Output = R> + Send + 'static,
  R: Into<TaskOutput> + Send + 'static,
{
  async fn run(&self) -> TaskOutput {
    (self.0)().await.into()
  }
}

// --- Bound methods ---

/// A unit reference paired with one of its synchronous operations.
///
/// Used for hooks that are "a method of a specific task instance": every
/// invocation calls `op` on the same shared `unit`.
pub struct BoundMethod<T, R> {
  unit: Arc<T>,
  op: fn(&T) -> R,
}

pub fn bind<T, R>(unit: &Arc<T>, op: fn(&T) -> R) -> BoundMethod<T, R> {
  BoundMethod {
    unit: Arc::clone(unit),
    op,
  }
}

#[async_trait]
impl<T, R> Task for BoundMethod<T, R>
where
  T: Send + Sync + 'static,
  R: Into<TaskOutput> + 'static,
{
  async fn run(&self) -> TaskOutput {
    (self.op)(&self.unit).into()
  }
}

// --- Error suppression ---

/// Runs the inner task and reports a failure as success, keeping its data and message.
/// Intended for best-effort cleanup units.
pub struct IgnoreErrors<T>(T);

impl<T: Task> IgnoreErrors<T> {
  pub fn new(task: T) -> Self {
    IgnoreErrors(task)
  }
}

#[async_trait]
impl<T: Task> Task for IgnoreErrors<T> {
  async fn run(&self) -> TaskOutput {
    match self.0.run().await.normalize() {
      Some(outcome) if !outcome.succeeded() => {
        event!(Level::WARN, code = outcome.code(), reason = outcome.message(), "Ignoring task failure.");
        let message = outcome.message().to_string();
        Outcome::success().with_message(message).with_data(outcome.into_data()).into()
      }
      Some(outcome) => outcome.into(),
      None => TaskOutput::Nothing,
    }
  }
}
