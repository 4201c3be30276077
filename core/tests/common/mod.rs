// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use taskchain::{task_fn, Data, Logger, Outcome, Task, TaskOutput, Value};
use tracing::Level;

// --- Common Tasks ---

/// Counts how many times it ran.
#[derive(Debug, Default)]
pub struct CountingTask {
  count: AtomicUsize,
}

impl CountingTask {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn count(&self) -> usize {
    self.count.load(Ordering::SeqCst)
  }
}

#[async_trait::async_trait]
impl Task for CountingTask {
  async fn run(&self) -> TaskOutput {
    self.count.fetch_add(1, Ordering::SeqCst);
    Outcome::success().into()
  }
}

/// A closure step that runs `task` once per invocation.
pub fn run_counter(task: &Arc<CountingTask>) -> impl Task {
  let task = Arc::clone(task);
  task_fn(move || {
    let task = Arc::clone(&task);
    async move { task.run().await }
  })
}

/// Produces `{key: value}`. The hook methods rewrite `value` in place and report it
/// under the same key, so each hook overwrites the previous result.
#[derive(Debug)]
pub struct DecoratingTask {
  key: String,
  value: Mutex<String>,
}

impl DecoratingTask {
  pub fn new(key: &str, value: &str) -> Arc<Self> {
    Arc::new(Self {
      key: key.to_string(),
      value: Mutex::new(value.to_string()),
    })
  }

  fn current(&self) -> Outcome {
    Outcome::success().with(self.key.clone(), self.value.lock().clone())
  }

  pub fn parenthesizer(&self) -> Outcome {
    {
      let mut value = self.value.lock();
      *value = format!("({})", *value);
    }
    self.current()
  }

  pub fn emphasizer(&self) -> Outcome {
    {
      let mut value = self.value.lock();
      *value = format!("*{}*", *value);
    }
    self.current()
  }
}

#[async_trait::async_trait]
impl Task for DecoratingTask {
  async fn run(&self) -> TaskOutput {
    self.current().into()
  }
}

/// Returns whatever data it was given, possibly configured late via `defer`.
#[derive(Debug, Default)]
pub struct PassthruTask {
  data: Mutex<Data>,
}

impl PassthruTask {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn provide_data(&self, key: &str, value: impl Into<Value>) {
    self.data.lock().insert(key.to_string(), value.into());
  }
}

#[async_trait::async_trait]
impl Task for PassthruTask {
  async fn run(&self) -> TaskOutput {
    Outcome::success().with_data(self.data.lock().clone()).into()
  }
}

/// Always fails with the given code.
pub struct FailingTask {
  pub code: i32,
  pub message: &'static str,
}

#[async_trait::async_trait]
impl Task for FailingTask {
  async fn run(&self) -> TaskOutput {
    Outcome::failure(self.code, self.message).with("failed", true).into()
  }
}

// --- Logger capturing progress messages ---

#[derive(Debug, Default)]
pub struct CapturingLogger {
  lines: Mutex<Vec<String>>,
}

impl CapturingLogger {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().clone()
  }

  pub fn saw(&self, text: &str) -> bool {
    self.lines.lock().iter().any(|line| line.contains(text))
  }
}

impl Logger for CapturingLogger {
  fn log(&self, message: &str) {
    self.lines.lock().push(message.to_string());
  }
}

/// Keys of a data bag, in iteration order, joined with commas.
pub fn key_order(data: &Data) -> String {
  data.keys().map(String::as_str).collect::<Vec<_>>().join(",")
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
