// taskchain/src/core/outcome.rs

//! Defines the `Outcome` record produced by a single work-unit invocation, and
//! `TaskOutput`, the tagged value a unit actually returns before normalization.

use serde_json::{Map, Value};
use std::ops::Index;

/// A keyed bag of values. Iteration follows first-insertion order.
pub type Data = Map<String, Value>;

/// Exit code of a successful outcome.
pub const SUCCESS_CODE: i32 = 0;

/// Code used for failures that carry no code of their own.
pub const FAILURE_CODE: i32 = 1;

/// Result of a single work unit: an exit code (0 = success), a human message,
/// and the data the unit produced.
///
/// There are no `&mut` setters; the consuming builders (`with`, `with_data`,
/// `with_message`) are the only way to populate one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
  code: i32,
  message: String,
  data: Data,
}

impl Outcome {
  pub fn success() -> Self {
    Self::default()
  }

  /// A failed outcome. A `code` of 0 is replaced by `FAILURE_CODE` so the
  /// success flag always agrees with the code.
  pub fn failure(code: i32, message: impl Into<String>) -> Self {
    let code = if code == SUCCESS_CODE { FAILURE_CODE } else { code };
    Self {
      code,
      message: message.into(),
      data: Data::new(),
    }
  }

  /// Wraps a bare status code: succeeded iff `code == 0`.
  pub fn from_code(code: i32) -> Self {
    Self {
      code,
      ..Self::default()
    }
  }

  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.data.insert(key.into(), value.into());
    self
  }

  /// Adds every key of `data`, overwriting existing keys.
  pub fn with_data(mut self, data: Data) -> Self {
    self.data.extend(data);
    self
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = message.into();
    self
  }

  pub fn succeeded(&self) -> bool {
    self.code == SUCCESS_CODE
  }

  pub fn code(&self) -> i32 {
    self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn data(&self) -> &Data {
    &self.data
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.data.get(key)
  }

  pub fn into_data(self) -> Data {
    self.data
  }
}

/// Missing keys index to `Value::Null`, like `serde_json::Value` itself.
impl Index<&str> for Outcome {
  type Output = Value;

  fn index(&self, key: &str) -> &Value {
    static NULL: Value = Value::Null;
    self.data.get(key).unwrap_or(&NULL)
  }
}

/// What a work unit or code step hands back to the engine.
///
/// Units may return a full `Outcome`, a bare status code, or nothing at all.
/// The engine calls `normalize` at the single point where results are merged.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
  Outcome(Outcome),
  Code(i32),
  Nothing,
}

impl TaskOutput {
  /// Converts to an `Outcome`. `Nothing` has no outcome to merge.
  pub fn normalize(self) -> Option<Outcome> {
    match self {
      TaskOutput::Outcome(outcome) => Some(outcome),
      TaskOutput::Code(code) => Some(Outcome::from_code(code)),
      TaskOutput::Nothing => None,
    }
  }
}

impl From<Outcome> for TaskOutput {
  fn from(outcome: Outcome) -> Self {
    TaskOutput::Outcome(outcome)
  }
}

impl From<i32> for TaskOutput {
  fn from(code: i32) -> Self {
    TaskOutput::Code(code)
  }
}

impl From<()> for TaskOutput {
  fn from(_: ()) -> Self {
    TaskOutput::Nothing
  }
}

// Lets units use `?` internally. The error chain becomes the failure message.
impl<T: Into<TaskOutput>> From<anyhow::Result<T>> for TaskOutput {
  fn from(result: anyhow::Result<T>) -> Self {
    match result {
      Ok(value) => value.into(),
      Err(err) => TaskOutput::Outcome(Outcome::failure(FAILURE_CODE, format!("{err:#}"))),
    }
  }
}
