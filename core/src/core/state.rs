// taskchain/src/core/state.rs
use crate::core::outcome::Data;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use std::sync::Arc;

/// The shared state threaded through one run of a `Collection`.
///
/// Cloning a `State` shares the same underlying map, which is how code steps
/// receive it "by reference": writes made by one step are visible to every
/// step that runs afterwards.
///
/// IMPORTANT: Lock guards obtained from this struct are blocking and MUST NOT
/// be held across `.await` suspension points in asynchronous code.
#[derive(Debug, Clone, Default)]
pub struct State(Arc<RwLock<Data>>);

impl State {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquires a read lock.
  /// The returned guard MUST be dropped before any `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, Data> {
    self.0.read()
  }

  /// Acquires a write lock.
  /// The returned guard MUST be dropped before any `.await` point.
  pub fn write(&self) -> RwLockWriteGuard<'_, Data> {
    self.0.write()
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self.read().get(key).cloned()
  }

  /// Returns the value under `key` if it is a JSON string.
  pub fn get_str(&self, key: &str) -> Option<String> {
    self.read().get(key).and_then(Value::as_str).map(str::to_owned)
  }

  pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.write().insert(key.into(), value.into())
  }

  /// Copies every key of `data` in, overwriting existing keys.
  pub fn merge(&self, data: &Data) {
    let mut guard = self.write();
    for (key, value) in data {
      guard.insert(key.clone(), value.clone());
    }
  }

  pub fn snapshot(&self) -> Data {
    self.read().clone()
  }
}
