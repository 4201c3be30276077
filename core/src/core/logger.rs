// taskchain/src/core/logger.rs

//! The logger capability a `Collection` emits progress messages to.

use crate::core::outcome::Data;
use serde_json::Value;
use tracing::{event, Level};

/// Receives progress messages. The engine never inspects a return value.
pub trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

/// Default logger: each message becomes an INFO event on target `taskchain::progress`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
  fn log(&self, message: &str) {
    event!(target: "taskchain::progress", Level::INFO, "{}", message);
  }
}

/// Replaces `{key}` placeholders with values from `state`.
/// Strings are inserted unquoted; unknown keys are left as written.
pub(crate) fn interpolate(text: &str, state: &Data) -> String {
  let mut out = String::with_capacity(text.len());
  let mut rest = text;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let tail = &rest[open + 1..];
    let Some(close) = tail.find('}') else {
      out.push_str(&rest[open..]);
      return out;
    };
    let key = &tail[..close];
    match state.get(key) {
      Some(Value::String(text)) => out.push_str(text),
      Some(other) => out.push_str(&other.to_string()),
      None => {
        out.push('{');
        out.push_str(key);
        out.push('}');
      }
    }
    rest = &tail[close + 1..];
  }
  out.push_str(rest);
  out
}
