// taskchain/src/collection/execution.rs

//! Contains `Collection::run()`: drains the resolved queue, merges outcomes into
//! the shared state and the named-result map, stops at the first failure, and
//! fires the rollback and completion stacks.

use crate::collection::definition::{Collection, Entry, TIME_KEY};
use crate::core::logger::interpolate;
use crate::core::outcome::{Data, Outcome};
use crate::core::state::State;
use crate::core::task::Task;
use crate::error::TaskchainResult;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{event, instrument, span, Instrument, Level};

impl Collection {
  /// Executes every queued entry in order and returns the aggregate outcome.
  ///
  /// - Each task, hook, or code-step outcome is merged into the shared state and
  ///   into the result slot of its name; a failed outcome halts the run.
  /// - Rollback and completion registrations reached before the halt join their
  ///   stacks. Rollback actions fire only if the run halted, completion actions
  ///   always fire; both in registration order. A failing action is logged and the
  ///   remaining actions still run.
  /// - The returned outcome carries the halting entry's code and message (or
  ///   success) and the full result map, with `time` as its last key.
  ///
  /// Returns `Err` only for configuration errors, before any entry executes.
  #[instrument(
    name = "Collection::run",
    skip_all,
    fields(num_entries = self.entries.len()),
    err(Display)
  )]
  pub async fn run(&mut self) -> TaskchainResult<Outcome> {
    let order = self.resolve_order()?;
    event!(Level::DEBUG, steps = order.len(), "Collection execution starting.");

    let state = State::new();
    let mut results = Data::new();
    let mut rollbacks: Vec<Arc<dyn Task>> = Vec::new();
    let mut completions: Vec<Arc<dyn Task>> = Vec::new();
    let mut terminal: Option<Outcome> = None;
    let started = Instant::now();

    for (step_idx, &entry_idx) in order.iter().enumerate() {
      let entry = &self.entries[entry_idx];
      let step_span = span!(Level::DEBUG, "collection_step", step_index = step_idx, kind = entry.kind());

      let merged = match entry {
        Entry::Task { name, task, .. } => {
          let outcome = task.run().instrument(step_span).await.normalize().unwrap_or_default();
          Some((name.as_str(), outcome))
        }
        Entry::Hook {
          attach_point, name, task, ..
        } => {
          let slot = name.as_deref().unwrap_or(attach_point);
          let outcome = task.run().instrument(step_span).await.normalize().unwrap_or_default();
          Some((slot, outcome))
        }
        Entry::Code { name, handler } => handler(state.clone())
          .instrument(step_span)
          .await
          .normalize()
          .map(|outcome| (name.as_str(), outcome)),
        Entry::Defer { configure, .. } => {
          configure(&*state.read());
          None
        }
        Entry::Progress { text } => {
          let message = interpolate(text, &state.read());
          self.logger.log(&message);
          None
        }
        Entry::Rollback { action } => {
          rollbacks.push(Arc::clone(action));
          None
        }
        Entry::Completion { action } => {
          completions.push(Arc::clone(action));
          None
        }
      };

      let Some((slot, outcome)) = merged else {
        continue;
      };
      state.merge(outcome.data());
      merge_into_slot(&mut results, slot, outcome.data());
      if !outcome.succeeded() {
        event!(
          Level::INFO,
          slot,
          code = outcome.code(),
          reason = outcome.message(),
          "Collection halted by a failing entry."
        );
        terminal = Some(outcome);
        break;
      }
      event!(Level::TRACE, slot, "Entry finished.");
    }

    let elapsed = started.elapsed();

    if terminal.is_some() {
      fire_actions("rollback", &rollbacks).await;
    }
    fire_actions("completion", &completions).await;

    results.insert(TIME_KEY.to_string(), Value::from(elapsed.as_secs_f64()));
    self.final_state = state.snapshot();

    let outcome = match terminal {
      Some(failed) => Outcome::failure(failed.code(), failed.message()),
      None => {
        event!(Level::DEBUG, "Collection execution completed successfully.");
        Outcome::success()
      }
    };
    Ok(outcome.with_data(results))
  }
}

/// Merges `data` into the object stored under `slot`, creating it on first write.
fn merge_into_slot(results: &mut Data, slot: &str, data: &Data) {
  let entry = results.entry(slot).or_insert_with(|| Value::Object(Data::new()));
  if let Value::Object(bag) = entry {
    for (key, value) in data {
      bag.insert(key.clone(), value.clone());
    }
  }
}

/// Runs every action, logging failures without stopping.
async fn fire_actions(stack: &str, actions: &[Arc<dyn Task>]) {
  for (action_index, action) in actions.iter().enumerate() {
    let span = span!(Level::DEBUG, "collection_action", stack, action_index);
    let Some(outcome) = action.run().instrument(span).await.normalize() else {
      continue;
    };
    if !outcome.succeeded() {
      event!(
        Level::WARN,
        stack,
        action_index,
        code = outcome.code(),
        reason = outcome.message(),
        "Action failed; continuing with the remaining actions."
      );
    }
  }
}
