// taskchain/src/collection/hooks.rs

//! Contains methods for attaching `before` / `after` hooks and deferred
//! configurators, and the resolution step that turns the queue into the order
//! entries actually fire in.

use crate::collection::definition::{Collection, Entry, Position};
use crate::core::outcome::Data;
use crate::core::task::Task;
use crate::error::{CollectionError, TaskchainResult};
use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{event, Level};

impl Collection {
  /// Runs `hook` immediately before the entry named `attach_point`. Its outcome
  /// merges into that entry's result slot.
  ///
  /// Attach points are resolved by name when the collection runs, so the named
  /// entry may be added before or after the hook.
  pub fn before<H>(&mut self, attach_point: impl Into<String>, hook: H) -> &mut Self
  where
    H: Task + 'static,
  {
    self.push_hook(attach_point.into(), Position::Before, None, hook)
  }

  /// Like `before`, but the hook's outcome is stored under its own `name`.
  /// The name can itself be used as an attach point.
  pub fn before_named<H>(&mut self, attach_point: impl Into<String>, hook: H, name: impl Into<String>) -> &mut Self
  where
    H: Task + 'static,
  {
    let name = name.into();
    self.claim_name(&name);
    self.push_hook(attach_point.into(), Position::Before, Some(name), hook)
  }

  /// Runs `hook` immediately after the entry named `attach_point`. Hooks on the
  /// same point fire in the order they were attached.
  pub fn after<H>(&mut self, attach_point: impl Into<String>, hook: H) -> &mut Self
  where
    H: Task + 'static,
  {
    self.push_hook(attach_point.into(), Position::After, None, hook)
  }

  pub fn after_named<H>(&mut self, attach_point: impl Into<String>, hook: H, name: impl Into<String>) -> &mut Self
  where
    H: Task + 'static,
  {
    let name = name.into();
    self.claim_name(&name);
    self.push_hook(attach_point.into(), Position::After, Some(name), hook)
  }

  fn push_hook<H>(&mut self, attach_point: String, position: Position, name: Option<String>, hook: H) -> &mut Self
  where
    H: Task + 'static,
  {
    event!(Level::TRACE, %attach_point, ?position, ?name, "Hook queued.");
    self.entries.push(Entry::Hook {
      attach_point,
      position,
      name,
      task: Arc::new(hook),
    });
    self
  }

  /// Configures `target` from the shared state just before it runs.
  ///
  /// `target` must be the same `Arc` passed to `add`/`add_named`. The configurator
  /// fires in the target's `before` slot (alongside its other `before` hooks, in
  /// attachment order), so it sees every value produced earlier in the run no
  /// matter where in the queue `defer` was called.
  pub fn defer<T, F>(&mut self, target: &Arc<T>, configure: F) -> &mut Self
  where
    T: Send + Sync + 'static,
    F: Fn(&T, &Data) + Send + Sync + 'static,
  {
    let unit = Arc::clone(target);
    self.entries.push(Entry::Defer {
      target: Arc::as_ptr(target) as *const () as usize,
      target_type: type_name::<T>(),
      configure: Box::new(move |state| configure(&unit, state)),
    });
    self
  }

  // --- Resolution ---

  /// Returns entry indices in firing order.
  ///
  /// Top-level entries keep queue order. Each task or named hook is surrounded by
  /// the hooks attached to its name: `before` hooks first, then the entry, then
  /// `after` hooks, each group in attachment order.
  pub(crate) fn resolve_order(&self) -> TaskchainResult<Vec<usize>> {
    if let Some(err) = &self.config_error {
      return Err(err.clone());
    }

    let mut attachments = Attachments::default();
    for (idx, entry) in self.entries.iter().enumerate() {
      match entry {
        Entry::Hook {
          attach_point, position, ..
        } => attachments.attach(attach_point, *position, idx),
        Entry::Defer {
          target, target_type, ..
        } => {
          let name = self.defer_target_name(*target, target_type)?;
          attachments.attach(name, Position::Before, idx);
        }
        _ => {}
      }
    }

    let mut order = Vec::with_capacity(self.entries.len());
    for (idx, entry) in self.entries.iter().enumerate() {
      match entry {
        Entry::Hook { .. } | Entry::Defer { .. } => {}
        _ => self.place(idx, &attachments, &mut order),
      }
    }

    if order.len() != self.entries.len() {
      let placed: HashSet<usize> = order.iter().copied().collect();
      let stray = self.entries.iter().enumerate().find_map(|(idx, entry)| match entry {
        Entry::Hook { attach_point, .. } if !placed.contains(&idx) => Some(attach_point.clone()),
        _ => None,
      });
      if let Some(attach_point) = stray {
        event!(Level::ERROR, %attach_point, "Hook attach point does not resolve.");
        return Err(CollectionError::UnknownAttachPoint { attach_point });
      }
    }

    Ok(order)
  }

  fn place(&self, idx: usize, attachments: &Attachments<'_>, order: &mut Vec<usize>) {
    let own_name = match &self.entries[idx] {
      Entry::Task { name, .. } => Some(name.as_str()),
      Entry::Hook { name, .. } => name.as_deref(),
      _ => None,
    };
    let Some(name) = own_name else {
      order.push(idx);
      return;
    };
    for &hook in attachments.hooks(name, Position::Before) {
      self.place(hook, attachments, order);
    }
    order.push(idx);
    for &hook in attachments.hooks(name, Position::After) {
      self.place(hook, attachments, order);
    }
  }

  fn defer_target_name(&self, target: usize, target_type: &str) -> TaskchainResult<&str> {
    let mut matches = self.entries.iter().filter_map(|entry| match entry {
      Entry::Task { name, identity, .. } if *identity == target => Some(name.as_str()),
      _ => None,
    });
    match (matches.next(), matches.next()) {
      (Some(name), None) => Ok(name),
      (None, _) => Err(CollectionError::DeferTargetMissing {
        type_name: target_type.to_string(),
      }),
      (Some(_), Some(_)) => Err(CollectionError::DeferTargetAmbiguous {
        type_name: target_type.to_string(),
      }),
    }
  }
}

/// Hook entry indices keyed by attach-point name, in queue order.
#[derive(Default)]
struct Attachments<'a> {
  before: HashMap<&'a str, Vec<usize>>,
  after: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Attachments<'a> {
  fn attach(&mut self, name: &'a str, position: Position, idx: usize) {
    let map = match position {
      Position::Before => &mut self.before,
      Position::After => &mut self.after,
    };
    map.entry(name).or_default().push(idx);
  }

  fn hooks(&self, name: &str, position: Position) -> &[usize] {
    let map = match position {
      Position::Before => &self.before,
      Position::After => &self.after,
    };
    map.get(name).map(Vec::as_slice).unwrap_or(&[])
  }
}
