// taskchain/examples/basic_collection.rs

use std::sync::Arc;
use taskchain::{bind, Collection, CollectionError, Outcome, State, Task, TaskOutput};
use tracing::info;

// 1. A work unit with state that hooks can transform between invocations.
struct VersionTask {
  version: parking_lot::Mutex<String>,
}

impl VersionTask {
  fn new(version: &str) -> Arc<Self> {
    Arc::new(Self {
      version: parking_lot::Mutex::new(version.to_string()),
    })
  }

  fn report(&self) -> Outcome {
    Outcome::success().with("version", self.version.lock().clone())
  }

  // Used as an `after` hook: rewrites the version in place.
  fn add_prefix(&self) -> Outcome {
    {
      let mut version = self.version.lock();
      *version = format!("v{}", *version);
    }
    self.report()
  }
}

#[async_trait::async_trait]
impl Task for VersionTask {
  async fn run(&self) -> TaskOutput {
    self.report().into()
  }
}

#[tokio::main]
async fn main() -> Result<(), CollectionError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Basic Collection Example ---");

  let version = VersionTask::new("2.4.1");

  // 2. Queue tasks, hooks and code steps.
  let mut collection = Collection::new();
  collection
    .progress_message("Resolving version")
    .add_named("version", version.clone())
    .after("version", bind(&version, VersionTask::add_prefix))
    .add_code(|state: State| async move {
      let tag = state.get_str("version").unwrap_or_default();
      state.insert("release_name", format!("release-{}", tag));
      Outcome::success().with("tagged", true)
    })
    .progress_message("Prepared {release_name}");

  // 3. Run it once.
  let result = collection.run().await?;

  info!(
    succeeded = result.succeeded(),
    version = %result["version"]["version"],
    time = %result["time"],
    "Collection finished."
  );
  info!("Final state: {:?}", collection.state());
  Ok(())
}
