// taskchain/examples/deferred_config.rs

use std::sync::Arc;
use taskchain::{Collection, CollectionError, Data, Outcome, Task, TaskOutput};
use tracing::info;

/// Reports whatever configuration it has been given.
#[derive(Default)]
struct DeployTask {
  config: parking_lot::Mutex<Data>,
}

impl DeployTask {
  fn set(&self, key: &str, value: impl Into<taskchain::Value>) {
    self.config.lock().insert(key.to_string(), value.into());
  }
}

#[async_trait::async_trait]
impl Task for DeployTask {
  async fn run(&self) -> TaskOutput {
    let config = self.config.lock().clone();
    info!(?config, "Deploying");
    Outcome::success().with_data(config).into()
  }
}

#[tokio::main]
async fn main() -> Result<(), CollectionError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Deferred Configuration Example ---");

  let build = Arc::new(DeployTask::default());
  build.set("artifact", "dist/app-2.4.1.tar.gz");
  let deploy = Arc::new(DeployTask::default());

  let mut collection = Collection::new();
  collection
    .add_named("build", build)
    .add_named("deploy", deploy.clone())
    // Runs just before "deploy", after "build" has produced `artifact`.
    .defer(&deploy, |task, state| {
      if let Some(artifact) = state.get("artifact") {
        task.set("source", artifact.clone());
      }
    });

  let result = collection.run().await?;
  info!(deployed = %result["deploy"]["source"], "Collection finished.");
  Ok(())
}
