// taskchain/examples/rollback_completion.rs

use taskchain::{Collection, CollectionError, Outcome, State};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), CollectionError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Rollback / Completion Example ---");

  let mut collection = Collection::new();
  collection
    .add_code(|state: State| async move {
      info!("Creating staging directory");
      state.insert("staging_dir", "/tmp/staging-42");
    })
    // Registered before the failure: fires only because the run halts.
    .rollback_code(|| async {
      warn!("Rolling back: removing staging directory");
    })
    // Registered before the failure: fires no matter what.
    .completion_code(|| async {
      info!("Completion: releasing deploy lock");
    })
    .add_code(|state: State| async move {
      let dir = state.get_str("staging_dir").unwrap_or_default();
      Outcome::failure(2, format!("upload from {} failed", dir))
    })
    // Never reached, so never registered.
    .rollback_code(|| async {
      warn!("This rollback is not registered");
    })
    .add_code(|_state: State| async {
      info!("This step never runs");
    });

  let result = collection.run().await?;
  info!(
    succeeded = result.succeeded(),
    code = result.code(),
    reason = result.message(),
    "Collection finished."
  );
  Ok(())
}
