//! Weft Store
//!
//! Persistence for named pipelines. The [`PipelineStore`] trait defines
//! save/load/list/delete over [`PipelineSnapshot`]s; [`FsPipelineStore`]
//! keeps one JSON file per pipeline under a root directory.
//!
//! A store only moves snapshots around. Turning a loaded snapshot back into
//! a live pipeline goes through `Pipeline::from_snapshot`, which re-validates
//! the structural invariants - so a tampered file cannot smuggle a cyclic or
//! dangling graph into the engine.

mod fs_store;
mod types;

pub use fs_store::FsPipelineStore;
pub use types::StoredPipeline;

use async_trait::async_trait;

use weft_graph::PipelineSnapshot;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// No pipeline saved under that name.
  #[error("pipeline not found: {0}")]
  NotFound(String),

  /// The name cannot be used as a storage key.
  #[error("invalid pipeline name: {0:?}")]
  InvalidName(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The stored file is not a valid pipeline record.
  #[error("malformed pipeline file: {0}")]
  Malformed(#[from] serde_json::Error),
}

/// Storage for named pipeline snapshots.
#[async_trait]
pub trait PipelineStore: Send + Sync {
  /// Save a snapshot under `name`, replacing any previous version.
  async fn save(&self, name: &str, snapshot: &PipelineSnapshot) -> Result<(), StoreError>;

  /// Load the pipeline saved under `name`.
  async fn load(&self, name: &str) -> Result<StoredPipeline, StoreError>;

  /// Names of all saved pipelines, sorted.
  async fn list(&self) -> Result<Vec<String>, StoreError>;

  /// Delete the pipeline saved under `name`.
  async fn delete(&self, name: &str) -> Result<(), StoreError>;
}
