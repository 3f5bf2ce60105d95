use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::debug;

use weft_graph::PipelineSnapshot;

use crate::types::StoredPipeline;
use crate::{PipelineStore, StoreError};

/// Filesystem-based pipeline store.
///
/// Pipelines are stored flat under the root directory, one file per name:
/// ```text
/// {root}/
/// ├── etl-daily.json
/// └── scratch.json
/// ```
pub struct FsPipelineStore {
  root: PathBuf,
}

impl FsPipelineStore {
  /// Create a store rooted at the given directory. The directory is created
  /// lazily on the first save.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Names double as file names, so anything that could escape the root
  /// directory is refused.
  fn validate_name(name: &str) -> Result<(), StoreError> {
    let acceptable = !name.is_empty()
      && name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
      && !name.starts_with('.');
    if acceptable {
      Ok(())
    } else {
      Err(StoreError::InvalidName(name.to_string()))
    }
  }

  fn file_path(&self, name: &str) -> Result<PathBuf, StoreError> {
    Self::validate_name(name)?;
    Ok(self.root.join(format!("{name}.json")))
  }
}

#[async_trait]
impl PipelineStore for FsPipelineStore {
  async fn save(&self, name: &str, snapshot: &PipelineSnapshot) -> Result<(), StoreError> {
    let path = self.file_path(name)?;
    fs::create_dir_all(&self.root).await?;

    let record = StoredPipeline {
      name: name.to_string(),
      saved_at: Utc::now(),
      snapshot: snapshot.clone(),
    };
    let body = serde_json::to_vec_pretty(&record)?;
    fs::write(&path, body).await?;
    debug!(name = %name, path = %path.display(), "pipeline_saved");
    Ok(())
  }

  async fn load(&self, name: &str) -> Result<StoredPipeline, StoreError> {
    let path = self.file_path(name)?;
    let content = match fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(StoreError::NotFound(name.to_string()));
      }
      Err(e) => return Err(e.into()),
    };
    let record: StoredPipeline = serde_json::from_str(&content)?;
    Ok(record)
  }

  async fn list(&self) -> Result<Vec<String>, StoreError> {
    let mut entries = match fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      // A store that was never saved to lists as empty.
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        names.push(stem.to_string());
      }
    }
    names.sort_unstable();
    Ok(names)
  }

  async fn delete(&self, name: &str) -> Result<(), StoreError> {
    let path = self.file_path(name)?;
    match fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        Err(StoreError::NotFound(name.to_string()))
      }
      Err(e) => Err(e.into()),
    }
  }
}
