use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weft_graph::PipelineSnapshot;

/// A named pipeline as persisted by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPipeline {
  pub name: String,
  pub saved_at: DateTime<Utc>,
  pub snapshot: PipelineSnapshot,
}
