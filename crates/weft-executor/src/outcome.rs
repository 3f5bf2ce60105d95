use serde_json::Value;

use weft_graph::NodeId;

use crate::resolver::TransformError;

/// Terminal result of a pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
  /// Every node executed; `output` is the value produced by the last node in
  /// the order.
  Success { output: Value },

  /// A transform failed. `failing_node` is marked `Error`, nodes after it in
  /// the order were never invoked, and `last_good_output` is the most recent
  /// value any node successfully produced (absent when the first node
  /// failed).
  Failed {
    failing_node: NodeId,
    last_good_output: Option<Value>,
    error: TransformError,
  },

  /// The caller cancelled the run; no further transform was invoked.
  Cancelled,

  /// The graph contained a cycle; no node was executed.
  CycleDetected,

  /// The pipeline has no nodes; nothing was invoked.
  NoNodes,
}

impl RunOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, RunOutcome::Success { .. })
  }
}
