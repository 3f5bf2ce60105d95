use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a node within a pipeline.
///
/// Assigned by [`Pipeline::add_node`](crate::Pipeline::add_node) from a
/// monotonically increasing counter; never reused within a session, including
/// after node removal or snapshot import.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Identifier of an edge, derived from its ordered endpoint pair.
///
/// Because the id *is* the `(from, to)` pair, two distinct edges between the
/// same ordered pair cannot exist.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EdgeId {
  /// Node whose output feeds the edge.
  pub from: NodeId,
  /// Node whose input the edge feeds.
  pub to: NodeId,
}

impl std::fmt::Display for EdgeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}->{}", self.from, self.to)
  }
}

/// Canvas position of a node. Consumed only by layout and rendering;
/// irrelevant to execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Execution state of a node. Mutated only by the execution layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
  #[default]
  Idle,
  Running,
  Success,
  Error,
}

/// A single transform step in a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: NodeId,
  /// Reference to an external transform implementation, resolved by the
  /// execution layer's resolver.
  pub tool_id: String,
  pub position: Position,
  /// Opaque settings passed to the transform at execution time.
  #[serde(default)]
  pub config: Map<String, Value>,
  pub status: NodeStatus,
  /// Most recent successfully produced value, if the node has ever run.
  pub last_output: Option<Value>,
}
