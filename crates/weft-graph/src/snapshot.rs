//! Serialized pipeline form for persistence and exchange.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;
use crate::node::{EdgeId, Node, NodeId, NodeStatus, Position};
use crate::pipeline::Pipeline;
use crate::sort::execution_order;

/// The serialized `(nodes, edges)` pair a pipeline is saved as.
///
/// Execution state (status, last output) is deliberately not part of the
/// snapshot; an imported pipeline starts idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
  pub nodes: Vec<NodeSnapshot>,
  pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
  pub id: NodeId,
  pub tool_id: String,
  #[serde(default)]
  pub position: Position,
  #[serde(default)]
  pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
  pub from: NodeId,
  pub to: NodeId,
}

impl Pipeline {
  /// Exports the current structure. Statuses and outputs are not captured.
  pub fn snapshot(&self) -> PipelineSnapshot {
    PipelineSnapshot {
      nodes: self
        .nodes()
        .map(|n| NodeSnapshot {
          id: n.id,
          tool_id: n.tool_id.clone(),
          position: n.position,
          config: n.config.clone(),
        })
        .collect(),
      edges: self
        .edges()
        .map(|e| EdgeSnapshot { from: e.from, to: e.to })
        .collect(),
    }
  }

  /// Rebuilds a pipeline from a snapshot, re-validating every structural
  /// invariant: unique node ids, edge endpoints that exist, no self-loops,
  /// no cycles. Duplicate edges collapse into one (the edge id is the
  /// ordered pair).
  ///
  /// The id counter resumes above the highest imported id, so ids handed out
  /// afterwards never collide with imported ones.
  pub fn from_snapshot(snapshot: PipelineSnapshot) -> Result<Pipeline, SnapshotError> {
    let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
    let mut next_id = 0u64;

    for n in snapshot.nodes {
      if nodes.contains_key(&n.id) {
        return Err(SnapshotError::DuplicateNode(n.id));
      }
      next_id = next_id.max(n.id.0.saturating_add(1));
      nodes.insert(
        n.id,
        Node {
          id: n.id,
          tool_id: n.tool_id,
          position: n.position,
          config: n.config,
          status: NodeStatus::Idle,
          last_output: None,
        },
      );
    }

    let mut edges: BTreeSet<EdgeId> = BTreeSet::new();
    for e in snapshot.edges {
      let edge = EdgeId { from: e.from, to: e.to };
      if e.from == e.to {
        return Err(SnapshotError::SelfLoop(e.from));
      }
      for endpoint in [e.from, e.to] {
        if !nodes.contains_key(&endpoint) {
          return Err(SnapshotError::DanglingEdge { edge, node: endpoint });
        }
      }
      edges.insert(edge);
    }

    let pipeline = Pipeline { nodes, edges, next_id };
    if let Err(cycle) = execution_order(&pipeline) {
      return Err(SnapshotError::Cycle(cycle.0));
    }
    Ok(pipeline)
  }
}
