use thiserror::Error;

use crate::node::{EdgeId, NodeId};

/// Rejection reasons for [`Pipeline::connect`](crate::Pipeline::connect).
///
/// A rejected connect leaves the pipeline unchanged; the caller may retry
/// with a different edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
  #[error("cannot connect node {0} to itself")]
  SelfLoop(NodeId),

  #[error("edge {0} already exists")]
  DuplicateEdge(EdgeId),

  #[error("connecting {from} -> {to} would create a cycle")]
  CycleDetected { from: NodeId, to: NodeId },

  #[error("unknown node: {0}")]
  UnknownNode(NodeId),
}

/// A cycle found by [`execution_order`](crate::execution_order).
///
/// Unreachable through [`Pipeline::connect`](crate::Pipeline::connect), which
/// refuses cycle-introducing edges, but checked defensively because a graph
/// can also be built wholesale from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pipeline contains a cycle through node {0}")]
pub struct CycleError(pub NodeId);

/// Reasons a snapshot is refused by
/// [`Pipeline::from_snapshot`](crate::Pipeline::from_snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
  #[error("duplicate node id in snapshot: {0}")]
  DuplicateNode(NodeId),

  #[error("edge {edge} references unknown node {node}")]
  DanglingEdge { edge: EdgeId, node: NodeId },

  #[error("snapshot contains a self-loop on node {0}")]
  SelfLoop(NodeId),

  #[error("snapshot contains a cycle through node {0}")]
  Cycle(NodeId),
}
