use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde_json::{Map, Value};

use crate::error::ConnectError;
use crate::node::{EdgeId, Node, NodeId, NodeStatus, Position};

/// The graph store: owns the node and edge collections and guarantees on
/// every mutation that the graph stays an acyclic, self-loop-free DAG whose
/// edges only reference present nodes.
///
/// Ordered maps keep iteration in ascending-id order, which fixes the
/// traversal order the sorter and the layout planner break ties with.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
  pub(crate) nodes: BTreeMap<NodeId, Node>,
  pub(crate) edges: BTreeSet<EdgeId>,
  pub(crate) next_id: u64,
}

impl Pipeline {
  /// Creates an empty pipeline.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a node referencing the given transform. Always succeeds.
  ///
  /// The node starts idle with an empty config and no recorded output.
  pub fn add_node(&mut self, tool_id: impl Into<String>, position: Position) -> NodeId {
    let id = NodeId(self.next_id);
    self.next_id += 1;
    self.nodes.insert(
      id,
      Node {
        id,
        tool_id: tool_id.into(),
        position,
        config: Map::new(),
        status: NodeStatus::Idle,
        last_output: None,
      },
    );
    id
  }

  /// Removes a node and every edge incident to it.
  ///
  /// A no-op when the node is absent.
  pub fn remove_node(&mut self, id: NodeId) {
    if self.nodes.remove(&id).is_none() {
      return;
    }
    self.edges.retain(|e| e.from != id && e.to != id);
  }

  /// Connects the output of `from` to the input of `to`.
  ///
  /// Rejected, in this order, when the edge would be a self-loop, when an
  /// endpoint is unknown, when the same ordered pair is already connected,
  /// or when a path from `to` back to `from` already exists (the edge would
  /// close a cycle). A rejection leaves the pipeline unchanged.
  pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, ConnectError> {
    if from == to {
      return Err(ConnectError::SelfLoop(from));
    }
    for endpoint in [from, to] {
      if !self.nodes.contains_key(&endpoint) {
        return Err(ConnectError::UnknownNode(endpoint));
      }
    }
    let edge = EdgeId { from, to };
    if self.edges.contains(&edge) {
      return Err(ConnectError::DuplicateEdge(edge));
    }
    if self.has_path(to, from) {
      return Err(ConnectError::CycleDetected { from, to });
    }
    self.edges.insert(edge);
    Ok(edge)
  }

  /// Removes an edge. Returns whether it was present.
  pub fn disconnect(&mut self, edge: EdgeId) -> bool {
    self.edges.remove(&edge)
  }

  /// Replaces a node's transform settings. Returns whether the node exists.
  pub fn set_config(&mut self, id: NodeId, config: Map<String, Value>) -> bool {
    match self.nodes.get_mut(&id) {
      Some(node) => {
        node.config = config;
        true
      }
      None => false,
    }
  }

  pub fn node(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(&id)
  }

  /// Mutable node access, intended for the execution layer's status and
  /// output bookkeeping.
  pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
    self.nodes.get_mut(&id)
  }

  /// Nodes in ascending id order.
  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    self.nodes.values()
  }

  /// Mutable iteration over all nodes, in ascending id order.
  pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
    self.nodes.values_mut()
  }

  /// Edges in ascending `(from, to)` order.
  pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
    self.edges.iter().copied()
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Nodes directly fed by `id`, in ascending id order.
  pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    self.edges.iter().filter(move |e| e.from == id).map(|e| e.to)
  }

  /// Nodes directly feeding `id`, in ascending id order.
  pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    self.edges.iter().filter(move |e| e.to == id).map(|e| e.from)
  }

  /// Breadth-first reachability along outgoing edges.
  fn has_path(&self, start: NodeId, target: NodeId) -> bool {
    let mut queue = VecDeque::from([start]);
    let mut seen = BTreeSet::from([start]);
    while let Some(current) = queue.pop_front() {
      if current == target {
        return true;
      }
      for next in self.successors(current) {
        if seen.insert(next) {
          queue.push_back(next);
        }
      }
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pipeline_with(count: usize) -> (Pipeline, Vec<NodeId>) {
    let mut pipeline = Pipeline::new();
    let ids = (0..count)
      .map(|i| pipeline.add_node(format!("tool-{i}"), Position::default()))
      .collect();
    (pipeline, ids)
  }

  #[test]
  fn add_node_assigns_increasing_ids() {
    let (mut pipeline, ids) = pipeline_with(3);
    assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);

    // Ids are never reused, even after removal.
    pipeline.remove_node(NodeId(2));
    let fresh = pipeline.add_node("tool-3", Position::default());
    assert_eq!(fresh, NodeId(3));
  }

  #[test]
  fn new_node_starts_idle_and_unconfigured() {
    let (pipeline, ids) = pipeline_with(1);
    let node = pipeline.node(ids[0]).unwrap();
    assert_eq!(node.status, NodeStatus::Idle);
    assert!(node.config.is_empty());
    assert!(node.last_output.is_none());
  }

  #[test]
  fn connect_then_read_back() {
    let (mut pipeline, ids) = pipeline_with(2);
    let edge = pipeline.connect(ids[0], ids[1]).unwrap();
    assert_eq!(edge, EdgeId { from: ids[0], to: ids[1] });
    assert_eq!(pipeline.edges().collect::<Vec<_>>(), vec![edge]);
    assert_eq!(pipeline.successors(ids[0]).collect::<Vec<_>>(), vec![ids[1]]);
    assert_eq!(pipeline.predecessors(ids[1]).collect::<Vec<_>>(), vec![ids[0]]);
  }

  #[test]
  fn connect_rejects_self_loop() {
    let (mut pipeline, ids) = pipeline_with(1);
    assert_eq!(
      pipeline.connect(ids[0], ids[0]),
      Err(ConnectError::SelfLoop(ids[0]))
    );
  }

  #[test]
  fn connect_rejects_unknown_node() {
    let (mut pipeline, ids) = pipeline_with(1);
    assert_eq!(
      pipeline.connect(ids[0], NodeId(99)),
      Err(ConnectError::UnknownNode(NodeId(99)))
    );
  }

  #[test]
  fn connect_rejects_duplicate_and_keeps_one_edge() {
    let (mut pipeline, ids) = pipeline_with(2);
    let edge = pipeline.connect(ids[0], ids[1]).unwrap();
    assert_eq!(
      pipeline.connect(ids[0], ids[1]),
      Err(ConnectError::DuplicateEdge(edge))
    );
    assert_eq!(pipeline.edges().count(), 1);
  }

  #[test]
  fn connect_rejects_direct_and_transitive_cycles() {
    let (mut pipeline, ids) = pipeline_with(3);
    pipeline.connect(ids[0], ids[1]).unwrap();
    pipeline.connect(ids[1], ids[2]).unwrap();

    assert_eq!(
      pipeline.connect(ids[1], ids[0]),
      Err(ConnectError::CycleDetected { from: ids[1], to: ids[0] })
    );
    assert_eq!(
      pipeline.connect(ids[2], ids[0]),
      Err(ConnectError::CycleDetected { from: ids[2], to: ids[0] })
    );
    // The rejections left the structure untouched.
    assert_eq!(pipeline.edges().count(), 2);
  }

  #[test]
  fn reverse_edge_between_unrelated_branches_is_fine() {
    // 0 -> 1 and 0 -> 2; connecting 2 -> 1 closes no cycle.
    let (mut pipeline, ids) = pipeline_with(3);
    pipeline.connect(ids[0], ids[1]).unwrap();
    pipeline.connect(ids[0], ids[2]).unwrap();
    assert!(pipeline.connect(ids[2], ids[1]).is_ok());
  }

  #[test]
  fn remove_node_cascades_to_incident_edges() {
    let (mut pipeline, ids) = pipeline_with(3);
    pipeline.connect(ids[0], ids[1]).unwrap();
    pipeline.connect(ids[1], ids[2]).unwrap();

    pipeline.remove_node(ids[1]);

    assert!(pipeline.node(ids[1]).is_none());
    assert!(
      pipeline
        .edges()
        .all(|e| e.from != ids[1] && e.to != ids[1])
    );
    assert_eq!(pipeline.edges().count(), 0);
  }

  #[test]
  fn remove_node_is_idempotent() {
    let (mut pipeline, ids) = pipeline_with(1);
    pipeline.remove_node(ids[0]);
    pipeline.remove_node(ids[0]);
    assert!(pipeline.is_empty());
  }

  #[test]
  fn disconnect_removes_only_that_edge() {
    let (mut pipeline, ids) = pipeline_with(3);
    let first = pipeline.connect(ids[0], ids[1]).unwrap();
    let second = pipeline.connect(ids[1], ids[2]).unwrap();

    assert!(pipeline.disconnect(first));
    assert!(!pipeline.disconnect(first));
    assert_eq!(pipeline.edges().collect::<Vec<_>>(), vec![second]);
  }

  #[test]
  fn arbitrary_connect_sequences_never_leave_a_cycle() {
    use crate::sort::execution_order;

    let (mut pipeline, ids) = pipeline_with(8);
    // Deterministic pseudo-random pairs; rejections are fine, cycles are not.
    let mut state = 0x2545_f491_u64;
    for _ in 0..200 {
      state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
      let from = ids[(state >> 33) as usize % ids.len()];
      let to = ids[(state >> 17) as usize % ids.len()];
      let _ = pipeline.connect(from, to);
      assert!(execution_order(&pipeline).is_ok());
    }
  }

  #[test]
  fn set_config_replaces_settings() {
    let (mut pipeline, ids) = pipeline_with(1);
    let mut config = Map::new();
    config.insert("suffix".to_string(), Value::String("!".to_string()));

    assert!(pipeline.set_config(ids[0], config.clone()));
    assert_eq!(pipeline.node(ids[0]).unwrap().config, config);
    assert!(!pipeline.set_config(NodeId(42), Map::new()));
  }
}
