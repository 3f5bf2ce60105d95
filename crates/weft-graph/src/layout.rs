//! Layer assignment for canvas placement.

use std::collections::{BTreeMap, VecDeque};

use crate::node::NodeId;
use crate::pipeline::Pipeline;

/// Placement of a node on the layered canvas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSlot {
  pub node: NodeId,
  /// Breadth-first distance from the nearest root.
  pub layer: usize,
  /// Assignment order within the layer.
  pub index: usize,
}

/// Assigns a `(layer, index)` slot to every node, for positioning only.
///
/// Roots (nodes with no incoming edge) start at layer 0 and a breadth-first
/// traversal from all of them places each newly reached node one layer below
/// its parent; a node reachable through several parents keeps the first layer
/// it was discovered at. When no root exists (possible only for a graph that
/// did not come through `connect`) the lowest-id node serves as a synthetic
/// root, and any node the traversal never reaches lands in layer 0 in a
/// final catch-all pass.
///
/// This never fails: a malformed graph still gets a complete placement.
pub fn plan_layout(pipeline: &Pipeline) -> Vec<LayoutSlot> {
  if pipeline.is_empty() {
    return Vec::new();
  }

  let mut incoming: BTreeMap<NodeId, usize> =
    pipeline.nodes().map(|n| (n.id, 0)).collect();
  for edge in pipeline.edges() {
    if let Some(count) = incoming.get_mut(&edge.to) {
      *count += 1;
    }
  }

  let mut roots: Vec<NodeId> = incoming
    .iter()
    .filter(|&(_, &count)| count == 0)
    .map(|(&id, _)| id)
    .collect();
  if roots.is_empty() {
    // Defensive fallback for an imported graph with no entry point.
    roots.push(*incoming.keys().next().expect("pipeline is nonempty"));
  }

  // Placements in assignment order; first discovery wins.
  let mut layer_of: BTreeMap<NodeId, usize> = BTreeMap::new();
  let mut placed: Vec<(NodeId, usize)> = Vec::with_capacity(incoming.len());
  let mut queue: VecDeque<NodeId> = VecDeque::new();

  for &root in &roots {
    layer_of.insert(root, 0);
    placed.push((root, 0));
    queue.push_back(root);
  }

  while let Some(current) = queue.pop_front() {
    let next_layer = layer_of[&current] + 1;
    for succ in pipeline.successors(current) {
      if layer_of.contains_key(&succ) {
        continue;
      }
      layer_of.insert(succ, next_layer);
      placed.push((succ, next_layer));
      queue.push_back(succ);
    }
  }

  // Catch-all: anything the traversal missed goes to layer 0.
  for &id in incoming.keys() {
    if !layer_of.contains_key(&id) {
      layer_of.insert(id, 0);
      placed.push((id, 0));
    }
  }

  let mut per_layer: BTreeMap<usize, usize> = BTreeMap::new();
  placed
    .into_iter()
    .map(|(node, layer)| {
      let index = per_layer.entry(layer).or_insert(0);
      let slot = LayoutSlot { node, layer, index: *index };
      *index += 1;
      slot
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;
  use crate::node::{EdgeId, Position};

  fn pipeline_with(count: usize) -> (Pipeline, Vec<NodeId>) {
    let mut pipeline = Pipeline::new();
    let ids = (0..count)
      .map(|i| pipeline.add_node(format!("tool-{i}"), Position::default()))
      .collect();
    (pipeline, ids)
  }

  fn slot_for(slots: &[LayoutSlot], node: NodeId) -> LayoutSlot {
    *slots.iter().find(|s| s.node == node).unwrap()
  }

  #[test]
  fn empty_pipeline_has_no_slots() {
    assert!(plan_layout(&Pipeline::new()).is_empty());
  }

  #[test]
  fn roots_sit_in_layer_zero() {
    let (mut pipeline, ids) = pipeline_with(4);
    pipeline.connect(ids[0], ids[2]).unwrap();
    pipeline.connect(ids[1], ids[2]).unwrap();
    pipeline.connect(ids[2], ids[3]).unwrap();

    let slots = plan_layout(&pipeline);
    assert_eq!(slot_for(&slots, ids[0]).layer, 0);
    assert_eq!(slot_for(&slots, ids[1]).layer, 0);
    assert_eq!(slot_for(&slots, ids[2]).layer, 1);
    assert_eq!(slot_for(&slots, ids[3]).layer, 2);
  }

  #[test]
  fn indexes_count_up_within_a_layer() {
    let (mut pipeline, ids) = pipeline_with(3);
    pipeline.connect(ids[0], ids[1]).unwrap();
    pipeline.connect(ids[0], ids[2]).unwrap();

    let slots = plan_layout(&pipeline);
    assert_eq!(slot_for(&slots, ids[1]).layer, 1);
    assert_eq!(slot_for(&slots, ids[2]).layer, 1);
    let mut indexes = [slot_for(&slots, ids[1]).index, slot_for(&slots, ids[2]).index];
    indexes.sort_unstable();
    assert_eq!(indexes, [0, 1]);
  }

  #[test]
  fn first_discovery_wins_for_shared_children() {
    // Diamond with a long arm: 0 -> 1 -> 3 and 0 -> 3 directly.
    // 3 is discovered from 0 first, so it keeps layer 1.
    let (mut pipeline, ids) = pipeline_with(4);
    pipeline.connect(ids[0], ids[1]).unwrap();
    pipeline.connect(ids[1], ids[3]).unwrap();
    pipeline.connect(ids[0], ids[3]).unwrap();

    let slots = plan_layout(&pipeline);
    assert_eq!(slot_for(&slots, ids[3]).layer, 1);
  }

  #[test]
  fn isolated_nodes_end_up_in_layer_zero() {
    let (mut pipeline, ids) = pipeline_with(3);
    pipeline.connect(ids[0], ids[1]).unwrap();

    let slots = plan_layout(&pipeline);
    assert_eq!(slots.len(), 3);
    assert_eq!(slot_for(&slots, ids[2]).layer, 0);
  }

  #[test]
  fn rootless_graph_still_gets_a_complete_placement() {
    // A hand-built two-node cycle has no root; the planner must still place
    // every node.
    let (template, ids) = pipeline_with(2);
    let pipeline = Pipeline {
      nodes: template.nodes.clone(),
      edges: BTreeSet::from([
        EdgeId { from: ids[0], to: ids[1] },
        EdgeId { from: ids[1], to: ids[0] },
      ]),
      next_id: template.next_id,
    };

    let slots = plan_layout(&pipeline);
    assert_eq!(slots.len(), 2);
    assert_eq!(slot_for(&slots, ids[0]).layer, 0);
    assert_eq!(slot_for(&slots, ids[1]).layer, 1);
  }
}
