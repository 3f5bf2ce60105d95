//! Topological ordering of pipeline nodes.

use std::collections::BTreeMap;

use crate::error::CycleError;
use crate::node::NodeId;
use crate::pipeline::Pipeline;

/// Visit state for the depth-first traversal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
  Unvisited,
  InProgress,
  Done,
}

/// Produces an ordering of all node ids such that for every edge `u -> v`,
/// `u` appears strictly before `v`.
///
/// Depth-first with three-state marking: each node's predecessors are visited
/// and appended before the node itself. Meeting an in-progress node again is
/// a cycle, reported as an error rather than a partial order. `connect`
/// never admits a cycle, but a pipeline can also be rebuilt wholesale from a
/// snapshot, so the check stays.
///
/// Nodes with no precedence relation are ordered by ascending id (the
/// pipeline's iteration order), so the result is deterministic.
pub fn execution_order(pipeline: &Pipeline) -> Result<Vec<NodeId>, CycleError> {
  let mut incoming: BTreeMap<NodeId, Vec<NodeId>> =
    pipeline.nodes().map(|n| (n.id, Vec::new())).collect();
  // Edges iterate in (from, to) order, so each predecessor list ends up in
  // ascending id order.
  for edge in pipeline.edges() {
    if let Some(preds) = incoming.get_mut(&edge.to) {
      preds.push(edge.from);
    }
  }

  let mut marks: BTreeMap<NodeId, Mark> =
    incoming.keys().map(|&id| (id, Mark::Unvisited)).collect();
  let mut order = Vec::with_capacity(pipeline.node_count());

  fn visit(
    node: NodeId,
    incoming: &BTreeMap<NodeId, Vec<NodeId>>,
    marks: &mut BTreeMap<NodeId, Mark>,
    order: &mut Vec<NodeId>,
  ) -> Result<(), CycleError> {
    match marks[&node] {
      Mark::Done => return Ok(()),
      Mark::InProgress => return Err(CycleError(node)),
      Mark::Unvisited => {}
    }
    marks.insert(node, Mark::InProgress);
    for &pred in &incoming[&node] {
      visit(pred, incoming, marks, order)?;
    }
    marks.insert(node, Mark::Done);
    order.push(node);
    Ok(())
  }

  for &id in incoming.keys() {
    visit(id, &incoming, &mut marks, &mut order)?;
  }

  Ok(order)
}
