//! Weft Graph
//!
//! This crate provides the pipeline graph model for Weft: the node and edge
//! collections, the mutation rules that keep them a valid DAG, and the two
//! derived views other layers pull on demand.
//!
//! Structural guarantees, enforced at mutation time:
//! - the graph is acyclic,
//! - no edge connects a node to itself,
//! - every edge endpoint refers to a present node.
//!
//! On top of the store live two pure functions:
//! - [`execution_order`] - a topological ordering of all nodes, or a typed
//!   cycle report,
//! - [`plan_layout`] - a layer/index placement for rendering, which never
//!   fails even over an oddly shaped graph.
//!
//! Pipelines can be exported to and rebuilt from a [`PipelineSnapshot`];
//! import re-validates every invariant before producing a live [`Pipeline`].

mod error;
mod layout;
mod node;
mod pipeline;
mod snapshot;
mod sort;

pub use error::{ConnectError, CycleError, SnapshotError};
pub use layout::{LayoutSlot, plan_layout};
pub use node::{EdgeId, Node, NodeId, NodeStatus, Position};
pub use pipeline::Pipeline;
pub use snapshot::{EdgeSnapshot, NodeSnapshot, PipelineSnapshot};
pub use sort::execution_order;
