//! Weft Executor
//!
//! This crate runs a pipeline end-to-end: it snapshots the topological order,
//! threads one JSON value from node to node, and drives each node's
//! `idle -> running -> success | error` state machine.
//!
//! Execution is strictly sequential - one node at a time, in topological
//! order, with the transform invocation as the only suspension point. The
//! transform implementation behind a node's `tool_id` is reached through the
//! injected [`TransformResolver`] capability; there is no global registry.
//!
//! A run halts on the first failing node, can be cancelled between (or
//! during) invocations via a `CancellationToken`, and always reports a typed
//! [`RunOutcome`].

mod outcome;
mod resolver;
mod runner;

pub use outcome::RunOutcome;
pub use resolver::{TransformError, TransformResolver};
pub use runner::{Runner, reset_statuses};
