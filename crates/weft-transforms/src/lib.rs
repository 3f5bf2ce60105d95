//! Weft Transforms
//!
//! Built-in transform catalog for Weft pipelines, plus the
//! [`TransformRegistry`] that maps a node's `tool_id` to an implementation.
//! The registry implements the executor's `TransformResolver` seam, so a
//! registry instance is everything a host needs to run the built-ins.
//!
//! All built-ins operate on JSON values; most expect a string input and take
//! their settings from the node's config map.

mod builtin;
mod registry;

pub use builtin::{
  Append, ApplyError, Lowercase, Pick, Replace, Template, Trim, Uppercase,
};
pub use registry::{RegistryError, Transform, TransformRegistry};
