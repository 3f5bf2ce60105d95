use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use weft_executor::{TransformError, TransformResolver};

use crate::builtin;

/// A named transform applicable to a JSON value.
#[async_trait]
pub trait Transform: Send + Sync {
  /// Identifier nodes use to reference this transform.
  fn id(&self) -> &'static str;

  /// Apply the transform to `input`, reading settings from `config`.
  async fn apply(
    &self,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError>;
}

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("unknown tool: {0}")]
  UnknownTool(String),
}

/// Maps `tool_id`s to transform implementations.
///
/// Implements `TransformResolver`, so a registry can be handed directly to
/// the runner. An unknown `tool_id` surfaces as a failure of the node that
/// referenced it.
#[derive(Default)]
pub struct TransformRegistry {
  transforms: HashMap<&'static str, Arc<dyn Transform>>,
}

impl TransformRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a registry preloaded with every built-in transform.
  pub fn builtin() -> Self {
    let mut registry = Self::new();
    registry.register(Arc::new(builtin::Uppercase));
    registry.register(Arc::new(builtin::Lowercase));
    registry.register(Arc::new(builtin::Trim));
    registry.register(Arc::new(builtin::Append));
    registry.register(Arc::new(builtin::Replace));
    registry.register(Arc::new(builtin::Pick));
    registry.register(Arc::new(builtin::Template));
    registry
  }

  /// Registers a transform under its own id, replacing any previous entry.
  pub fn register(&mut self, transform: Arc<dyn Transform>) {
    self.transforms.insert(transform.id(), transform);
  }

  pub fn get(&self, tool_id: &str) -> Option<Arc<dyn Transform>> {
    self.transforms.get(tool_id).cloned()
  }

  /// Registered tool ids, sorted.
  pub fn ids(&self) -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = self.transforms.keys().copied().collect();
    ids.sort_unstable();
    ids
  }
}

#[async_trait]
impl TransformResolver for TransformRegistry {
  async fn execute(
    &self,
    tool_id: &str,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError> {
    let transform = self
      .get(tool_id)
      .ok_or_else(|| RegistryError::UnknownTool(tool_id.to_string()))?;
    transform.apply(config, input).await
  }
}
