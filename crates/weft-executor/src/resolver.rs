use async_trait::async_trait;
use serde_json::{Map, Value};

/// Opaque failure payload produced by a transform.
///
/// The engine never inspects it beyond formatting; it is carried back to the
/// caller inside [`RunOutcome::Failed`](crate::RunOutcome::Failed).
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Resolves a node's `tool_id` to a transform implementation and applies it.
///
/// Injected into the [`Runner`](crate::Runner) as an explicit capability so
/// hosts (and tests) decide what a `tool_id` means.
#[async_trait]
pub trait TransformResolver: Send + Sync {
  /// Apply the transform identified by `tool_id` to `input`.
  ///
  /// Any error is treated as a failure of the node being executed.
  async fn execute(
    &self,
    tool_id: &str,
    config: &Map<String, Value>,
    input: Value,
  ) -> Result<Value, TransformError>;
}
