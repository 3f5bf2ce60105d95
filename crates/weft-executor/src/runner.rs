//! Sequential pipeline runner.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use weft_graph::{NodeStatus, Pipeline, execution_order};

use crate::outcome::RunOutcome;
use crate::resolver::TransformResolver;

/// Drives a pipeline end-to-end, one node at a time.
pub struct Runner<R: TransformResolver> {
  resolver: R,
}

impl<R: TransformResolver> Runner<R> {
  pub fn new(resolver: R) -> Self {
    Self { resolver }
  }

  pub fn resolver(&self) -> &R {
    &self.resolver
  }

  /// Runs the pipeline with `initial` as the first node's input.
  ///
  /// The topological order is taken once at the start; the pipeline must not
  /// be structurally mutated for the duration of the run. Each node is set
  /// `Running`, its transform is awaited, and on success its output becomes
  /// both the node's `last_output` and the input threaded to the next node.
  /// The first failure marks its node `Error` and halts the run; remaining
  /// nodes keep their previous status.
  ///
  /// Merge policy: a node with several incoming edges still receives exactly
  /// one value - whatever the node immediately before it in the topological
  /// order produced. Outputs of multiple parents are never combined.
  ///
  /// Cancellation is honored before every invocation and while one is in
  /// flight; a node interrupted mid-invocation is left `Running` and the run
  /// reports [`RunOutcome::Cancelled`].
  #[instrument(name = "pipeline_run", skip_all, fields(run_id = %uuid::Uuid::new_v4()))]
  pub async fn run(
    &self,
    pipeline: &mut Pipeline,
    initial: Value,
    cancel: CancellationToken,
  ) -> RunOutcome {
    let order = match execution_order(pipeline) {
      Ok(order) => order,
      Err(cycle) => {
        error!(error = %cycle, "run_aborted");
        return RunOutcome::CycleDetected;
      }
    };
    if order.is_empty() {
      warn!("run_skipped_empty");
      return RunOutcome::NoNodes;
    }

    info!(nodes = order.len(), "run_started");

    let mut current = initial;
    let mut last_good: Option<Value> = None;

    for id in order {
      if cancel.is_cancelled() {
        warn!(node_id = %id, "run_cancelled");
        return RunOutcome::Cancelled;
      }

      let (tool_id, config) = {
        let node = pipeline.node_mut(id).expect("node from execution order");
        node.status = NodeStatus::Running;
        (node.tool_id.clone(), node.config.clone())
      };
      info!(node_id = %id, tool_id = %tool_id, "node_started");

      let result = tokio::select! {
        result = self.resolver.execute(&tool_id, &config, current.clone()) => result,
        _ = cancel.cancelled() => {
          // The node stays `Running`; the run must not be reported a success.
          warn!(node_id = %id, "run_cancelled");
          return RunOutcome::Cancelled;
        }
      };

      let node = pipeline.node_mut(id).expect("node from execution order");
      match result {
        Ok(output) => {
          node.status = NodeStatus::Success;
          node.last_output = Some(output.clone());
          info!(node_id = %id, "node_completed");
          last_good = Some(output.clone());
          current = output;
        }
        Err(err) => {
          node.status = NodeStatus::Error;
          error!(node_id = %id, error = %err, "node_failed");
          return RunOutcome::Failed {
            failing_node: id,
            last_good_output: last_good,
            error: err,
          };
        }
      }
    }

    info!("run_completed");
    RunOutcome::Success { output: current }
  }
}

/// Returns every node to `Idle` and clears recorded outputs, for a fresh run.
pub fn reset_statuses(pipeline: &mut Pipeline) {
  for node in pipeline.nodes_mut() {
    node.status = NodeStatus::Idle;
    node.last_output = None;
  }
}
