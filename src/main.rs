use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use weft_executor::{RunOutcome, Runner};
use weft_graph::{Pipeline, PipelineSnapshot};
use weft_store::{FsPipelineStore, PipelineStore};
use weft_transforms::TransformRegistry;

/// Weft - a pipeline graph engine for chaining data transforms
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.weft)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a pipeline file; the initial payload is read from stdin
  Run {
    /// Path to the pipeline snapshot (JSON)
    pipeline_file: PathBuf,
  },

  /// Validate a pipeline file and save it under a name
  Save {
    /// Path to the pipeline snapshot (JSON)
    pipeline_file: PathBuf,

    /// Name to save the pipeline under
    #[arg(long)]
    name: String,
  },

  /// Print a saved pipeline's snapshot
  Show {
    /// Name of the saved pipeline
    name: String,
  },

  /// List saved pipelines
  List,

  /// Catalog of built-in transforms
  Tools,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".weft")
  });
  let store = FsPipelineStore::new(data_dir.join("pipelines"));

  let rt = tokio::runtime::Runtime::new()?;
  match cli.command {
    Some(Commands::Run { pipeline_file }) => {
      rt.block_on(run_pipeline(pipeline_file))?;
    }
    Some(Commands::Save { pipeline_file, name }) => {
      rt.block_on(save_pipeline(&store, pipeline_file, name))?;
    }
    Some(Commands::Show { name }) => {
      rt.block_on(show_pipeline(&store, name))?;
    }
    Some(Commands::List) => {
      rt.block_on(list_pipelines(&store))?;
    }
    Some(Commands::Tools) => {
      for id in TransformRegistry::builtin().ids() {
        println!("{id}");
      }
    }
    None => {
      println!("weft - use --help to see available commands");
    }
  }

  Ok(())
}

async fn run_pipeline(pipeline_file: PathBuf) -> Result<()> {
  let mut pipeline = read_pipeline(&pipeline_file).await?;
  eprintln!("Loaded pipeline with {} nodes", pipeline.node_count());

  let payload = read_payload_from_stdin()?;

  // Ctrl-C cancels the run between (or during) transform invocations.
  let cancel = CancellationToken::new();
  let trigger = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      trigger.cancel();
    }
  });

  let runner = Runner::new(TransformRegistry::builtin());
  match runner.run(&mut pipeline, payload, cancel).await {
    RunOutcome::Success { output } => {
      println!("{}", serde_json::to_string_pretty(&output)?);
      Ok(())
    }
    RunOutcome::Failed { failing_node, last_good_output, error } => {
      if let Some(value) = last_good_output {
        eprintln!("Last good output: {value}");
      }
      bail!("node {failing_node} failed: {error}");
    }
    RunOutcome::Cancelled => bail!("run cancelled"),
    RunOutcome::CycleDetected => bail!("pipeline contains a cycle"),
    RunOutcome::NoNodes => bail!("pipeline has no nodes"),
  }
}

async fn save_pipeline(
  store: &FsPipelineStore,
  pipeline_file: PathBuf,
  name: String,
) -> Result<()> {
  let pipeline = read_pipeline(&pipeline_file).await?;
  store
    .save(&name, &pipeline.snapshot())
    .await
    .with_context(|| format!("failed to save pipeline '{name}'"))?;
  eprintln!("Saved pipeline '{name}' ({} nodes)", pipeline.node_count());
  Ok(())
}

async fn show_pipeline(store: &FsPipelineStore, name: String) -> Result<()> {
  let stored = store
    .load(&name)
    .await
    .with_context(|| format!("failed to load pipeline '{name}'"))?;
  println!("{}", serde_json::to_string_pretty(&stored.snapshot)?);
  Ok(())
}

async fn list_pipelines(store: &FsPipelineStore) -> Result<()> {
  for name in store.list().await.context("failed to list pipelines")? {
    println!("{name}");
  }
  Ok(())
}

/// Read a snapshot file and rebuild it into a validated pipeline.
async fn read_pipeline(path: &PathBuf) -> Result<Pipeline> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read pipeline file: {}", path.display()))?;
  let snapshot: PipelineSnapshot = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse pipeline file: {}", path.display()))?;
  Pipeline::from_snapshot(snapshot).context("invalid pipeline")
}

/// Read the initial payload from stdin: JSON when it parses, a plain string
/// otherwise, null when stdin is empty.
fn read_payload_from_stdin() -> Result<serde_json::Value> {
  let mut buffer = String::new();
  io::stdin()
    .read_to_string(&mut buffer)
    .context("failed to read payload from stdin")?;

  let trimmed = buffer.trim();
  if trimmed.is_empty() {
    return Ok(serde_json::Value::Null);
  }
  Ok(
    serde_json::from_str(trimmed)
      .unwrap_or_else(|_| serde_json::Value::String(trimmed.to_string())),
  )
}
