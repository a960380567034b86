// crates/parcli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parcore::{ExecutionEvent, Graph, ParallelGraph, Params, Value};
use parruntime::{AlgorithmOutput, ParallelRuntime, RuntimeConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphpar")]
#[command(about = "Parallel graph algorithm runner", long_about = None)]
struct Cli {
    /// Runtime configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an algorithm on a graph file
    Run {
        /// Registered algorithm name, e.g. `betweenness_centrality`
        algorithm: String,

        /// Path to a node-link graph JSON file
        #[arg(short, long)]
        graph: PathBuf,

        /// Algorithm parameter as `key=value`; values are parsed as JSON
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Upper bound on worker threads, overriding the configured cap
        #[arg(short, long)]
        workers: Option<usize>,

        /// Show verbose output and execution events
        #[arg(short, long)]
        verbose: bool,
    },

    /// List registered algorithms
    Algorithms,

    /// Describe one algorithm
    Info {
        algorithm: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("parameter '{}' is not of the form key=value", raw))?;
    let value = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::parse_literal(value));
    Ok((key.trim().to_string(), value))
}

fn build_runtime(config: RuntimeConfig) -> ParallelRuntime {
    ParallelRuntime::with_registry(Arc::new(paralgos::default_registry()), config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::load(cli.config.as_deref()).context("loading runtime configuration")?;
    tracing::debug!("Runtime configuration: {:?}", config);

    match cli.command {
        Commands::Run {
            algorithm,
            graph,
            params,
            workers,
            verbose,
        } => {
            let params = params
                .iter()
                .map(|raw| parse_param(raw))
                .collect::<Result<Params>>()?;
            run_algorithm(config, algorithm, graph, params, workers, verbose).await?;
        }

        Commands::Algorithms => {
            list_algorithms(config);
        }

        Commands::Info { algorithm } => {
            describe_algorithm(config, &algorithm)?;
        }
    }

    Ok(())
}

async fn run_algorithm(
    config: RuntimeConfig,
    algorithm: String,
    path: PathBuf,
    params: Params,
    workers: Option<usize>,
    verbose: bool,
) -> Result<()> {
    let graph = Graph::load(&path).with_context(|| format!("loading graph {}", path.display()))?;
    eprintln!("Loaded {} from {}", graph, path.display());

    let mut runtime = build_runtime(config);
    if let Some(workers) = workers {
        runtime.set_workers(workers)?;
    }

    let event_task = verbose.then(|| {
        let mut events = runtime.subscribe_events();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    ExecutionEvent::RunStarted {
                        label,
                        units,
                        workers,
                        lazy,
                        ..
                    } => {
                        let mode = if lazy { "lazy" } else { "eager" };
                        eprintln!("> {} started: {} units on {} workers ({})", label, units, workers, mode);
                    }
                    ExecutionEvent::UnitCompleted { index, duration_ms, .. } => {
                        eprintln!("  unit {} completed in {}ms", index, duration_ms);
                    }
                    ExecutionEvent::UnitFailed { index, error, .. } => {
                        eprintln!("  unit {} failed: {}", index, error);
                    }
                    ExecutionEvent::RunCompleted { success, duration_ms, .. } => {
                        let status = if success { "completed" } else { "failed" };
                        eprintln!("< run {} in {}ms", status, duration_ms);
                    }
                }
            }
        })
    });

    let graph = ParallelGraph::new(graph);
    let outcome = tokio::task::spawn_blocking(move || -> Result<()> {
        match runtime.execute(&algorithm, graph, &params)? {
            AlgorithmOutput::Aggregate(value) => {
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            AlgorithmOutput::Stream(items) => {
                // One JSON line per source, printed as soon as it is ready.
                for item in items {
                    let (key, value) = item?;
                    let line = Value::Object(BTreeMap::from([(key, value)]));
                    println!("{}", serde_json::to_string(&line)?);
                }
            }
        }
        Ok(())
    })
    .await?;

    if let Some(task) = event_task {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        task.abort();
    }

    outcome
}

fn list_algorithms(config: RuntimeConfig) {
    let runtime = build_runtime(config);
    let registry = runtime.registry();

    println!("Available algorithms ({} workers):", runtime.engine().workers());
    for name in registry.list_algorithms() {
        match registry.get_metadata(&name) {
            Some(metadata) => println!("  {:<42} {}", name, metadata.description),
            None => println!("  {}", name),
        }
    }
}

fn describe_algorithm(config: RuntimeConfig, name: &str) -> Result<()> {
    let runtime = build_runtime(config);
    let entry = runtime.registry().resolve(name)?;
    let metadata = entry.metadata();

    println!("{}", entry.name());
    println!("  {}", metadata.description);
    println!("  family: {}", metadata.family);
    println!("  mode:   {:?}", metadata.mode);
    if !metadata.parameters.is_empty() {
        println!("  parameters:");
        for param in &metadata.parameters {
            let required = if param.required { " (required)" } else { "" };
            println!("    {:<12} {}{}", param.name, param.description, required);
        }
    }
    Ok(())
}
