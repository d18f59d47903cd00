//! homography CLI: cluster agent correspondence reports.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use homography_engine::config::EngineConfig;
use homography_engine::engine::Engine;
use homography_engine::ingest::{load_agent_results, load_proof};
use homography_engine::similarity::structural_similarity;

#[derive(Parser)]
#[command(
    name = "homography",
    version,
    about = "Homography matching and clustering engine"
)]
struct Cli {
    /// Engine config (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match, cluster and classify a batch of agent results.
    Analyze {
        /// JSON array of agent results.
        #[arg(long)]
        input: PathBuf,

        /// Minimum similarity for a match to become a cluster edge.
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Minimum number of agents per cluster.
        #[arg(long)]
        min_cluster_size: Option<usize>,

        /// Also report clusters merged by shared membership.
        #[arg(long)]
        merge: bool,

        /// Extra clustering thresholds, reconciled into one partition
        /// (comma-separated, e.g. "0.6,0.8").
        #[arg(long, value_delimiter = ',')]
        passes: Vec<f64>,
    },

    /// Verify a single proof read from a JSON file.
    Verify {
        /// JSON object with `conditional` (or `if_then_logic`) and `examples`.
        #[arg(long)]
        proof: PathBuf,
    },

    /// Print the structural similarity of two descriptions.
    Similarity { a: String, b: String },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            input,
            min_similarity,
            min_cluster_size,
            merge,
            passes,
        } => {
            if let Some(v) = min_similarity {
                config.clustering.min_similarity = v;
            }
            if let Some(v) = min_cluster_size {
                config.clustering.min_cluster_size = v;
            }
            config.clustering.merge |= merge;

            let engine = Engine::new(config)?;
            let ingested = load_agent_results(&input)?;
            let mut report = engine.analyze_ingested(&ingested);

            if !passes.is_empty() {
                let mut thresholds = vec![engine.config().clustering.min_similarity];
                thresholds.extend(passes);
                report.merged = Some(engine.cluster_passes(&report.matches, &thresholds)?);
            }

            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }

        Commands::Verify { proof } => {
            let engine = Engine::new(config)?;
            let proof = load_proof(&proof)?;
            let result = engine.verify_proof(&proof);
            println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
        }

        Commands::Similarity { a, b } => {
            println!("{:.4}", structural_similarity(&a, &b));
        }
    }

    Ok(())
}
