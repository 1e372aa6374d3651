use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use impactgraph_core::orchestrator::load_config;
use impactgraph_core::Orchestrator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// impactgraph - answer "what happens if I change this function?" for a repository
#[derive(Parser)]
#[command(name = "impactgraph")]
#[command(author)]
#[command(version)]
#[command(about = "Build a whole-repository symbol dependency graph and query it", long_about = None)]
struct Cli {
    /// Repository root to analyze
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the graph and print summary statistics
    Build {
        /// Write the full JSON graph dump to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print every usage site of a function
    Usages { name: String },
    /// Print a module-weighted risk assessment for changing a function
    Impact {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Print the fixed failure-mode table for a function change
    FailureModes {
        name: String,
        #[arg(long, default_value = "general")]
        change_type: String,
    },
    /// Print usages, impact, and failure modes together
    Analyze {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Emit the graph as Graphviz DOT
    Dot {
        #[arg(long, default_value_t = 100)]
        max_nodes: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if !cli.repo.is_dir() {
        anyhow::bail!("repository path does not exist or is not a directory: {}", cli.repo.display());
    }

    let config = load_config(&cli.repo);
    let mut orchestrator = Orchestrator::new(config);

    match cli.command {
        Command::Build { output } => {
            let stats = orchestrator
                .build_graph(&cli.repo, output.as_deref())
                .context("failed to build graph")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Usages { name } => {
            orchestrator.build_graph(&cli.repo, None)?;
            match orchestrator.find_usages(&name)? {
                Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                None => println!("no usages found for \"{}\"", name),
            }
        }
        Command::Impact { name, description } => {
            orchestrator.build_graph(&cli.repo, None)?;
            match orchestrator.assess_change_impact(&name, &description)? {
                Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                None => println!("no usages found for \"{}\"", name),
            }
        }
        Command::FailureModes { name, change_type } => {
            orchestrator.build_graph(&cli.repo, None)?;
            let assessment = orchestrator.failure_modes(&name, &change_type)?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Command::Analyze { name, description } => {
            orchestrator.build_graph(&cli.repo, None)?;
            let combined = orchestrator.get_complete_analysis(&name, &description)?;
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
        Command::Dot { max_nodes } => {
            orchestrator.build_graph(&cli.repo, None)?;
            println!("{}", orchestrator.dot_dump(max_nodes)?);
        }
    }

    Ok(())
}
