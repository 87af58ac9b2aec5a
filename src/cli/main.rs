//! tabular-schema: documentation generator for tabular schemas

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabular_schema::cli::commands::{graphviz, jekyll, load_config, validate};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabular-schema")]
#[command(version, about = "Generate diagrams and documentation from tabular schemas")]
struct Cli {
    /// Log progress (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an entity relationship diagram using graphviz
    Graphviz {
        /// Schema document (YAML or JSON)
        schema: PathBuf,
        /// Output file; the extension selects the format (.dot, .svg, .png, ...)
        output: PathBuf,
        /// Documentation configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate Jekyll documentation
    Jekyll {
        /// Schema document (YAML or JSON)
        schema: PathBuf,
        /// Site directory
        output: PathBuf,
        /// Also generate an embeddable ERD diagram
        #[arg(long)]
        erd: bool,
        /// Documentation configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Check that every reference in a schema resolves
    Validate {
        /// Schema document (YAML or JSON)
        schema: PathBuf,
        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("tabular_schema={}", level))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Graphviz {
            schema,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            graphviz::handle_graphviz(&schema, &output, config)?;
        }
        Commands::Jekyll {
            schema,
            output,
            erd,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(jekyll::handle_jekyll(&schema, &output, erd, config))?;
        }
        Commands::Validate { schema, strict } => {
            validate::handle_validate(&schema, strict)?;
        }
    }

    Ok(())
}
