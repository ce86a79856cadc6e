//! bazel-aspect CLI tool.
//!
//! Usage:
//! ```bash
//! bazel-aspect decode [OPTIONS] [PATH]
//! bazel-aspect index [OPTIONS] [PATH]
//! bazel-aspect find-class <CLASS> [PATH]
//! bazel-aspect list-kinds
//! bazel-aspect init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Decode Bazel aspect output and index the classes inside jars
#[derive(Parser)]
#[command(name = "bazel-aspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode aspect data files and print the targets
    Decode {
        /// Directory holding aspect data files (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Index the classes inside jars
    Index {
        /// Directory to scan for jars (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Directory holding aspect data files, used to label local outputs
        #[arg(short, long)]
        aspects: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find the jars containing a class
    FindClass {
        /// Fully qualified class name
        class: String,

        /// Directory to scan for jars (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Directory holding aspect data files, used to label local outputs
        #[arg(short, long)]
        aspects: Option<PathBuf>,
    },

    /// List rule kinds decoded as JVM targets
    ListKinds,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for decoded targets and index entries.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per record, tab separated.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Decode { path, format } => {
            let source = config_resolver::resolve(&path, explicit);
            commands::decode::run(&path, format, &source)
        }
        Commands::Index {
            path,
            aspects,
            format,
        } => {
            let source = config_resolver::resolve(&path, explicit);
            commands::index::run(&path, aspects.as_deref(), format, &source)
        }
        Commands::FindClass {
            class,
            path,
            aspects,
        } => {
            let source = config_resolver::resolve(&path, explicit);
            commands::find_class::run(&class, &path, aspects.as_deref(), &source)
        }
        Commands::ListKinds => {
            let cwd = std::env::current_dir()?;
            let source = config_resolver::resolve(&cwd, explicit);
            commands::list_kinds::run(&source)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
