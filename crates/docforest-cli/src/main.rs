//! Docforest CLI - classify parse-tree fragments into documentation forests

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docforest_core::doc::{ClassifyStats, DropReason};
use docforest_core::{ClassifyOptions, DocRun, ProjectDoc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;

use config::Config;

#[derive(Parser)]
#[command(name = "docforest")]
#[command(version = docforest_core::VERSION)]
#[command(about = "Classify parse-tree fragments into documentation forests", long_about = None)]
struct Cli {
    /// Log every dropped node to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify source unit files and emit the forest as JSON
    Classify {
        /// Source unit JSON files, classified in this order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to ./docforest.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Omit entries without a comment
        #[arg(long)]
        skip_uncommented: bool,

        /// Classify units on all cores
        #[arg(long)]
        parallel: bool,

        /// Emit compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print entry and drop counts per package
    Stats {
        /// Source unit JSON files, classified in this order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Config file (defaults to ./docforest.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Omit entries without a comment
        #[arg(long)]
        skip_uncommented: bool,
    },
}

/// Effective settings after merging the config file with flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    options: ClassifyOptions,
    parallel: bool,
    pretty: bool,
}

impl Settings {
    fn resolve(config: &Config, skip_uncommented: bool, parallel: bool, compact: bool) -> Self {
        let mut options = config.classify_options();
        options.skip_uncommented |= skip_uncommented;
        Self {
            options,
            parallel: config.classify.parallel || parallel,
            pretty: config.output.pretty && !compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Classify {
            files,
            output,
            config,
            skip_uncommented,
            parallel,
            compact,
        } => {
            let config = load_config(config.as_deref())?;
            let settings = Settings::resolve(&config, skip_uncommented, parallel, compact);
            let (project, _) = classify_files(&files, settings)?;
            write_project(&project, output.as_deref(), settings.pretty)?;
        }

        Commands::Stats {
            files,
            config,
            skip_uncommented,
        } => {
            let config = load_config(config.as_deref())?;
            let settings = Settings::resolve(&config, skip_uncommented, false, false);
            let (project, stats) = classify_files(&files, settings)?;
            print!("{}", format_stats(&project, &stats));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    Config::discover(explicit, &cwd).context("Failed to load configuration")
}

/// Load and classify every unit of the given files in one run
fn classify_files(files: &[PathBuf], settings: Settings) -> Result<(ProjectDoc, ClassifyStats)> {
    let units = input::load_units(files)?;
    let mut run = DocRun::new(settings.options);
    let project = if settings.parallel {
        run.run_parallel(&units)
    } else {
        run.run(&units)
    };
    Ok((project, *run.stats()))
}

fn write_project(project: &ProjectDoc, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(project)?
    } else {
        serde_json::to_string(project)?
    };

    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

fn format_stats(project: &ProjectDoc, stats: &ClassifyStats) -> String {
    let mut out = String::new();
    for package in project.packages() {
        let abstracts: usize = package.abstracts.iter().map(|a| a.abstract_count()).sum();
        let objects: usize = package.abstracts.iter().map(|a| a.object_count()).sum();
        let _ = writeln!(
            out,
            "{}: {} roots, {} abstracts, {} objects",
            package.name,
            package.abstracts.len(),
            abstracts,
            objects
        );
    }

    let _ = writeln!(out, "dropped: {}", stats.total_dropped());
    for reason in [
        DropReason::Reserved,
        DropReason::MissingLine,
        DropReason::Uncommented,
        DropReason::DuplicateRoot,
        DropReason::DuplicateObject,
    ] {
        let count = stats.count(reason);
        if count > 0 {
            let _ = writeln!(out, "  {}: {}", reason, count);
        }
    }
    out
}
