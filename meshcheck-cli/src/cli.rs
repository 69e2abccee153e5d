//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// meshcheck -- service mesh integration scenario runner.
///
/// Use `meshcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "meshcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the meshcheck.toml configuration file.
    #[arg(short, long, global = true, default_value = "meshcheck.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run feature documents against the cluster.
    Run(RunArgs),

    /// Resolve every step of the feature documents without running them.
    Check(CheckArgs),

    /// List the registered step vocabulary.
    Steps,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run pre-parsed feature documents (JSON).
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Feature document files. Each file is one module scope.
    #[arg(required = true)]
    pub features: Vec<PathBuf>,

    /// Control plane model name (default: generated `istio-system-<id>`).
    #[arg(long)]
    pub istio_model: Option<String>,

    /// Sample application model name (default: generated `bookinfo-<id>`).
    #[arg(long)]
    pub model: Option<String>,

    /// Skip step resolution before running.
    #[arg(long)]
    pub no_check: bool,
}

// ---- check ----

/// Resolve feature steps against the registry.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Feature document files.
    #[arg(required = true)]
    pub features: Vec<PathBuf>,
}

// ---- config ----

/// Manage meshcheck configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, terraform, deploy, convergence, probe, cluster).
        #[arg(long)]
        section: Option<String>,
    },
}
