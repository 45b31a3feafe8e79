//! CLI argument definitions for the BIDS curator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bids-curator",
    version,
    about = "Organize NIfTI acquisition trees into a canonical BIDS layout and reconcile study metadata",
    long_about = "Organize converted NIfTI acquisitions into the canonical per-subject\n\
                  BIDS layout, quarantine suspect diffusion outputs, then expand the\n\
                  metadata skeleton, bind each expected scan to a file on disk, and\n\
                  merge sidecar fields into the tabular dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Run configuration file (default: curate.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify raw acquisitions into the canonical per-subject tree.
    Organize(OrganizeArgs),

    /// Expand the metadata skeleton and bind each scan row to a file.
    Enrich(EnrichArgs),

    /// Run the full curation pipeline: organize, then enrich.
    Run(RunArgs),

    /// List the fixed scan taxonomy.
    Taxonomy,
}

#[derive(Parser, Default)]
pub struct OrganizeArgs {
    /// Acquisition tree to organize (overrides the config file).
    #[arg(value_name = "BIDS_DIR")]
    pub bids_dir: Option<PathBuf>,

    /// Skip the converter gate and conversion pass.
    #[arg(long = "skip-convert")]
    pub skip_convert: bool,

    /// Skip the NIfTI compression pass.
    #[arg(long = "no-compress")]
    pub no_compress: bool,
}

#[derive(Parser, Default)]
pub struct EnrichArgs {
    /// Metadata skeleton CSV (overrides the config file).
    #[arg(long = "skeleton", value_name = "CSV")]
    pub skeleton: Option<PathBuf>,

    /// Organized acquisition tree to match against.
    #[arg(long = "bids-dir", value_name = "DIR")]
    pub bids_dir: Option<PathBuf>,

    /// Destination tree for mirrored files (default: the source tree,
    /// leaving bound files in place).
    #[arg(long = "mirror-dir", value_name = "DIR")]
    pub mirror_dir: Option<PathBuf>,

    /// Sidecar key-map CSV with `json_name` and `csv_name` columns.
    #[arg(long = "key-map", value_name = "CSV")]
    pub key_map: Option<PathBuf>,
}

#[derive(Parser, Default)]
pub struct RunArgs {
    /// Acquisition tree to organize and match against.
    #[arg(value_name = "BIDS_DIR")]
    pub bids_dir: Option<PathBuf>,

    /// Metadata skeleton CSV (overrides the config file).
    #[arg(long = "skeleton", value_name = "CSV")]
    pub skeleton: Option<PathBuf>,

    /// Destination tree for mirrored files.
    #[arg(long = "mirror-dir", value_name = "DIR")]
    pub mirror_dir: Option<PathBuf>,

    /// Sidecar key-map CSV with `json_name` and `csv_name` columns.
    #[arg(long = "key-map", value_name = "CSV")]
    pub key_map: Option<PathBuf>,

    /// Skip the converter gate and conversion pass.
    #[arg(long = "skip-convert")]
    pub skip_convert: bool,

    /// Skip the NIfTI compression pass.
    #[arg(long = "no-compress")]
    pub no_compress: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
