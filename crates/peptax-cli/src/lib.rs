//! Peptax CLI Library
//!
//! Maps tryptic peptides to the lowest common ancestor (LCA) of the organisms
//! they occur in, using the Unipept annotation service, and writes one
//! taxonomy table per peptide list.
//!
//! # Overview
//!
//! - **Peptide preparation**: Split rescoring results into peptide lists per q-value threshold (`peptax prepare`)
//! - **Annotation**: Resolve LCAs and full lineages in two lookup rounds (`peptax annotate`)
//! - **Summaries**: Relative genus frequencies per condition (`peptax frequencies`)
//! - **Configuration**: Inspect the effective settings (`peptax config show`)

pub mod api;
pub mod assembler;
pub mod commands;
pub mod config;
pub mod error;
pub mod progress;
pub mod resolver;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Peptax - peptide to taxonomy annotation
#[derive(Parser, Debug)]
#[command(name = "peptax")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long = "config", env = "PEPTAX_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Annotation service base URL
    #[arg(long, env = "PEPTAX_BASE_URL", global = true)]
    pub base_url: Option<String>,
}

impl Cli {
    /// Effective configuration: file and environment, then global flags
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config_file.as_deref())?;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve LCAs and lineages for every peptide list in a directory
    Annotate(AnnotateArgs),

    /// Turn rescoring tables into peptide lists, one per q-value threshold
    Prepare {
        /// Directory with tab-separated rescoring tables (*.txt)
        input_dir: PathBuf,

        /// Where to write peptide lists (defaults to the configured input directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// q-value thresholds, comma separated
        #[arg(short, long, value_delimiter = ',')]
        thresholds: Vec<f64>,
    },

    /// Relative genus frequencies for every taxonomy table in a directory
    Frequencies {
        /// Directory with taxonomy tables (defaults to the configured output directory)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Output table
        #[arg(short, long, default_value = "genus_frequencies.tsv")]
        output: PathBuf,

        /// Genera of interest, comma separated
        #[arg(short, long, value_delimiter = ',')]
        genera: Vec<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Options of `peptax annotate`; each one overrides the configuration
#[derive(Args, Debug, Default, Clone)]
pub struct AnnotateArgs {
    /// Directory with peptide lists (*.txt)
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Directory for taxonomy tables
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Peptides per annotation request
    #[arg(long)]
    pub peptide_batch_size: Option<usize>,

    /// Taxon IDs per taxon lookup request
    #[arg(long)]
    pub taxon_batch_size: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient failures (0 disables retrying)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Stop at the first file that fails
    #[arg(long)]
    pub fail_fast: bool,
}

impl AnnotateArgs {
    /// Apply these flags on top of `config`
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(size) = self.peptide_batch_size {
            config.peptide_batch_size = size;
        }
        if let Some(size) = self.taxon_batch_size {
            config.taxon_batch_size = size;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        config.fail_fast |= self.fail_fast;
        config
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration as TOML
    Show,
}
