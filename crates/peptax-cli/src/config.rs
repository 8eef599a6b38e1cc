//! Configuration management for the Peptax CLI
//!
//! Layering, lowest precedence first: built-in defaults, an optional TOML
//! file, `PEPTAX_*` environment variables, then command-line flags (applied by
//! the command handlers).

use crate::error::{CliError, Result};
use peptax_common::types::default_ranks;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Public Unipept API
pub const DEFAULT_BASE_URL: &str = "https://api.unipept.ugent.be";

/// Peptides per peptide-annotation request; the service's practical limit.
pub const DEFAULT_PEPTIDE_BATCH_SIZE: usize = 10;

/// Taxon IDs per taxa lookup request.
pub const DEFAULT_TAXON_BATCH_SIZE: usize = 100;

/// Default timeout for a single request in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Base delay before the first retry, doubled on every further attempt.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

pub const DEFAULT_INPUT_DIR: &str = "./peptides";
pub const DEFAULT_OUTPUT_DIR: &str = "./lcas";

/// Genera reported individually by `peptax frequencies`; the rest are pooled.
pub const DEFAULT_GENERA: [&str; 4] = ["Salmonella", "Tequatrovirus", "Bacillus", "Escherichia"];

/// q-value cut-offs used by `peptax prepare`.
pub const DEFAULT_Q_VALUE_THRESHOLDS: [f64; 3] = [0.001, 0.01, 0.05];

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Annotation service base URL
    pub base_url: String,

    /// Directory holding one `*.txt` peptide list per condition
    pub input_dir: PathBuf,

    /// Directory receiving one `*_taxonomy.tsv` table per input
    pub output_dir: PathBuf,

    pub peptide_batch_size: usize,
    pub taxon_batch_size: usize,
    pub request_timeout_secs: u64,

    /// Retries for transient failures; 0 disables retrying
    pub max_retries: u32,
    pub retry_backoff_ms: u64,

    /// Abort the run on the first failing input file
    pub fail_fast: bool,

    /// Rank columns of the output table, in lineage order
    pub ranks: Vec<String>,

    pub genera: Vec<String>,
    pub q_value_thresholds: Vec<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            peptide_batch_size: DEFAULT_PEPTIDE_BATCH_SIZE,
            taxon_batch_size: DEFAULT_TAXON_BATCH_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: 0,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            fail_fast: false,
            ranks: default_ranks(),
            genera: DEFAULT_GENERA.iter().map(|g| g.to_string()).collect(),
            q_value_thresholds: DEFAULT_Q_VALUE_THRESHOLDS.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file if given, then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Parse a TOML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::InputNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `PEPTAX_*` environment variables
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("PEPTAX_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(dir) = std::env::var("PEPTAX_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("PEPTAX_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(secs) = std::env::var("PEPTAX_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .parse()
                .map_err(|_| CliError::config(format!("PEPTAX_TIMEOUT_SECS is not a number: '{}'", secs)))?;
        }
        if let Ok(retries) = std::env::var("PEPTAX_MAX_RETRIES") {
            self.max_retries = retries
                .parse()
                .map_err(|_| CliError::config(format!("PEPTAX_MAX_RETRIES is not a number: '{}'", retries)))?;
        }
        Ok(self)
    }

    /// Reject settings that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CliError::config("base_url cannot be empty"));
        }
        if self.peptide_batch_size == 0 {
            return Err(CliError::config("peptide_batch_size must be greater than 0"));
        }
        if self.taxon_batch_size == 0 {
            return Err(CliError::config("taxon_batch_size must be greater than 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(CliError::config("request_timeout_secs must be greater than 0"));
        }
        if self.ranks.is_empty() {
            return Err(CliError::config("ranks cannot be empty"));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
