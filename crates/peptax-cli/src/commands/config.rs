//! `peptax config` command implementation

use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Show the effective configuration
pub fn show(config: &Config) -> Result<()> {
    println!("{}", "# Peptax configuration".cyan().bold());
    println!("{}", config.to_toml()?);
    println!("{}", "# Environment variables:".cyan());
    for (var, purpose) in ENV_VARS {
        println!("#   {:<20} {}", var, purpose);
    }
    Ok(())
}

const ENV_VARS: [(&str, &str); 7] = [
    ("PEPTAX_CONFIG", "Configuration file"),
    ("PEPTAX_BASE_URL", "Annotation service base URL"),
    ("PEPTAX_INPUT_DIR", "Peptide list directory"),
    ("PEPTAX_OUTPUT_DIR", "Taxonomy table directory"),
    ("PEPTAX_TIMEOUT_SECS", "Request timeout in seconds"),
    ("PEPTAX_MAX_RETRIES", "Retries for transient failures"),
    ("PEPTAX_LOG_LEVEL", "trace, debug, info, warn or error"),
];
