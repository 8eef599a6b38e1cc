//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod annotate;
pub mod config;
pub mod frequencies;
pub mod prepare;
