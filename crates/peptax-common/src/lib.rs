//! Peptax Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Peptax workspace.
//!
//! # Overview
//!
//! - **Types**: taxa, lineages, peptide annotations and the flattened
//!   per-peptide taxonomy record
//! - **Peptides**: reading peptide lists and extracting bare sequences from
//!   rescoring output
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Error Handling**: the common error and result types
//!
//! # Example
//!
//! ```no_run
//! use peptax_common::peptide::read_peptide_list;
//!
//! fn count(path: &str) -> peptax_common::Result<usize> {
//!     Ok(read_peptide_list(path)?.len())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod peptide;
pub mod types;

// Re-export commonly used types
pub use error::{PeptaxError, Result};
