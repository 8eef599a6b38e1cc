//! Annotation service client
//!
//! JSON-over-HTTP access to the Unipept peptide and taxa endpoints, behind the
//! [`TaxonomyService`] trait so the resolver can run against canned data.

pub mod client;
pub mod endpoints;
pub mod service;
pub mod types;

pub use client::{RetryPolicy, UnipeptClient};
pub use service::TaxonomyService;
