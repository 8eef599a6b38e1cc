//! HTTP client for the Unipept annotation service

use crate::api::{endpoints, service::TaxonomyService, types::*};
use crate::config::Config;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use peptax_common::types::{PeptideAnnotation, Taxon, TaxonId};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry behaviour for transient request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every following one
    pub backoff: Duration,
}

impl RetryPolicy {
    /// No retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Client for the Unipept `pept2data` and `taxa` endpoints
pub struct UnipeptClient {
    client: Client,
    base_url: String,
    taxon_batch_size: usize,
    retry: RetryPolicy,
}

impl UnipeptClient {
    /// Create a client with the given request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("peptax/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            taxon_batch_size: crate::config::DEFAULT_TAXON_BATCH_SIZE,
            retry: RetryPolicy::none(),
        })
    }

    /// Create a client from CLI configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_taxon_batch_size(config.taxon_batch_size)
        .with_retry(RetryPolicy {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }))
    }

    pub fn with_taxon_batch_size(mut self, size: usize) -> Self {
        self.taxon_batch_size = size.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// POST a JSON body, retrying transient failures per the retry policy
    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.post_json_once(url, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        url,
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_json_once<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = error_body(response.text().await);
            return Err(CliError::remote_service(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

/// Body of an error response, or why it could not be read
fn error_body<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| format!("<body unavailable: {}>", e))
}

#[async_trait]
impl TaxonomyService for UnipeptClient {
    async fn query_peptide_batch(&self, peptides: &[String]) -> Result<Vec<PeptideAnnotation>> {
        let url = endpoints::pept2data_url(&self.base_url);
        let response: Pept2DataResponse = self.post_json(&url, &Pept2DataRequest::new(peptides)).await?;

        let requested: HashSet<&str> = peptides.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut annotations = Vec::with_capacity(response.peptides.len());

        for entry in response.peptides {
            let Some(lca) = entry.lca() else {
                debug!(peptide = %entry.sequence, "No LCA reported, dropping peptide");
                continue;
            };
            if !requested.contains(entry.sequence.as_str()) {
                debug!(peptide = %entry.sequence, "Ignoring annotation for a peptide that was not requested");
                continue;
            }
            if seen.insert(entry.sequence.clone()) {
                annotations.push(PeptideAnnotation::new(entry.sequence, lca));
            }
        }

        Ok(annotations)
    }

    async fn query_taxa_batch(&self, taxon_ids: &[TaxonId]) -> Result<Vec<Taxon>> {
        let url = endpoints::taxa_url(&self.base_url);
        let response: Vec<TaxonData> = self.post_json(&url, &TaxaRequest { taxids: taxon_ids }).await?;
        Ok(response.into_iter().map(Taxon::from).collect())
    }

    fn taxon_batch_size(&self) -> usize {
        self.taxon_batch_size
    }
}
