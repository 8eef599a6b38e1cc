//! The seam between the lineage resolver and the annotation service

use crate::error::Result;
use async_trait::async_trait;
use peptax_common::types::{PeptideAnnotation, Taxon, TaxonId, TaxonInfoMap};
use std::collections::BTreeSet;
use tracing::debug;

/// A source of peptide LCAs and taxon information.
///
/// Implementors provide single-request operations; batching over taxon IDs is
/// shared through [`TaxonomyService::query_taxa_info`].
#[async_trait]
pub trait TaxonomyService: Send + Sync {
    /// Annotate one batch of peptides.
    ///
    /// Returns at most one annotation per input peptide, only for peptides the
    /// service gave a non-null LCA, and never for a sequence that was not in
    /// `peptides`.
    async fn query_peptide_batch(&self, peptides: &[String]) -> Result<Vec<PeptideAnnotation>>;

    /// Look up one batch of taxon IDs in a single request
    async fn query_taxa_batch(&self, taxon_ids: &[TaxonId]) -> Result<Vec<Taxon>>;

    /// Number of taxon IDs sent per request
    fn taxon_batch_size(&self) -> usize {
        crate::config::DEFAULT_TAXON_BATCH_SIZE
    }

    /// Resolve a set of taxon IDs into a [`TaxonInfoMap`].
    ///
    /// Null and zero IDs are dropped and duplicates collapsed before the IDs
    /// are split into batches of [`taxon_batch_size`](Self::taxon_batch_size).
    /// The first failing batch aborts the lookup; no partial map is returned.
    /// Response entries for IDs that were not requested are ignored, so the
    /// key set is always a subset of the requested IDs.
    async fn query_taxa_info(&self, taxon_ids: &[Option<TaxonId>]) -> Result<TaxonInfoMap> {
        let ids: Vec<TaxonId> = taxon_ids
            .iter()
            .flatten()
            .copied()
            .filter(|id| *id != 0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let batch_size = self.taxon_batch_size().max(1);
        let mut taxa = TaxonInfoMap::with_capacity(ids.len());

        for batch in ids.chunks(batch_size) {
            for taxon in self.query_taxa_batch(batch).await? {
                if batch.binary_search(&taxon.id).is_err() {
                    debug!(taxon_id = taxon.id, "Ignoring taxon that was not requested");
                    continue;
                }
                taxa.insert(taxon.id, taxon);
            }
        }

        debug!(requested = ids.len(), resolved = taxa.len(), "Taxa lookup finished");
        Ok(taxa)
    }
}
