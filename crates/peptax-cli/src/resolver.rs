//! Two-stage lineage resolution
//!
//! Round one annotates peptides in batches and looks up the distinct LCA taxa.
//! Round two looks up every lineage ancestor of those taxa that round one did
//! not already cover, purely to name the rank columns. The service stays the
//! authority on lineage membership; this module only flattens and names it.

use crate::api::TaxonomyService;
use crate::error::Result;
use indicatif::ProgressBar;
use peptax_common::types::{FinalRecord, PeptideAnnotation, TaxonId, TaxonInfoMap};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Resolves peptide lists into flattened, named lineage records
pub struct LineageResolver<'a, S: TaxonomyService + ?Sized> {
    service: &'a S,
    peptide_batch_size: usize,
    rank_count: usize,
}

impl<'a, S: TaxonomyService + ?Sized> LineageResolver<'a, S> {
    pub fn new(service: &'a S, peptide_batch_size: usize, rank_count: usize) -> Self {
        Self {
            service,
            peptide_batch_size: peptide_batch_size.max(1),
            rank_count,
        }
    }

    /// Resolve `peptides` into one record per peptide that has an LCA.
    ///
    /// Batches are queried strictly in order and `progress` advances by the
    /// size of each finished batch. Any service error aborts the resolution.
    pub async fn resolve(&self, peptides: &[String], progress: &ProgressBar) -> Result<Vec<FinalRecord>> {
        let (annotations, lca_ids) = self.annotate_peptides(peptides, progress).await?;

        let lca_query: Vec<Option<TaxonId>> = lca_ids.iter().copied().map(Some).collect();
        let lca_taxa = self.service.query_taxa_info(&lca_query).await?;

        let lineage_names = self.resolve_lineage_names(&lca_ids, &lca_taxa).await?;

        let records: Vec<FinalRecord> = annotations
            .into_iter()
            .map(|annotation| self.build_record(annotation, &lca_taxa, &lineage_names))
            .collect();

        info!(
            peptides = peptides.len(),
            annotated = records.len(),
            lca_taxa = lca_taxa.len(),
            lineage_taxa = lineage_names.len(),
            "Lineage resolution finished"
        );
        Ok(records)
    }

    /// Round one: batched peptide annotation, collecting the distinct LCA IDs
    async fn annotate_peptides(
        &self,
        peptides: &[String],
        progress: &ProgressBar,
    ) -> Result<(Vec<PeptideAnnotation>, BTreeSet<TaxonId>)> {
        let mut annotations = Vec::with_capacity(peptides.len());
        let mut lca_ids = BTreeSet::new();

        for batch in peptides.chunks(self.peptide_batch_size) {
            let batch_annotations = self.service.query_peptide_batch(batch).await?;
            if batch_annotations.len() < batch.len() {
                debug!(
                    batch_size = batch.len(),
                    annotated = batch_annotations.len(),
                    "Peptides without LCA dropped"
                );
            }
            for annotation in batch_annotations {
                lca_ids.insert(annotation.lca);
                annotations.push(annotation);
            }
            progress.inc(batch.len() as u64);
        }

        Ok((annotations, lca_ids))
    }

    /// Round two: names for every lineage ancestor of the LCA taxa.
    ///
    /// IDs already looked up in round one are not requested again; their
    /// round-one result (or absence) is reused.
    async fn resolve_lineage_names(
        &self,
        lca_ids: &BTreeSet<TaxonId>,
        lca_taxa: &TaxonInfoMap,
    ) -> Result<HashMap<TaxonId, String>> {
        let lineage_ids: BTreeSet<TaxonId> = lca_taxa.values().flat_map(|taxon| taxon.ancestors()).collect();

        let pending: Vec<Option<TaxonId>> = lineage_ids
            .iter()
            .filter(|id| !lca_ids.contains(*id))
            .map(|id| Some(*id))
            .collect();
        let lineage_taxa = self.service.query_taxa_info(&pending).await?;

        let mut names: HashMap<TaxonId, String> =
            lineage_taxa.into_iter().map(|(id, taxon)| (id, taxon.name)).collect();
        names.extend(
            lca_taxa
                .iter()
                .filter(|(id, _)| lineage_ids.contains(*id))
                .map(|(id, taxon)| (*id, taxon.name.clone())),
        );

        let unresolved = lineage_ids.iter().filter(|id| !names.contains_key(*id)).count();
        if unresolved > 0 {
            debug!(unresolved, "Lineage taxa without a name; their rank columns stay empty");
        }

        Ok(names)
    }

    fn build_record(
        &self,
        annotation: PeptideAnnotation,
        lca_taxa: &TaxonInfoMap,
        lineage_names: &HashMap<TaxonId, String>,
    ) -> FinalRecord {
        let Some(taxon) = lca_taxa.get(&annotation.lca) else {
            debug!(peptide = %annotation.sequence, lca = annotation.lca, "LCA taxon not found");
            return FinalRecord {
                peptide: annotation.sequence,
                lca: String::new(),
                ranks: vec![String::new(); self.rank_count],
            };
        };

        let ranks = (0..self.rank_count)
            .map(|position| {
                taxon
                    .ancestor_at(position)
                    .and_then(|id| lineage_names.get(&id))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        FinalRecord {
            peptide: annotation.sequence,
            lca: taxon.name.clone(),
            ranks,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use super::*;
    use crate::error::CliError;
    use async_trait::async_trait;
    use peptax_common::types::{Taxon, LINEAGE_RANKS};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory annotation service with canned answers and a request log
    #[derive(Default)]
    pub(crate) struct CannedService {
        pub lcas: HashMap<String, TaxonId>,
        pub taxa: HashMap<TaxonId, Taxon>,
        pub batch_size: usize,
        pub fail_peptides: bool,
        /// Taxa requests containing any of these IDs fail
        pub fail_taxa: HashSet<TaxonId>,
        pub peptide_requests: Mutex<Vec<Vec<String>>>,
        pub taxa_requests: Mutex<Vec<Vec<TaxonId>>>,
    }

    impl CannedService {
        pub fn new() -> Self {
            Self {
                batch_size: 100,
                ..Self::default()
            }
        }

        pub fn with_lca(mut self, peptide: &str, lca: TaxonId) -> Self {
            self.lcas.insert(peptide.to_string(), lca);
            self
        }

        pub fn with_taxon(mut self, id: TaxonId, name: &str, lineage: Vec<Option<TaxonId>>) -> Self {
            self.taxa.insert(id, Taxon::new(id, name, lineage));
            self
        }

        pub fn requested_taxa(&self) -> Vec<TaxonId> {
            self.taxa_requests.lock().unwrap().iter().flatten().copied().collect()
        }
    }

    #[async_trait]
    impl TaxonomyService for CannedService {
        async fn query_peptide_batch(&self, peptides: &[String]) -> Result<Vec<PeptideAnnotation>> {
            self.peptide_requests.lock().unwrap().push(peptides.to_vec());
            if self.fail_peptides {
                return Err(CliError::remote_service(500, "Internal Server Error"));
            }
            Ok(peptides
                .iter()
                .filter_map(|p| self.lcas.get(p).map(|lca| PeptideAnnotation::new(p.clone(), *lca)))
                .collect())
        }

        async fn query_taxa_batch(&self, taxon_ids: &[TaxonId]) -> Result<Vec<Taxon>> {
            self.taxa_requests.lock().unwrap().push(taxon_ids.to_vec());
            if taxon_ids.iter().any(|id| self.fail_taxa.contains(id)) {
                return Err(CliError::remote_service(503, "Service Unavailable"));
            }
            Ok(taxon_ids.iter().filter_map(|id| self.taxa.get(id).cloned()).collect())
        }

        fn taxon_batch_size(&self) -> usize {
            self.batch_size
        }
    }

    fn peptides(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    /// A 27-slot human lineage with a few absent ranks
    fn human_lineage() -> Vec<Option<TaxonId>> {
        let mut lineage = vec![None; LINEAGE_RANKS.len()];
        lineage[0] = Some(2759); // superkingdom
        lineage[1] = Some(33208); // kingdom
        lineage[18] = Some(9605); // genus
        lineage[22] = Some(9606); // species
        lineage
    }

    fn human_service() -> CannedService {
        CannedService::new()
            .with_lca("AAAK", 9606)
            .with_taxon(9606, "Homo sapiens", human_lineage())
            .with_taxon(2759, "Eukaryota", vec![Some(2759)])
            .with_taxon(33208, "Metazoa", vec![Some(2759), Some(33208)])
            .with_taxon(9605, "Homo", vec![])
    }

    #[tokio::test]
    async fn test_resolves_names_and_drops_peptides_without_lca() {
        let service = human_service();
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        let records = resolver
            .resolve(&peptides(&["AAAK", "BBBK"]), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.peptide, "AAAK");
        assert_eq!(record.lca, "Homo sapiens");
        assert_eq!(record.ranks.len(), LINEAGE_RANKS.len());
        assert_eq!(record.ranks[0], "Eukaryota");
        assert_eq!(record.ranks[1], "Metazoa");
        assert_eq!(record.ranks[2], "");
        assert_eq!(record.ranks[18], "Homo");
        assert_eq!(record.ranks[22], "Homo sapiens");
    }

    #[tokio::test]
    async fn test_peptides_are_batched_in_order_with_progress() {
        let service = CannedService::new();
        let resolver = LineageResolver::new(&service, 2, LINEAGE_RANKS.len());
        let input = peptides(&["A", "B", "C", "D", "E"]);
        let progress = ProgressBar::hidden();

        let records = resolver.resolve(&input, &progress).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(progress.position(), 5);
        let requests = service.peptide_requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            vec![peptides(&["A", "B"]), peptides(&["C", "D"]), peptides(&["E"])]
        );
    }

    #[tokio::test]
    async fn test_every_taxon_is_requested_once() {
        let service = human_service().with_lca("CCCK", 33208);
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        resolver
            .resolve(&peptides(&["AAAK", "CCCK"]), &ProgressBar::hidden())
            .await
            .unwrap();

        let mut requested = service.requested_taxa();
        let total = requested.len();
        requested.sort_unstable();
        requested.dedup();
        assert_eq!(requested.len(), total, "a taxon was requested twice");
        assert_eq!(requested, vec![2759, 9605, 9606, 33208]);
    }

    #[tokio::test]
    async fn test_short_lineage_pads_with_empty_ranks() {
        let service = CannedService::new()
            .with_lca("EEEK", 2)
            .with_taxon(2, "Bacteria", vec![Some(2)]);
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        let records = resolver
            .resolve(&peptides(&["EEEK"]), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(records[0].ranks[0], "Bacteria");
        assert!(records[0].ranks[1..].iter().all(String::is_empty));
        assert_eq!(records[0].ranks.len(), LINEAGE_RANKS.len());
    }

    #[tokio::test]
    async fn test_unknown_lineage_taxon_renders_empty() {
        // 33208 is referenced by the lineage but never returned by the service
        let service = CannedService::new()
            .with_lca("AAAK", 9606)
            .with_taxon(9606, "Homo sapiens", human_lineage())
            .with_taxon(2759, "Eukaryota", vec![])
            .with_taxon(9605, "Homo", vec![]);
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        let records = resolver
            .resolve(&peptides(&["AAAK"]), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(records[0].ranks[0], "Eukaryota");
        assert_eq!(records[0].ranks[1], "");
        assert_eq!(records[0].ranks[18], "Homo");
        assert_eq!(records[0].lca, "Homo sapiens");
    }

    #[tokio::test]
    async fn test_missing_lca_taxon_yields_empty_record() {
        let service = CannedService::new().with_lca("GGGK", 424242);
        let resolver = LineageResolver::new(&service, 10, 3);

        let records = resolver
            .resolve(&peptides(&["GGGK"]), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(
            records,
            vec![FinalRecord {
                peptide: "GGGK".to_string(),
                lca: String::new(),
                ranks: vec![String::new(); 3],
            }]
        );
    }

    #[tokio::test]
    async fn test_lineage_lookup_failure_aborts_resolution() {
        let service = CannedService {
            fail_taxa: HashSet::from([9605]),
            ..human_service()
        };
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        let result = resolver.resolve(&peptides(&["AAAK"]), &ProgressBar::hidden()).await;

        assert!(matches!(result, Err(CliError::RemoteService { status: 503, .. })));
        let requests = service.taxa_requests.lock().unwrap().clone();
        assert_eq!(requests, vec![vec![9606], vec![2759, 9605, 33208]]);
    }

    #[tokio::test]
    async fn test_service_failure_aborts_resolution() {
        let service = CannedService {
            fail_peptides: true,
            ..human_service()
        };
        let resolver = LineageResolver::new(&service, 10, LINEAGE_RANKS.len());

        let err = resolver
            .resolve(&peptides(&["AAAK"]), &ProgressBar::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::RemoteService { status: 500, .. }));
        assert!(service.requested_taxa().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let service = human_service().with_lca("CCCK", 33208);
        let resolver = LineageResolver::new(&service, 1, LINEAGE_RANKS.len());
        let input = peptides(&["CCCK", "AAAK", "BBBK"]);

        let first = resolver.resolve(&input, &ProgressBar::hidden()).await.unwrap();
        let second = resolver.resolve(&input, &ProgressBar::hidden()).await.unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_taxa_lookup_is_batch_invariant(
            ids in proptest::collection::vec(proptest::option::of(0i32..60), 0..80),
            batch_size in 1usize..20,
        ) {
            let mut service = CannedService::new();
            for id in (1..60).filter(|id| id % 3 != 0) {
                service.taxa.insert(id, Taxon::new(id, format!("taxon {id}"), vec![Some(1), Some(id)]));
            }
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

            service.batch_size = usize::MAX;
            let single = runtime.block_on(service.query_taxa_info(&ids)).unwrap();
            service.batch_size = batch_size;
            let batched = runtime.block_on(service.query_taxa_info(&ids)).unwrap();

            prop_assert_eq!(&single, &batched);
            let requested: BTreeSet<TaxonId> = ids.iter().flatten().copied().filter(|id| *id != 0).collect();
            prop_assert!(batched.keys().all(|id| requested.contains(id)));
        }
    }
}
