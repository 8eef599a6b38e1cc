//! Common types used across Peptax

use std::collections::HashMap;

/// NCBI taxonomy identifier as used by the annotation service (e.g., 9606)
pub type TaxonId = i32;

/// Taxonomic ranks of a lineage, from superkingdom down to forma.
///
/// Lineage entries returned by the annotation service are positional: entry
/// `i` is the ancestor at rank `LINEAGE_RANKS[i]`.
pub const LINEAGE_RANKS: [&str; 27] = [
    "superkingdom",
    "kingdom",
    "subkingdom",
    "superphylum",
    "phylum",
    "subphylum",
    "superclass",
    "class",
    "subclass",
    "superorder",
    "order",
    "suborder",
    "infraorder",
    "superfamily",
    "family",
    "subfamily",
    "tribe",
    "subtribe",
    "genus",
    "subgenus",
    "species group",
    "species subgroup",
    "species",
    "subspecies",
    "strain",
    "varietas",
    "forma",
];

/// The default rank list as owned strings, for configuration defaults
pub fn default_ranks() -> Vec<String> {
    LINEAGE_RANKS.iter().map(|rank| rank.to_string()).collect()
}

/// A taxon with its display name and positional lineage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxon {
    /// Taxonomy ID
    pub id: TaxonId,

    /// Scientific name (empty when the service supplied none)
    pub name: String,

    /// Ancestor IDs, one slot per rank; `None` where the rank is absent
    pub lineage: Vec<Option<TaxonId>>,
}

impl Taxon {
    pub fn new(id: TaxonId, name: impl Into<String>, lineage: Vec<Option<TaxonId>>) -> Self {
        Self {
            id,
            name: name.into(),
            lineage,
        }
    }

    /// Ancestor ID at a rank position, if present
    pub fn ancestor_at(&self, position: usize) -> Option<TaxonId> {
        self.lineage.get(position).copied().flatten()
    }

    /// All ancestor IDs that are actually set
    pub fn ancestors(&self) -> impl Iterator<Item = TaxonId> + '_ {
        self.lineage.iter().flatten().copied()
    }
}

/// Taxa keyed by ID, merged from one or more batched lookups
pub type TaxonInfoMap = HashMap<TaxonId, Taxon>;

/// A peptide together with the LCA reported for it by the annotation service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeptideAnnotation {
    pub sequence: String,
    pub lca: TaxonId,
}

impl PeptideAnnotation {
    pub fn new(sequence: impl Into<String>, lca: TaxonId) -> Self {
        Self {
            sequence: sequence.into(),
            lca,
        }
    }
}

/// One output row: a peptide, its LCA name and the names of every lineage rank.
///
/// `ranks` always has exactly one entry per configured rank; unresolved ranks
/// are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalRecord {
    pub peptide: String,
    pub lca: String,
    pub ranks: Vec<String>,
}

impl FinalRecord {
    /// Fields in output column order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        [self.peptide.as_str(), self.lca.as_str()]
            .into_iter()
            .chain(self.ranks.iter().map(String::as_str))
    }
}
