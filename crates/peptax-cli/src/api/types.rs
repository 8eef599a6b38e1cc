//! API request and response types
//!
//! Optional fields are modelled explicitly here; everything past this module
//! works with the domain types from `peptax_common::types`.

use peptax_common::types::{Taxon, TaxonId};
use serde::{Deserialize, Serialize};

/// Request body for `POST /mpa/pept2data`
#[derive(Debug, Clone, Serialize)]
pub struct Pept2DataRequest<'a> {
    pub peptides: &'a [String],
    /// Treat isoleucine and leucine as equal
    pub equate_il: bool,
    /// Consider missed tryptic cleavages
    pub missed: bool,
}

impl<'a> Pept2DataRequest<'a> {
    pub fn new(peptides: &'a [String]) -> Self {
        Self {
            peptides,
            equate_il: true,
            missed: true,
        }
    }
}

/// Response body of `POST /mpa/pept2data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pept2DataResponse {
    #[serde(default)]
    pub peptides: Vec<PeptideData>,
}

/// One peptide entry; the service sends more fields than these, which are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct PeptideData {
    pub sequence: String,
    #[serde(default)]
    pub lca: Option<TaxonId>,
}

impl PeptideData {
    /// The LCA if the service supplied a usable one (`0` counts as absent)
    pub fn lca(&self) -> Option<TaxonId> {
        self.lca.filter(|id| *id != 0)
    }
}

/// Request body for `POST /private_api/taxa`
#[derive(Debug, Clone, Serialize)]
pub struct TaxaRequest<'a> {
    pub taxids: &'a [TaxonId],
}

/// One element of the `POST /private_api/taxa` response array
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonData {
    pub id: TaxonId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lineage: Option<Vec<Option<TaxonId>>>,
}

impl From<TaxonData> for Taxon {
    fn from(data: TaxonData) -> Self {
        Taxon {
            id: data.id,
            name: data.name.unwrap_or_default(),
            lineage: data.lineage.unwrap_or_default(),
        }
    }
}
