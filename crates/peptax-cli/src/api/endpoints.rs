//! API endpoint URL builders

/// Build the peptide annotation (LCA) endpoint URL
pub fn pept2data_url(base_url: &str) -> String {
    format!("{}/mpa/pept2data", base_url.trim_end_matches('/'))
}

/// Build the taxa lookup endpoint URL
pub fn taxa_url(base_url: &str) -> String {
    format!("{}/private_api/taxa", base_url.trim_end_matches('/'))
}
