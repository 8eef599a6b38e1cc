//! Peptide list I/O and sequence extraction
//!
//! Rescoring tools report peptides in a flanked, modified form such as
//! `K.PEPT[+79.9663]IDEK.A`. Taxonomic annotation needs the bare sequence
//! (`PEPTIDEK`), which [`PeptideExtractor`] recovers.

use crate::error::Result;
use regex::Regex;
use std::path::Path;

/// Sequence between the flanking dots, allowing bracketed annotations that
/// themselves contain dots (mass deltas).
const FLANKED_PATTERN: &str = r"\.([^.\[]*?(?:\[[^\]]*\][^.\[]*?)*)\.";

/// Bracketed modification annotation
const MODIFICATION_PATTERN: &str = r"\[.*?\]";

/// Strips flanking residues and modification annotations from peptide strings
#[derive(Debug, Clone)]
pub struct PeptideExtractor {
    flanked: Regex,
    modification: Regex,
}

impl PeptideExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            flanked: Regex::new(FLANKED_PATTERN)?,
            modification: Regex::new(MODIFICATION_PATTERN)?,
        })
    }

    /// Extract the bare sequence, or an empty string when the input carries no
    /// flanking dots.
    pub fn extract(&self, peptide: &str) -> String {
        match self.flanked.captures(peptide).and_then(|c| c.get(1)) {
            Some(inner) => self.modification.replace_all(inner.as_str(), "").into_owned(),
            None => String::new(),
        }
    }
}

/// Read a peptide list: one sequence per line, surrounding whitespace trimmed,
/// blank lines skipped. Order and duplicates are preserved.
pub fn read_peptide_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_peptide_list(&content))
}

/// Parse the contents of a peptide list
pub fn parse_peptide_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write a peptide list, one sequence per line
pub fn write_peptide_list<'a>(
    path: impl AsRef<Path>,
    peptides: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut content = String::new();
    for peptide in peptides {
        content.push_str(peptide);
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}
