//! `peptax frequencies` command implementation
//!
//! Summarizes taxonomy tables as relative genus frequencies per condition.

use crate::assembler::OUTPUT_SUFFIX;
use crate::commands::annotate::list_files_with_extension;
use crate::error::{CliError, Result};
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

const GENUS_COLUMN: &str = "genus";
const OTHER_BUCKET: &str = "other";

/// Condition parsed from a taxonomy table name such as `mixA-sage.0_01_taxonomy.tsv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub label: String,
    pub mix: String,
    pub software: String,
    pub fdr: String,
}

impl Condition {
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = OUTPUT_SUFFIX.trim_end_matches(".tsv");
        let label = stem.strip_suffix(suffix).unwrap_or(&stem).to_string();

        let (mix, rest) = label.split_once('-').unwrap_or((label.as_str(), ""));
        let (software, fdr) = rest.split_once('.').unwrap_or((rest, ""));

        Self {
            mix: mix.to_string(),
            software: software.to_string(),
            fdr: fdr.to_string(),
            label,
        }
    }
}

/// Relative frequency of one genus bucket
#[derive(Debug, Clone, PartialEq)]
pub struct GenusFrequency {
    pub genus: String,
    pub relative_frequency: f64,
}

/// Count non-empty values of the `genus` column.
///
/// Returns `None` when the table has no such column.
pub fn count_genera(path: &Path) -> Result<Option<HashMap<String, u64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let Some(idx) = reader.headers()?.iter().position(|h| h == GENUS_COLUMN) else {
        return Ok(None);
    };

    let mut counts = HashMap::new();
    for record in reader.records() {
        let record = record?;
        if let Some(genus) = record.get(idx).filter(|g| !g.is_empty()) {
            *counts.entry(genus.to_string()).or_insert(0) += 1;
        }
    }
    Ok(Some(counts))
}

/// Relative frequencies for the genera of interest plus an `other` bucket.
///
/// Frequencies sum to 1, or are all zero when nothing was counted.
pub fn relative_frequencies(counts: &HashMap<String, u64>, genera: &[String]) -> Vec<GenusFrequency> {
    let total: u64 = counts.values().sum();
    let of_interest: u64 = genera.iter().filter_map(|g| counts.get(g)).sum();

    let buckets = genera
        .iter()
        .map(|g| (g.as_str(), counts.get(g).copied().unwrap_or(0)))
        .chain(std::iter::once((OTHER_BUCKET, total.saturating_sub(of_interest))));

    buckets
        .map(|(genus, count)| GenusFrequency {
            genus: genus.to_string(),
            relative_frequency: if total == 0 { 0.0 } else { count as f64 / total as f64 },
        })
        .collect()
}

/// Write the long-form frequency table for every `*.tsv` in `input_dir`
pub fn run(input_dir: &Path, output: &Path, genera: &[String]) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(CliError::InputNotFound(input_dir.to_path_buf()));
    }

    let file = std::fs::File::create(output)?;
    let rows = write_frequencies(std::io::BufWriter::new(file), input_dir, genera)?;

    println!(
        "{} {} condition(s) summarized in {}",
        "✓".green().bold(),
        rows,
        output.display()
    );
    Ok(())
}

/// Summarize every table and write the result to `writer`.
///
/// Returns the number of conditions written.
pub fn write_frequencies<W: Write>(writer: W, input_dir: &Path, genera: &[String]) -> Result<usize> {
    let mut tsv = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    tsv.write_record(["condition", "mix", "software", "fdr", "genus", "relative_frequency"])?;

    let mut conditions = 0;
    for table in list_files_with_extension(input_dir, "tsv")? {
        let Some(counts) = count_genera(&table)? else {
            warn!(file = %table.display(), "Skipping table without a genus column");
            continue;
        };
        let condition = Condition::from_path(&table);
        let frequencies = relative_frequencies(&counts, genera);
        info!(condition = %condition.label, peptides = counts.values().sum::<u64>(), "Computed genus frequencies");

        for freq in frequencies {
            tsv.write_record([
                condition.label.as_str(),
                condition.mix.as_str(),
                condition.software.as_str(),
                condition.fdr.as_str(),
                freq.genus.as_str(),
                freq.relative_frequency.to_string().as_str(),
            ])?;
        }
        conditions += 1;
    }

    tsv.flush()?;
    Ok(conditions)
}
