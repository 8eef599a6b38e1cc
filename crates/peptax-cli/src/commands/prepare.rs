//! `peptax prepare` command implementation
//!
//! Turns rescoring result tables into peptide lists, one list per q-value
//! threshold.

use crate::commands::annotate::list_files_with_extension;
use crate::error::{CliError, Result};
use colored::Colorize;
use peptax_common::peptide::{write_peptide_list, PeptideExtractor};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PEPTIDE_COLUMN: &str = "peptide";
const Q_VALUE_COLUMN: &str = "q-value";

/// A rescoring row reduced to the two columns that matter
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPeptide {
    pub peptide: String,
    pub q_value: f64,
}

/// Run `prepare` over every `*.txt` table in `input_dir`
pub fn run(input_dir: &Path, output_dir: &Path, thresholds: &[f64]) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(CliError::InputNotFound(input_dir.to_path_buf()));
    }
    if thresholds.is_empty() {
        return Err(CliError::config("at least one q-value threshold is required"));
    }
    std::fs::create_dir_all(output_dir).map_err(|source| CliError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let extractor = PeptideExtractor::new()?;
    let inputs = list_files_with_extension(input_dir, "txt")?;
    let mut written = 0;

    for input in &inputs {
        match prepare_file(&extractor, input, output_dir, thresholds)? {
            Some(outputs) => {
                println!("{} {} ({} lists)", "✓".green(), input.display(), outputs.len());
                written += outputs.len();
            },
            None => println!("{} {}: required columns not found", "-".yellow(), input.display()),
        }
    }

    println!(
        "\n{} {} peptide list(s) written to {}",
        "✓".green().bold(),
        written,
        output_dir.display()
    );
    Ok(())
}

/// Split one rescoring table into per-threshold peptide lists.
///
/// Returns `None` when the table lacks a `peptide` or `q-value` column.
pub fn prepare_file(
    extractor: &PeptideExtractor,
    input: &Path,
    output_dir: &Path,
    thresholds: &[f64],
) -> Result<Option<Vec<PathBuf>>> {
    let Some(rows) = read_scored_peptides(input)? else {
        warn!(file = %input.display(), "Skipping table without peptide/q-value columns");
        return Ok(None);
    };

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut outputs = Vec::with_capacity(thresholds.len());
    for &threshold in thresholds {
        let peptides: Vec<String> = rows
            .iter()
            .filter(|row| row.q_value <= threshold)
            .map(|row| extractor.extract(&row.peptide))
            .filter(|seq| !seq.is_empty())
            .collect();

        let output = output_dir.join(format!("{}.{}.txt", stem, threshold_suffix(threshold)));
        write_peptide_list(&output, peptides.iter().map(String::as_str))?;
        info!(output = %output.display(), threshold, peptides = peptides.len(), "Wrote peptide list");
        outputs.push(output);
    }

    Ok(Some(outputs))
}

/// Read the `peptide` and `q-value` columns of a tab-separated table.
///
/// Rows whose q-value does not parse are skipped.
pub fn read_scored_peptides(path: &Path) -> Result<Option<Vec<ScoredPeptide>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(peptide_idx), Some(q_idx)) = (position(PEPTIDE_COLUMN), position(Q_VALUE_COLUMN)) else {
        return Ok(None);
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let (Some(peptide), Some(q_value)) = (record.get(peptide_idx), record.get(q_idx)) else {
            debug!(file = %path.display(), row = line + 1, "Short row skipped");
            continue;
        };
        match q_value.trim().parse::<f64>() {
            Ok(q_value) => rows.push(ScoredPeptide {
                peptide: peptide.to_string(),
                q_value,
            }),
            Err(_) => debug!(file = %path.display(), row = line + 1, q_value, "Unparseable q-value skipped"),
        }
    }
    Ok(Some(rows))
}

/// `0.01` -> `0_01`
pub fn threshold_suffix(threshold: f64) -> String {
    threshold.to_string().replace('.', "_")
}
