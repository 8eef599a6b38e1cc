//! Tabular output of resolved peptides
//!
//! One tab-separated table per input file: `peptide`, `lca`, then one column
//! per configured rank.

use crate::error::Result;
use peptax_common::types::FinalRecord;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix that replaces `.txt` in output file names
pub const OUTPUT_SUFFIX: &str = "_taxonomy.tsv";

/// Column names in output order
pub fn header(ranks: &[String]) -> Vec<&str> {
    ["peptide", "lca"]
        .into_iter()
        .chain(ranks.iter().map(String::as_str))
        .collect()
}

/// Output path for an input peptide list: `mix.txt` -> `<output_dir>/mix_taxonomy.tsv`.
///
/// Returns `None` when the input has no file name.
pub fn output_path(input: &Path, output_dir: &Path) -> Option<PathBuf> {
    let file_name = input.file_name()?.to_string_lossy();
    let stem = file_name.strip_suffix(".txt").unwrap_or(&file_name);
    Some(output_dir.join(format!("{}{}", stem, OUTPUT_SUFFIX)))
}

/// Write the table to any writer
pub fn write_table<W: Write>(writer: W, ranks: &[String], records: &[FinalRecord]) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(false)
        .from_writer(writer);

    tsv.write_record(header(ranks))?;
    for record in records {
        tsv.write_record(record.fields())?;
    }
    tsv.flush()?;
    Ok(())
}

/// Write the table to `path`, replacing any existing file
pub fn save_table(path: &Path, ranks: &[String], records: &[FinalRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_table(std::io::BufWriter::new(file), ranks, records)
}
