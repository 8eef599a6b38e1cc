//! `peptax annotate` command implementation
//!
//! Maps every peptide list in the input directory to LCA names and lineages,
//! writing one taxonomy table per list.

use crate::api::{TaxonomyService, UnipeptClient};
use crate::assembler;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::progress;
use crate::resolver::LineageResolver;
use colored::Colorize;
use peptax_common::peptide::read_peptide_list;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, Instrument};

/// Outcome of one annotation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotateSummary {
    /// Output tables written
    pub written: Vec<PathBuf>,
    /// Input files that failed
    pub failed: Vec<PathBuf>,
}

impl AnnotateSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

/// Run the annotation pipeline against the configured service
pub async fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let inputs = prepare_directories(config)?;
    let client = UnipeptClient::from_config(config)?;

    let summary = annotate_files(&client, config, &inputs).await?;

    println!(
        "\n{} {} table(s) written to {}",
        "✓".green().bold(),
        summary.written.len(),
        config.output_dir.display()
    );

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::FilesFailed {
            failed: summary.failed.len(),
            total: summary.total(),
        })
    }
}

/// Check filesystem preconditions before any request is made: the input
/// directory must exist and the output directory must accept new files.
///
/// Returns the `*.txt` inputs sorted by file name.
pub fn prepare_directories(config: &Config) -> Result<Vec<PathBuf>> {
    if !config.input_dir.is_dir() {
        return Err(CliError::InputNotFound(config.input_dir.clone()));
    }

    std::fs::create_dir_all(&config.output_dir).map_err(|source| CliError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;
    // Writability check; the file is removed on drop
    tempfile::NamedTempFile::new_in(&config.output_dir).map_err(|source| CliError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    list_files_with_extension(&config.input_dir, "txt")
}

/// Files directly inside `dir` with the given extension, sorted by name
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Annotate each input file in turn.
///
/// A failing file is logged and recorded, and no table is written for it.
/// With `fail_fast` the first failure is returned instead.
pub async fn annotate_files<S: TaxonomyService + ?Sized>(
    service: &S,
    config: &Config,
    inputs: &[PathBuf],
) -> Result<AnnotateSummary> {
    let mut summary = AnnotateSummary::default();

    if inputs.is_empty() {
        println!("No peptide lists (*.txt) found in {}", config.input_dir.display());
        return Ok(summary);
    }

    info!(files = inputs.len(), base_url = %config.base_url, "Starting annotation");

    for input in inputs {
        let span = info_span!("annotate_file", file = %input.display());
        match annotate_file(service, config, input).instrument(span).await {
            Ok((output, rows)) => {
                println!("{} {} ({} peptides annotated)", "✓".green(), output.display(), rows);
                summary.written.push(output);
            },
            Err(e) if config.fail_fast => return Err(e),
            Err(e) => {
                error!(file = %input.display(), error = %e, "Annotation failed");
                println!("{} {}: {}", "✗".red(), input.display(), e);
                summary.failed.push(input.clone());
            },
        }
    }

    Ok(summary)
}

/// Resolve one peptide list and save its table.
///
/// Returns the output path and the number of rows written.
pub async fn annotate_file<S: TaxonomyService + ?Sized>(
    service: &S,
    config: &Config,
    input: &Path,
) -> Result<(PathBuf, usize)> {
    let output = assembler::output_path(input, &config.output_dir)
        .ok_or_else(|| CliError::InputNotFound(input.to_path_buf()))?;

    let peptides = read_peptide_list(input)?;
    let file_name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let pb = progress::create_peptide_progress(peptides.len() as u64, &format!("Processing {}", file_name));

    let resolver = LineageResolver::new(service, config.peptide_batch_size, config.ranks.len());
    let records = match resolver.resolve(&peptides, &pb).await {
        Ok(records) => records,
        Err(e) => {
            pb.abandon();
            return Err(e);
        },
    };
    pb.finish_and_clear();

    assembler::save_table(&output, &config.ranks, &records)?;
    info!(output = %output.display(), rows = records.len(), "Saved taxonomy table");

    Ok((output, records.len()))
}
