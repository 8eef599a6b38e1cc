//! Progress bar utilities for CLI operations

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PEPTIDE_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} peptides ({eta})";

/// Create a progress bar counting processed peptides.
///
/// Falls back to the default bar style if the template is rejected, and stays
/// hidden when stderr is not a terminal.
pub fn create_peptide_progress(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_bar()
        .template(PEPTIDE_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
