use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::SimpleResult;

use super::utils::check_required_filename;

#[derive(Args, Serialize)]
pub struct TripleReferenceSettings {
    /// Directory for all triple-reference command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_triple_reference_output"))]
    pub output_dir: Utf8PathBuf,

    /// Reference genomes in FASTA format, optionally gzip-compressed
    #[arg(long = "ref", value_name = "FILE")]
    pub ref_filename: Utf8PathBuf,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_triple_reference_settings(
    settings: TripleReferenceSettings,
) -> SimpleResult<TripleReferenceSettings> {
    check_required_filename(&settings.ref_filename, "reference")?;
    Ok(settings)
}
