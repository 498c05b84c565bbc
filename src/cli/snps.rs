use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::SimpleResult;

use super::utils::{check_required_filename, check_unit_name};

#[derive(Args, Serialize)]
pub struct SnpsSettings {
    /// Directory for all snps command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_snps_output"))]
    pub output_dir: Utf8PathBuf,

    /// Contig to triplicated reference alignments in PAF format, including the cs tag
    #[arg(long = "paf", value_name = "FILE")]
    pub paf_filename: Utf8PathBuf,

    /// Triplicated reference in FASTA format
    #[arg(long = "ref", value_name = "FILE")]
    pub ref_filename: Utf8PathBuf,

    /// Sample name used to label all output
    #[arg(long)]
    pub sample: String,

    /// Assembler name used to label all output
    #[arg(long)]
    pub assembler: String,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_snps_settings(
    settings: SnpsSettings,
) -> SimpleResult<SnpsSettings> {
    check_required_filename(&settings.paf_filename, "alignment")?;
    check_required_filename(&settings.ref_filename, "reference")?;
    check_unit_name(&settings.sample, "Sample")?;
    check_unit_name(&settings.assembler, "Assembler")?;

    Ok(settings)
}
