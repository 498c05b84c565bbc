use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::{SimpleResult, bail};

use super::utils::{check_required_filename, check_unit_name};

#[derive(Args, Serialize)]
pub struct GlobalStatsSettings {
    /// Directory for all global-stats command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_global_stats_output"))]
    pub output_dir: Utf8PathBuf,

    /// Assembly contigs in FASTA format, optionally gzip-compressed
    #[arg(long = "assembly", value_name = "FILE")]
    pub assembly_filename: Utf8PathBuf,

    /// Sample name used to label all output
    #[arg(long)]
    pub sample: String,

    /// Assembler name used to label all output
    #[arg(long)]
    pub assembler: String,

    /// Contigs must be longer than this to be included in the 'over min length' statistics
    #[arg(long, default_value_t = 1000)]
    pub min_contig_len: i64,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_global_stats_settings(
    settings: GlobalStatsSettings,
) -> SimpleResult<GlobalStatsSettings> {
    check_required_filename(&settings.assembly_filename, "assembly")?;
    check_unit_name(&settings.sample, "Sample")?;
    check_unit_name(&settings.assembler, "Assembler")?;

    if settings.min_contig_len < 0 {
        bail!("--min-contig-len argument can't be negative");
    }

    Ok(settings)
}
