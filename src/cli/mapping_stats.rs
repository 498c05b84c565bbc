use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::{SimpleResult, bail};

use super::utils::{check_required_filename, check_unit_name};
use crate::mapping_stats::MappingStatsTargets;

#[derive(Args, Serialize)]
pub struct MappingStatsSettings {
    /// Directory for all mapping-stats command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_mapping_stats_output"))]
    pub output_dir: Utf8PathBuf,

    /// Contig to triplicated reference alignments in PAF format, including the cs tag
    #[arg(long = "paf", value_name = "FILE")]
    pub paf_filename: Utf8PathBuf,

    /// Triplicated reference in FASTA format
    #[arg(long = "ref", value_name = "FILE")]
    pub ref_filename: Utf8PathBuf,

    /// Assembly contigs in FASTA format, used to count N bases in aligned contigs
    #[arg(long = "assembly", value_name = "FILE")]
    pub assembly_filename: Utf8PathBuf,

    /// Sample name used to label all output
    #[arg(long)]
    pub sample: String,

    /// Assembler name used to label all output
    #[arg(long)]
    pub assembler: String,

    /// Target fraction of the reference length for the single L value reported per reference
    #[arg(long, default_value_t = 0.9)]
    pub l_target: f64,

    /// Target fraction for the single NA and NG values reported per reference
    #[arg(long, default_value_t = 0.5)]
    pub n_target: f64,
}

impl MappingStatsSettings {
    pub fn get_targets(&self) -> MappingStatsTargets {
        MappingStatsTargets {
            l_target: self.l_target,
            n_target: self.n_target,
        }
    }
}

fn check_target_fraction(value: f64, label: &str) -> SimpleResult<()> {
    if !(value > 0.0 && value <= 1.0) {
        bail!("--{} argument must be in (0,1], found: {}", label, value);
    }
    Ok(())
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_mapping_stats_settings(
    settings: MappingStatsSettings,
) -> SimpleResult<MappingStatsSettings> {
    check_required_filename(&settings.paf_filename, "alignment")?;
    check_required_filename(&settings.ref_filename, "reference")?;
    check_required_filename(&settings.assembly_filename, "assembly")?;
    check_unit_name(&settings.sample, "Sample")?;
    check_unit_name(&settings.assembler, "Assembler")?;
    check_target_fraction(settings.l_target, "l-target")?;
    check_target_fraction(settings.n_target, "n-target")?;

    Ok(settings)
}
