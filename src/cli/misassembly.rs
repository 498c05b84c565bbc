use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::{SimpleResult, bail};

use super::utils::{check_optional_filename, check_required_filename, check_unit_name};
use crate::misassembly::MisassemblyThresholds;

#[derive(Args, Serialize)]
pub struct MisassemblySettings {
    /// Directory for all misassembly command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_misassembly_output"))]
    pub output_dir: Utf8PathBuf,

    /// Contig to triplicated reference alignments in PAF format
    #[arg(long = "paf", value_name = "FILE")]
    pub paf_filename: Utf8PathBuf,

    /// Triplicated reference in FASTA format
    ///
    /// When this is not provided, reference lengths are taken from the PAF target length column.
    ///
    #[arg(long = "ref", value_name = "FILE")]
    pub ref_filename: Option<Utf8PathBuf>,

    /// Sample name used to label all output
    #[arg(long)]
    pub sample: String,

    /// Assembler name used to label all output
    #[arg(long)]
    pub assembler: String,

    /// Gaps between alignment blocks must be larger than this to be classified as an indel
    #[arg(hide = true, long, default_value_t = 50)]
    pub min_indel_distance: i64,

    /// Reference gaps between alignment blocks larger than this are classified as a
    /// translocation instead of a deletion
    #[arg(hide = true, long, default_value_t = 1000)]
    pub max_deletion_distance: i64,
}

impl MisassemblySettings {
    pub fn get_thresholds(&self) -> MisassemblyThresholds {
        MisassemblyThresholds {
            min_indel_distance: self.min_indel_distance,
            max_deletion_distance: self.max_deletion_distance,
        }
    }
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_misassembly_settings(
    settings: MisassemblySettings,
) -> SimpleResult<MisassemblySettings> {
    check_required_filename(&settings.paf_filename, "alignment")?;
    check_optional_filename(settings.ref_filename.as_deref(), "reference")?;
    check_unit_name(&settings.sample, "Sample")?;
    check_unit_name(&settings.assembler, "Assembler")?;

    if settings.min_indel_distance < 0 {
        bail!("--min-indel-distance argument can't be negative");
    }
    if settings.max_deletion_distance < settings.min_indel_distance {
        bail!(
            "--max-deletion-distance is set below the minimum indel distance of {}",
            settings.min_indel_distance
        );
    }

    Ok(settings)
}
