//! Output filenames shared by all units
//!
//! Per-unit files are prefixed with `{sample}_{assembler}_` so that the outputs from many units
//! can be staged into a single directory by the downstream report compiler.
//!

pub const GLOBAL_STATS_JSON_SUFFIX: &str = "global_stats.json";
pub const GLOBAL_STATS_CSV_SUFFIX: &str = "global_stats.csv";

pub const MAPPING_STATS_JSON_SUFFIX: &str = "mapping_stats.json";
pub const NAX_CSV_SUFFIX: &str = "nax.csv";
pub const NGX_CSV_SUFFIX: &str = "ngx.csv";
pub const LX_CSV_SUFFIX: &str = "lx.csv";
pub const PHRED_CSV_SUFFIX: &str = "phred.csv";
pub const BREADTH_OF_COVERAGE_CSV_SUFFIX: &str = "breadth_of_coverage_contigs.csv";

pub const MISASSEMBLY_JSON_SUFFIX: &str = "misassembly.json";
pub const MISASSEMBLY_REFERENCE_JSON_SUFFIX: &str = "misassembled_reference.json";
pub const MISASSEMBLY_CSV_SUFFIX: &str = "misassembly.csv";

pub const GAPS_CSV_SUFFIX: &str = "gaps.csv";
pub const GAP_DISTANCE_JSON_SUFFIX: &str = "gap_distance.json";

pub const SNPS_CSV_SUFFIX: &str = "snps.csv";
pub const SNPS_JSON_SUFFIX: &str = "snps.json";

pub const TRIPLE_REFERENCE_FILENAME: &str = "triple_reference.fasta";
pub const REFERENCE_INFO_FILENAME: &str = "reference_info.json";

/// Get the settings filename used to record the command-line settings of one unit
///
pub fn get_settings_filename(unit_label: &str) -> String {
    format!("{unit_label}.settings.json")
}

/// Get the name of a per-unit output file
///
/// # Example
///
/// get_unit_filename("s1", "SPAdes", "gaps.csv") -> "s1_SPAdes_gaps.csv"
///
pub fn get_unit_filename(sample: &str, assembler: &str, suffix: &str) -> String {
    format!("{sample}_{assembler}_{suffix}")
}
