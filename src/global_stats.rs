//! Whole-assembly statistics unit
//!

use std::io::{self, Write};

use camino::Utf8PathBuf;
use log::info;
use serde::Serialize;
use simple_error::SimpleResult;

use crate::assembly_stats::{GlobalAssemblyStats, get_global_assembly_stats};
use crate::cli::{GlobalStatsSettings, SharedSettings};
use crate::fasta_utils::read_assembly_contigs;
use crate::filenames::{GLOBAL_STATS_CSV_SUFFIX, GLOBAL_STATS_JSON_SUFFIX, get_unit_filename};
use crate::output_utils::{csv_field, write_json_file, write_text_file};

#[derive(Serialize)]
pub struct GlobalStatsReport<'a> {
    pub sample: &'a str,
    pub assembler: &'a str,
    pub stats: GlobalAssemblyStats,
}

pub fn write_global_stats_csv<W: Write>(w: &mut W, report: &GlobalStatsReport) -> io::Result<()> {
    writeln!(w, "Sample,Assembler,{}", GlobalAssemblyStats::CSV_HEADER)?;
    writeln!(
        w,
        "{},{},{}",
        csv_field(report.sample),
        csv_field(report.assembler),
        report.stats.csv_values()
    )
}

pub fn run_global_stats(
    _shared_settings: &SharedSettings,
    settings: &GlobalStatsSettings,
) -> SimpleResult<()> {
    let contigs = read_assembly_contigs(&settings.assembly_filename)?;
    let report = GlobalStatsReport {
        sample: &settings.sample,
        assembler: &settings.assembler,
        stats: get_global_assembly_stats(&contigs, settings.min_contig_len),
    };
    info!(
        "Assembly has {} contigs with {} total basepairs",
        report.stats.contigs, report.stats.basepairs
    );

    let get_filename = |suffix| -> Utf8PathBuf {
        settings.output_dir.join(get_unit_filename(
            &settings.sample,
            &settings.assembler,
            suffix,
        ))
    };
    write_text_file(
        &get_filename(GLOBAL_STATS_CSV_SUFFIX),
        "global assembly statistics table",
        |f| write_global_stats_csv(f, &report),
    )?;
    write_json_file(
        &get_filename(GLOBAL_STATS_JSON_SUFFIX),
        "global assembly statistics",
        &report,
    )?;

    Ok(())
}
