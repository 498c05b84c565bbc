mod alignment_set;
mod assembly_stats;
mod cli;
mod coverage_metrics;
mod cs_tag;
mod fasta_utils;
mod filenames;
mod gaps;
mod global_stats;
mod globals;
mod int_range;
mod logger;
mod mapping_stats;
mod misassembly;
mod os_utils;
mod output_utils;
mod paf;
mod ref_coord;
mod reference_names;
mod snps;
mod triple_reference;
mod unit_inputs;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::cli::Commands;
use crate::gaps::run_gaps;
use crate::global_stats::run_global_stats;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;
use crate::mapping_stats::run_mapping_stats;
use crate::misassembly::run_misassembly;
use crate::snps::run_snps;
use crate::triple_reference::run_triple_reference;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    settings.write_command_settings();

    let shared = &settings.shared;
    match &settings.command {
        Commands::GlobalStats(x) => run_global_stats(shared, x)?,
        Commands::MappingStats(x) => run_mapping_stats(shared, x)?,
        Commands::Misassembly(x) => run_misassembly(shared, x)?,
        Commands::Gaps(x) => run_gaps(shared, x)?,
        Commands::Snps(x) => run_snps(shared, x)?,
        Commands::TripleReference(x) => run_triple_reference(shared, x)?,
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        process::exit(2);
    }
}
