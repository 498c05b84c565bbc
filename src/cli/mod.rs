mod gaps;
mod global_stats;
mod mapping_stats;
mod misassembly;
mod shared;
mod snps;
mod triple_reference;
mod utils;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use simple_error::{SimpleResult, bail};

use self::gaps::validate_and_fix_gaps_settings;
pub use self::gaps::GapsSettings;
use self::global_stats::validate_and_fix_global_stats_settings;
pub use self::global_stats::GlobalStatsSettings;
use self::mapping_stats::validate_and_fix_mapping_stats_settings;
pub use self::mapping_stats::MappingStatsSettings;
use self::misassembly::validate_and_fix_misassembly_settings;
pub use self::misassembly::MisassemblySettings;
use self::shared::validate_and_fix_shared_settings;
pub use self::shared::SharedSettings;
use self::snps::validate_and_fix_snps_settings;
pub use self::snps::SnpsSettings;
use self::triple_reference::validate_and_fix_triple_reference_settings;
pub use self::triple_reference::TripleReferenceSettings;
use self::utils::write_unit_settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize contig lengths and N bases over a whole assembly
    GlobalStats(GlobalStatsSettings),

    /// Compute coverage, identity and contig length statistics for each reference
    MappingStats(MappingStatsSettings),

    /// Classify contigs with multiple alignment blocks into misassembly types
    Misassembly(MisassemblySettings),

    /// Report reference regions not covered by any contig alignment
    Gaps(GapsSettings),

    /// Report single base substitutions between contigs and references
    Snps(SnpsSettings),

    /// Build the triplicated reference used as the alignment target for all other commands
    TripleReference(TripleReferenceSettings),
}

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::GlobalStats(x) => &x.output_dir,
            Commands::MappingStats(x) => &x.output_dir,
            Commands::Misassembly(x) => &x.output_dir,
            Commands::Gaps(x) => &x.output_dir,
            Commands::Snps(x) => &x.output_dir,
            Commands::TripleReference(x) => &x.output_dir,
        }
    }

    /// Write the settings of the selected command to its output directory
    ///
    /// Assumes that the output directory has been created
    ///
    pub fn write_command_settings(&self) {
        let output_dir = self.get_output_dir();
        match &self.command {
            Commands::GlobalStats(x) => write_unit_settings(output_dir, "global_stats", x),
            Commands::MappingStats(x) => write_unit_settings(output_dir, "mapping_stats", x),
            Commands::Misassembly(x) => write_unit_settings(output_dir, "misassembly", x),
            Commands::Gaps(x) => write_unit_settings(output_dir, "gaps", x),
            Commands::Snps(x) => write_unit_settings(output_dir, "snps", x),
            Commands::TripleReference(x) => {
                write_unit_settings(output_dir, "triple_reference", x)
            }
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{} already exists: \"{}\"", label, dirname);
    }
    Ok(())
}

/// Validate settings and update parameters that can't be processed by clap
///
pub fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::GlobalStats(x) => {
            Commands::GlobalStats(validate_and_fix_global_stats_settings(x)?)
        }
        Commands::MappingStats(x) => {
            Commands::MappingStats(validate_and_fix_mapping_stats_settings(x)?)
        }
        Commands::Misassembly(x) => {
            Commands::Misassembly(validate_and_fix_misassembly_settings(x)?)
        }
        Commands::Gaps(x) => Commands::Gaps(validate_and_fix_gaps_settings(x)?),
        Commands::Snps(x) => Commands::Snps(validate_and_fix_snps_settings(x)?),
        Commands::TripleReference(x) => {
            Commands::TripleReference(validate_and_fix_triple_reference_settings(x)?)
        }
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {}", msg);
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}
