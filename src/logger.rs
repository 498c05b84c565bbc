//! Methods specific to the asmqc logger
//!

use camino::{Utf8Path, Utf8PathBuf};

use crate::cli;
use crate::globals::PROGRAM_NAME;
use crate::os_utils::create_dir_all;

/// Log filename written into each unit output directory
fn get_log_filename(output_dir: &Utf8Path) -> Utf8PathBuf {
    output_dir.join(PROGRAM_NAME.to_string() + ".log")
}

/// If debug is true set the default logger to the more verbose debug level
///
fn setup_logger(output_dir: &Utf8Path, debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(fern::log_file(get_log_filename(output_dir))?)
        .apply()?;
    Ok(())
}

/// No logger is available yet, so this follows the command-line validation error pattern
fn exit_with_usage(msg: impl std::fmt::Display) -> ! {
    eprintln!("Invalid command-line setting: {}", msg);
    std::process::exit(exitcode::USAGE);
}

/// Check and create the unit output directory, then setup logger to write there
///
/// #Arguments
/// * `clobber` - If true, an existing output directory is reused
/// * `debug` - If true use debug log level, and info level otherwise
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    if let Err(msg) = cli::check_novel_dirname(output_dir, "Output directory") {
        if !clobber {
            exit_with_usage(msg);
        }
    };
    if let Err(msg) = create_dir_all(output_dir, "output") {
        exit_with_usage(msg);
    }
    if let Err(err) = setup_logger(output_dir, debug) {
        eprintln!("Unable to setup logger: {}", err);
        std::process::exit(exitcode::CANTCREAT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_filename() {
        assert_eq!(
            get_log_filename(Utf8Path::new("out")).as_str(),
            "out/asmqc.log"
        );
    }
}
