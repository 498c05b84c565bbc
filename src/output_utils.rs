//! Helpers shared by all unit output writers
//!

use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

/// Create a new text output file for buffered writing
///
/// * `label` - used to describe the file in log and error messages
///
pub fn create_output_file(filename: &Utf8Path, label: &str) -> SimpleResult<BufWriter<File>> {
    info!("Writing {label} to file: '{filename}'");
    let f = try_with!(
        File::create(filename),
        "Unable to create {} file: '{}'",
        label,
        filename
    );
    Ok(BufWriter::new(f))
}

/// Write any serializable structure out in json format
///
pub fn write_json_file<T: Serialize + ?Sized>(
    filename: &Utf8Path,
    label: &str,
    value: &T,
) -> SimpleResult<()> {
    let mut f = create_output_file(filename, label)?;
    try_with!(
        serde_json::to_writer_pretty(&mut f, value),
        "Unable to write {} json file: '{}'",
        label,
        filename
    );
    try_with!(
        f.flush(),
        "Unable to write {} json file: '{}'",
        label,
        filename
    );
    Ok(())
}

/// Create a text output file and fill it with `write_fn`
///
pub fn write_text_file(
    filename: &Utf8Path,
    label: &str,
    write_fn: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> SimpleResult<()> {
    let mut f = create_output_file(filename, label)?;
    try_with!(
        write_fn(&mut f).and_then(|_| f.flush()),
        "Unable to write {} file: '{}'",
        label,
        filename
    );
    Ok(())
}

/// Quote a csv field if it contains a separator or quote character
///
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
