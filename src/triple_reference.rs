//! Build the triplicated reference used by all alignment-based units
//!

use std::collections::BTreeMap;
use std::io::{self, Write};

use bio::io::fasta;
use log::{error, info};
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use crate::cli::{SharedSettings, TripleReferenceSettings};
use crate::fasta_utils::{get_gc_percent, read_fasta_records};
use crate::filenames::{REFERENCE_INFO_FILENAME, TRIPLE_REFERENCE_FILENAME};
use crate::output_utils::{create_output_file, write_json_file};
use crate::reference_names::get_reference_display_name;

#[derive(Debug, PartialEq, Serialize)]
pub struct ReferenceInfo {
    pub size: i64,
    #[serde(rename = "GC")]
    pub gc: f64,
}

/// Repeat a sequence three times so that alignments can span the origin of a circular genome
///
pub fn triple_sequence(seq: &[u8]) -> Vec<u8> {
    seq.repeat(3)
}

/// Write each record with its sequence repeated three times
///
pub fn write_triplicated_fasta<W: Write>(w: W, records: &[fasta::Record]) -> io::Result<()> {
    let mut writer = fasta::Writer::new(w);
    for record in records {
        writer.write(record.id(), record.desc(), &triple_sequence(record.seq()))?;
    }
    writer.flush()
}

/// Summarize each untripled reference record, keyed on display name
///
/// A record whose display name is already taken by an earlier record is keyed on its display name
/// followed by its header.
///
pub fn get_reference_info(records: &[fasta::Record]) -> BTreeMap<String, ReferenceInfo> {
    let mut reference_info = BTreeMap::new();
    for record in records {
        let display_name = get_reference_display_name(record.id());
        let key = if reference_info.contains_key(display_name) {
            error!(
                "Reference '{}' has the same display name '{}' as an earlier reference. Its info is reported under a key including the reference header",
                record.id(),
                display_name
            );
            format!("{} ({})", display_name, record.id())
        } else {
            display_name.to_string()
        };
        reference_info.insert(
            key,
            ReferenceInfo {
                size: record.seq().len() as i64,
                gc: get_gc_percent(record.seq()),
            },
        );
    }
    reference_info
}

pub fn run_triple_reference(
    _shared_settings: &SharedSettings,
    settings: &TripleReferenceSettings,
) -> SimpleResult<()> {
    let records = read_fasta_records(&settings.ref_filename)?;
    info!(
        "Read {} reference sequences from '{}'",
        records.len(),
        settings.ref_filename
    );

    let reference_info = get_reference_info(&records);

    let filename = settings.output_dir.join(TRIPLE_REFERENCE_FILENAME);
    let f = create_output_file(&filename, "triplicated reference")?;
    try_with!(
        write_triplicated_fasta(f, &records),
        "Unable to write triplicated reference file: '{}'",
        filename
    );

    write_json_file(
        &settings.output_dir.join(REFERENCE_INFO_FILENAME),
        "reference info",
        &reference_info,
    )?;

    Ok(())
}
