//! FASTA input for assemblies and triplicated references
//!

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use bio::io::fasta;
use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use log::debug;
use simple_error::{SimpleResult, simple_error};

use crate::reference_names::get_reference_display_name;

/// Open a text file for buffered reading, transparently decompressing it if the filename ends
/// in `.gz`
///
pub fn open_maybe_gzip(filename: &Utf8Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(filename)?;
    let reader: Box<dyn BufRead> = if filename.extension() == Some("gz") {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Summary of one assembled contig
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyContig {
    pub name: String,
    pub len: i64,

    /// Count of 'N' or 'n' bases in the contig
    pub n_count: i64,
}

/// Summary of one triplicated reference sequence
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSeq {
    /// Sequence id as found in the FASTA header, which is also the PAF target name
    pub header: String,
    pub display_name: String,

    /// Length of the reference before it was triplicated
    pub true_len: i64,

    pub gc_percent: f64,
}

fn count_n_bases(seq: &[u8]) -> i64 {
    seq.iter().filter(|x| x.eq_ignore_ascii_case(&b'N')).count() as i64
}

/// Percentage of G and C bases over the full sequence length
pub fn get_gc_percent(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc_count = seq
        .iter()
        .filter(|x| matches!(x.to_ascii_uppercase(), b'G' | b'C'))
        .count();
    gc_count as f64 * 100.0 / seq.len() as f64
}

/// Run `f` on every record of a plain or gzip-compressed FASTA file
///
fn for_each_fasta_record(
    filename: &Utf8Path,
    label: &str,
    mut f: impl FnMut(fasta::Record),
) -> SimpleResult<()> {
    let reader = open_maybe_gzip(filename)
        .map_err(|e| simple_error!("Unable to open {} fasta file '{}': {}", label, filename, e))?;
    for result in fasta::Reader::from_bufread(reader).records() {
        let record = result.map_err(|e| {
            simple_error!(
                "Error during {} fasta record parsing in '{}': {}",
                label,
                filename,
                e
            )
        })?;
        f(record);
    }
    Ok(())
}

/// Read the name, length and N-base count of every contig in an assembly
///
pub fn read_assembly_contigs(filename: &Utf8Path) -> SimpleResult<Vec<AssemblyContig>> {
    let mut contigs = Vec::new();
    for_each_fasta_record(filename, "assembly", |record| {
        contigs.push(AssemblyContig {
            name: record.id().to_string(),
            len: record.seq().len() as i64,
            n_count: count_n_bases(record.seq()),
        });
    })?;
    debug!("Read {} contigs from assembly '{filename}'", contigs.len());
    Ok(contigs)
}

/// Read all records of a triplicated reference
///
/// Records are returned in file order, which is also the reporting order for all per-reference
/// output.
///
pub fn read_triplicated_reference(filename: &Utf8Path) -> SimpleResult<Vec<ReferenceSeq>> {
    let mut refs = Vec::new();
    for_each_fasta_record(filename, "reference", |record| {
        refs.push(ReferenceSeq {
            header: record.id().to_string(),
            display_name: get_reference_display_name(record.id()).to_string(),
            true_len: record.seq().len() as i64 / 3,
            gc_percent: get_gc_percent(record.seq()),
        });
    })?;
    debug!("Read {} references from '{filename}'", refs.len());
    Ok(refs)
}

/// Read all records of a reference FASTA file, keeping the full sequence
///
pub fn read_fasta_records(filename: &Utf8Path) -> SimpleResult<Vec<fasta::Record>> {
    let mut records = Vec::new();
    for_each_fasta_record(filename, "reference", |record| records.push(record))?;
    Ok(records)
}
