//! PAF (Pairwise mApping Format) parsing
//!
//! Contig-to-reference alignments are read from minimap2 PAF output. Only the 12 mandatory
//! columns and the trailing `cs:Z:` tag are interpreted.
//!

use std::fmt;
use std::io::BufRead;
use std::num::ParseIntError;

use camino::Utf8Path;
use log::debug;

use crate::cs_tag::CS_TAG_PREFIX;
use crate::fasta_utils::open_maybe_gzip;
use crate::int_range::IntRange;

const PAF_MANDATORY_FIELD_COUNT: usize = 12;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One PAF line
///
/// Target coordinates and `target_len` are exactly as written by the aligner, so for a
/// triplicated reference they are in tripled space.
///
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentRecord {
    pub contig_name: String,
    pub contig_len: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: Strand,
    pub reference_name: String,
    pub target_len: i64,
    pub target_start: i64,
    pub target_end: i64,
    pub residue_matches: i64,
    pub alignment_block_len: i64,
    pub mapq: u8,

    /// cs tag string, including the `cs:Z:` prefix, if present as the last column
    pub cs_tag: Option<String>,
}

impl AlignmentRecord {
    pub fn query_range(&self) -> IntRange {
        IntRange::from_pair(self.query_start, self.query_end)
    }

    pub fn target_range(&self) -> IntRange {
        IntRange::from_pair(self.target_start, self.target_end)
    }

    /// True reference length, given that the aligner saw the reference three times over
    pub fn true_reference_len(&self) -> i64 {
        self.target_len / 3
    }
}

#[derive(Debug)]
pub enum PafError {
    IoError(std::io::Error),
    NotEnoughFields { line_no: usize, field_count: usize },
    InvalidField { line_no: usize, column: usize, source: ParseIntError },
    InvalidStrand { line_no: usize, value: String },
    NegativeValue { line_no: usize, column: usize },
}

impl fmt::Display for PafError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PafError::IoError(e) => write!(f, "IO error: {e}"),
            PafError::NotEnoughFields {
                line_no,
                field_count,
            } => write!(
                f,
                "Line {line_no}: expected at least {PAF_MANDATORY_FIELD_COUNT} tab-separated fields, found {field_count}"
            ),
            PafError::InvalidField {
                line_no,
                column,
                source,
            } => write!(f, "Line {line_no}: invalid value in column {column}: {source}"),
            PafError::InvalidStrand { line_no, value } => {
                write!(f, "Line {line_no}: expected '+' or '-' for strand, found '{value}'")
            }
            PafError::NegativeValue { line_no, column } => {
                write!(f, "Line {line_no}: negative value in column {column}")
            }
        }
    }
}

impl std::error::Error for PafError {}

/// Parse a single PAF line
///
/// `line_no` is 1-indexed and only used for error messages
///
pub fn parse_paf_line(line: &str, line_no: usize) -> Result<AlignmentRecord, PafError> {
    let fields = line.split('\t').collect::<Vec<_>>();
    if fields.len() < PAF_MANDATORY_FIELD_COUNT {
        return Err(PafError::NotEnoughFields {
            line_no,
            field_count: fields.len(),
        });
    }

    // Columns are reported 1-indexed to match the PAF format description
    let parse_int = |index: usize| -> Result<i64, PafError> {
        fields[index]
            .parse::<i64>()
            .map_err(|source| PafError::InvalidField {
                line_no,
                column: index + 1,
                source,
            })
    };

    let strand = match fields[4] {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        x => {
            return Err(PafError::InvalidStrand {
                line_no,
                value: x.to_string(),
            });
        }
    };

    let mapq = fields[11]
        .parse::<u8>()
        .map_err(|source| PafError::InvalidField {
            line_no,
            column: 12,
            source,
        })?;

    let cs_tag = fields
        .iter()
        .skip(PAF_MANDATORY_FIELD_COUNT)
        .last()
        .filter(|x| x.starts_with(CS_TAG_PREFIX))
        .map(|x| x.to_string());

    let record = AlignmentRecord {
        contig_name: fields[0].to_string(),
        contig_len: parse_int(1)?,
        query_start: parse_int(2)?,
        query_end: parse_int(3)?,
        strand,
        reference_name: fields[5].to_string(),
        target_len: parse_int(6)?,
        target_start: parse_int(7)?,
        target_end: parse_int(8)?,
        residue_matches: parse_int(9)?,
        alignment_block_len: parse_int(10)?,
        mapq,
        cs_tag,
    };

    let negative_column = [
        (2, record.contig_len),
        (3, record.query_start),
        (4, record.query_end),
        (7, record.target_len),
        (8, record.target_start),
        (9, record.target_end),
        (10, record.residue_matches),
        (11, record.alignment_block_len),
    ]
    .into_iter()
    .find(|(_, x)| *x < 0);
    if let Some((column, _)) = negative_column {
        return Err(PafError::NegativeValue { line_no, column });
    }

    Ok(record)
}

/// Parse all records from a PAF reader
///
/// Empty lines are skipped, any other malformed line fails the whole parse.
///
pub fn parse_paf<R: BufRead>(reader: R) -> Result<Vec<AlignmentRecord>, PafError> {
    let mut records = Vec::new();
    for (line_index, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(PafError::IoError)?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        records.push(parse_paf_line(line, line_index + 1)?);
    }
    Ok(records)
}

/// Read all records from a plain or gzip-compressed PAF file
///
pub fn read_paf_file(filename: &Utf8Path) -> Result<Vec<AlignmentRecord>, PafError> {
    debug!("Reading alignment records from PAF file '{filename}'");
    let reader = open_maybe_gzip(filename).map_err(PafError::IoError)?;
    let records = parse_paf(reader)?;
    debug!(
        "Read {} alignment records, {} with mapping quality 0",
        records.len(),
        records.iter().filter(|x| x.mapq == 0).count()
    );
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_paf_line() {
        let line = "k141_878\t5000\t10\t4010\t-\tSalmonella_enterica\t14820000\t100\t4100\t3990\t4000\t60\ttp:A:P\tcs:Z::3990";
        let record = parse_paf_line(line, 1).unwrap();
        assert_eq!(record.contig_name, "k141_878");
        assert_eq!(record.contig_len, 5000);
        assert_eq!(record.query_range(), IntRange::from_pair(10, 4010));
        assert_eq!(record.strand, Strand::Reverse);
        assert_eq!(record.reference_name, "Salmonella_enterica");
        assert_eq!(record.true_reference_len(), 4940000);
        assert_eq!(record.target_range(), IntRange::from_pair(100, 4100));
        assert_eq!(record.residue_matches, 3990);
        assert_eq!(record.alignment_block_len, 4000);
        assert_eq!(record.mapq, 60);
        assert_eq!(record.cs_tag.as_deref(), Some("cs:Z::3990"));
    }

    #[test]
    fn test_parse_paf_line_without_cs_tag() {
        let line = "seq1\t100\t0\t100\t+\tseq2\t300\t0\t100\t100\t100\t255";
        let record = parse_paf_line(line, 1).unwrap();
        assert_eq!(record.cs_tag, None);
    }

    #[test]
    fn test_parse_paf_line_not_enough_fields() {
        let line = "seq1\t100\t0\t100\t+\tseq2\t300\t0\t100\t100";
        let err = parse_paf_line(line, 7).unwrap_err();
        assert!(matches!(
            err,
            PafError::NotEnoughFields {
                line_no: 7,
                field_count: 10
            }
        ));
    }

    #[test]
    fn test_parse_paf_line_invalid_field() {
        // 'z' in the target start field
        let line = "seq1\t100\t0\t100\t+\tseq2\t300\tz\t100\t60\t100\t255";
        let err = parse_paf_line(line, 1).unwrap_err();
        assert!(matches!(err, PafError::InvalidField { column: 8, .. }));

        let line = "seq1\t100\t0\t100\t+\tseq2\t300\t-5\t100\t60\t100\t255";
        let err = parse_paf_line(line, 1).unwrap_err();
        assert!(matches!(
            err,
            PafError::NegativeValue {
                line_no: 1,
                column: 8
            }
        ));
    }

    #[test]
    fn test_parse_paf_line_invalid_strand() {
        let line = "seq1\t100\t0\t100\t.\tseq2\t300\t0\t100\t60\t100\t255";
        assert!(matches!(
            parse_paf_line(line, 1),
            Err(PafError::InvalidStrand { .. })
        ));
    }

    #[test]
    fn test_parse_paf_reports_line_number() {
        let data = "seq1\t100\t0\t100\t+\tseq2\t300\t0\t100\t100\t100\t255\n\nseq3\t100\n";
        let err = parse_paf(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, PafError::NotEnoughFields { line_no: 3, .. }));
    }

    #[test]
    fn test_read_paf_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seq1\t100\t0\t100\t+\tref1\t300\t0\t100\t100\t100\t255").unwrap();
        writeln!(file, "seq2\t50\t0\t50\t-\tref2\t600\t10\t60\t48\t50\t11").unwrap();
        file.flush().unwrap();

        let filename = Utf8Path::from_path(file.path()).unwrap();
        let records = read_paf_file(filename).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].reference_name, "ref2");
        assert_eq!(records[1].strand, Strand::Reverse);
    }
}
