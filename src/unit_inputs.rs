//! Input handling shared by the alignment-based units
//!

use std::collections::{BTreeSet, HashMap};

use camino::Utf8Path;
use log::error;
use simple_error::{SimpleResult, bail};

use crate::fasta_utils::{ReferenceSeq, read_triplicated_reference};
use crate::paf::AlignmentRecord;

/// Log an error for each reference found in the alignments but not in the reference FASTA
///
/// Each missing reference name is reported once. Returns the set of missing names.
///
pub fn log_missing_references(
    records: &[AlignmentRecord],
    references: &[ReferenceSeq],
) -> BTreeSet<String> {
    let known = references
        .iter()
        .map(|x| x.header.as_str())
        .collect::<BTreeSet<_>>();
    let missing = records
        .iter()
        .map(|x| x.reference_name.as_str())
        .filter(|x| !known.contains(x))
        .map(|x| x.to_string())
        .collect::<BTreeSet<_>>();
    for name in missing.iter() {
        error!(
            "Alignments found to reference '{name}', which is not in the reference FASTA. These alignments will be ignored"
        );
    }
    missing
}

/// True reference length lookup for alignment records
///
/// Lengths come from the triplicated reference FASTA when one is given, and otherwise from the
/// PAF target length column.
///
#[derive(Default)]
pub struct ReferenceLengths {
    fasta_lengths: HashMap<String, i64>,
}

impl ReferenceLengths {
    pub fn from_references(references: &[ReferenceSeq]) -> Self {
        Self {
            fasta_lengths: references
                .iter()
                .map(|x| (x.header.clone(), x.true_len))
                .collect(),
        }
    }

    /// Load reference lengths from an optional triplicated reference FASTA, and report any
    /// alignments to references missing from it
    ///
    pub fn from_settings(
        ref_filename: Option<&Utf8Path>,
        records: &[AlignmentRecord],
    ) -> SimpleResult<Self> {
        match ref_filename {
            Some(filename) => {
                let references = read_triplicated_reference(filename)?;
                log_missing_references(records, &references);
                Ok(Self::from_references(&references))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn contains(&self, reference_name: &str) -> bool {
        self.fasta_lengths.contains_key(reference_name)
    }

    pub fn get_ref_len(&self, record: &AlignmentRecord) -> i64 {
        match self.fasta_lengths.get(&record.reference_name) {
            Some(&x) => x,
            None => record.true_reference_len(),
        }
    }

    /// Get the true reference length of a record, failing if the record's target does not fit
    /// three copies of that reference
    ///
    pub fn get_checked_ref_len(&self, record: &AlignmentRecord) -> SimpleResult<i64> {
        let ref_len = self.get_ref_len(record);
        check_tripled_target(record, ref_len)?;
        Ok(ref_len)
    }
}

/// Check that a record's target length and end position are consistent with an alignment to
/// three copies of a reference of length `ref_len`
///
fn check_tripled_target(record: &AlignmentRecord, ref_len: i64) -> SimpleResult<()> {
    if record.target_len != 3 * ref_len || record.target_end > record.target_len {
        bail!(
            "Alignment of contig '{}' to reference '{}' at {}-{} on a {} bp target does not fit a triplicated {} bp reference. Alignments must be made to the triplicated reference FASTA",
            record.contig_name,
            record.reference_name,
            record.target_start,
            record.target_end,
            record.target_len,
            ref_len
        );
    }
    Ok(())
}

/// Check every record aligned to one of `references` against that reference's true length
///
/// Records to references missing from the list are skipped.
///
pub fn check_reference_spans(
    records: &[AlignmentRecord],
    references: &[ReferenceSeq],
) -> SimpleResult<()> {
    let ref_lengths = ReferenceLengths::from_references(references);
    for record in records
        .iter()
        .filter(|x| ref_lengths.contains(&x.reference_name))
    {
        ref_lengths.get_checked_ref_len(record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::test_utils::{make_paf_line, make_record};

    fn make_ref(header: &str, true_len: i64) -> ReferenceSeq {
        ReferenceSeq {
            header: header.to_string(),
            display_name: header.to_string(),
            true_len,
            gc_percent: 50.0,
        }
    }

    #[test]
    fn test_reference_lengths() {
        let records = [
            make_record(&make_paf_line("c1", 100, (0, 100), '+', "r1", 1000, (0, 100), 100)),
            make_record(&make_paf_line("c2", 100, (0, 100), '+', "r2", 2000, (0, 100), 100)),
        ];

        let lengths = ReferenceLengths::default();
        assert_eq!(lengths.get_ref_len(&records[0]), 1000);

        let lengths = ReferenceLengths::from_references(&[make_ref("r1", 999)]);
        assert_eq!(lengths.get_ref_len(&records[0]), 999);
        assert_eq!(lengths.get_ref_len(&records[1]), 2000);
    }

    #[test]
    fn test_checked_ref_len() {
        let record = make_record(&make_paf_line("c1", 100, (0, 100), '+', "r1", 1000, (2900, 3000), 100));
        let lengths = ReferenceLengths::default();
        assert_eq!(lengths.get_checked_ref_len(&record).unwrap(), 1000);

        let record = make_record(&make_paf_line("c1", 500, (0, 400), '+', "r1", 100, (0, 400), 400));
        assert!(lengths.get_checked_ref_len(&record).is_err());

        let record = make_record("c1\t100\t0\t100\t+\tr1\t3001\t0\t100\t100\t100\t60");
        assert!(lengths.get_checked_ref_len(&record).is_err());
    }

    #[test]
    fn test_check_reference_spans() {
        let records = [
            make_record(&make_paf_line("c1", 100, (0, 100), '+', "r1", 1000, (0, 100), 100)),
            make_record(&make_paf_line("c2", 400, (0, 400), '+', "r2", 1000, (0, 400), 400)),
        ];
        assert!(check_reference_spans(&records, &[make_ref("r1", 1000)]).is_ok());

        // An untripled reference FASTA disagrees with the tripled alignment target
        assert!(check_reference_spans(&records, &[make_ref("r1", 1000), make_ref("r2", 100)]).is_err());
    }

    #[test]
    fn test_log_missing_references() {
        let records = [
            make_record(&make_paf_line("c1", 100, (0, 100), '+', "r1", 1000, (0, 100), 100)),
            make_record(&make_paf_line("c2", 100, (0, 100), '+', "r2", 2000, (0, 100), 100)),
            make_record(&make_paf_line("c3", 100, (0, 100), '+', "r2", 2000, (0, 100), 100)),
        ];
        let missing = log_missing_references(&records, &[make_ref("r1", 1000)]);
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["r2".to_string()]);
    }
}
