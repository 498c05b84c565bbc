//! Reference gaps left uncovered by the assembly
//!

use std::collections::BTreeMap;
use std::io::{self, Write};

use camino::Utf8PathBuf;
use itertools::Itertools;
use log::info;
use simple_error::{SimpleResult, try_with};

use crate::cli::{GapsSettings, SharedSettings};
use crate::fasta_utils::{ReferenceSeq, read_triplicated_reference};
use crate::filenames::{GAP_DISTANCE_JSON_SUFFIX, GAPS_CSV_SUFFIX, get_unit_filename};
use crate::output_utils::{csv_field, write_json_file, write_text_file};
use crate::paf::{AlignmentRecord, read_paf_file};
use crate::ref_coord::CoveredBases;
use crate::unit_inputs::{check_reference_spans, log_missing_references};

/// An uncovered run of reference bases, represented by the covered bases on either side
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gap {
    /// Last covered base before the gap
    pub start: i64,

    /// First covered base after the gap
    pub end: i64,
}

impl Gap {
    /// Number of uncovered bases
    pub fn size(&self) -> i64 {
        self.end - self.start - 1
    }
}

/// Find the gaps between consecutive covered positions
///
/// Positions must be unique and sorted in ascending order. Uncovered sequence before the first
/// or after the last covered position is not reported as a gap.
///
pub fn get_gaps(sorted_positions: impl IntoIterator<Item = i64>) -> Vec<Gap> {
    sorted_positions
        .into_iter()
        .tuple_windows()
        .filter(|(a, b)| *b > a + 1)
        .map(|(start, end)| Gap { start, end })
        .collect()
}

/// Distance from the end of each gap to the start of the next
///
pub fn get_gap_distances(gaps: &[Gap]) -> Vec<i64> {
    gaps.windows(2).map(|w| w[1].start - w[0].end).collect()
}

pub struct ReferenceGaps<'a> {
    pub reference: &'a ReferenceSeq,
    pub gaps: Vec<Gap>,
}

/// Get the gaps of every reference, in reference order
///
pub fn get_reference_gaps<'a>(
    references: &'a [ReferenceSeq],
    records: &[AlignmentRecord],
) -> Vec<ReferenceGaps<'a>> {
    references
        .iter()
        .map(|reference| {
            let ranges = records
                .iter()
                .filter(|x| x.reference_name == reference.header)
                .map(|x| x.target_range())
                .collect::<Vec<_>>();
            let covered_bases = CoveredBases::from_ranges(reference.true_len, &ranges);
            ReferenceGaps {
                reference,
                gaps: get_gaps(covered_bases.iter().copied()),
            }
        })
        .collect()
}

pub fn write_gaps_csv<W: Write>(
    w: &mut W,
    sample: &str,
    assembler: &str,
    reference_gaps: &[ReferenceGaps],
) -> io::Result<()> {
    writeln!(
        w,
        "Sample,Assembler,Reference,Reference Length,Gap Start,Gap End,Gap Size"
    )?;
    for ref_gaps in reference_gaps {
        for gap in ref_gaps.gaps.iter() {
            writeln!(
                w,
                "{},{},{},{},{},{},{}",
                csv_field(sample),
                csv_field(assembler),
                csv_field(&ref_gaps.reference.display_name),
                ref_gaps.reference.true_len,
                gap.start,
                gap.end,
                gap.size()
            )?;
        }
    }
    Ok(())
}

/// Nest all gap distances of the unit under its sample and assembler names
///
pub fn get_gap_distance_report(
    sample: &str,
    assembler: &str,
    reference_gaps: &[ReferenceGaps],
) -> BTreeMap<String, BTreeMap<String, Vec<i64>>> {
    let mut distances = reference_gaps
        .iter()
        .flat_map(|x| get_gap_distances(&x.gaps))
        .collect::<Vec<_>>();
    distances.sort_unstable();

    let assembler_distances = BTreeMap::from([(assembler.to_string(), distances)]);
    BTreeMap::from([(sample.to_string(), assembler_distances)])
}

pub fn run_gaps(_shared_settings: &SharedSettings, settings: &GapsSettings) -> SimpleResult<()> {
    let records = try_with!(
        read_paf_file(&settings.paf_filename),
        "Failed to parse PAF file '{}'",
        settings.paf_filename
    );
    let references = read_triplicated_reference(&settings.ref_filename)?;
    log_missing_references(&records, &references);
    check_reference_spans(&records, &references)?;

    let reference_gaps = get_reference_gaps(&references, &records);
    info!(
        "Found {} gaps over {} references",
        reference_gaps.iter().map(|x| x.gaps.len()).sum::<usize>(),
        references.len()
    );
    let gap_distance_report =
        get_gap_distance_report(&settings.sample, &settings.assembler, &reference_gaps);

    let get_filename = |suffix| -> Utf8PathBuf {
        settings.output_dir.join(get_unit_filename(
            &settings.sample,
            &settings.assembler,
            suffix,
        ))
    };
    write_text_file(&get_filename(GAPS_CSV_SUFFIX), "gap table", |f| {
        write_gaps_csv(f, &settings.sample, &settings.assembler, &reference_gaps)
    })?;
    write_json_file(
        &get_filename(GAP_DISTANCE_JSON_SUFFIX),
        "gap distances",
        &gap_distance_report,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::test_utils::{make_paf_line, make_record};

    #[test]
    fn test_get_gaps() {
        let gaps = get_gaps([0, 1, 2, 5, 6, 9]);
        assert_eq!(gaps, vec![Gap { start: 2, end: 5 }, Gap { start: 6, end: 9 }]);
        assert_eq!(gaps.iter().map(|x| x.size()).collect::<Vec<_>>(), vec![2, 2]);
        assert_eq!(get_gap_distances(&gaps), vec![1]);

        assert!(get_gaps([]).is_empty());
        assert!(get_gaps([4]).is_empty());
        assert!(get_gaps(0..10).is_empty());
    }

    #[test]
    fn test_get_reference_gaps() {
        let references = [ReferenceSeq {
            header: "Bacillus_subtilis".to_string(),
            display_name: "Bacillus subtilis".to_string(),
            true_len: 100,
            gc_percent: 43.0,
        }];

        // Covers [0,20), [40,50) and [70,100) after folding
        let records = [
            make_paf_line("c1", 30, (0, 30), '+', "Bacillus_subtilis", 100, (170, 220), 30),
            make_paf_line("c2", 10, (0, 10), '-', "Bacillus_subtilis", 100, (140, 150), 10),
            make_paf_line("c3", 10, (0, 10), '+', "other", 100, (20, 40), 10),
        ]
        .iter()
        .map(|x| make_record(x))
        .collect::<Vec<_>>();

        let reference_gaps = get_reference_gaps(&references, &records);
        assert_eq!(reference_gaps.len(), 1);
        assert_eq!(
            reference_gaps[0].gaps,
            vec![Gap { start: 19, end: 40 }, Gap { start: 49, end: 70 }]
        );

        let mut out = Vec::new();
        write_gaps_csv(&mut out, "s1", "IDBA", &reference_gaps).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "s1,IDBA,Bacillus subtilis,100,19,40,20"
        );

        let report = get_gap_distance_report("s1", "IDBA", &reference_gaps);
        assert_eq!(report["s1"]["IDBA"], vec![9]);
    }
}
