//! Misassembly detection and classification
//!
//! Any contig broken into two or more alignment blocks is a misassembly candidate. Candidates
//! aligned to more than one reference are chimeras. All other candidates are labeled by a table of
//! independent rules over the distances between consecutive blocks.
//!

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Write};

use camino::Utf8PathBuf;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use crate::alignment_set::{AlignmentBlock, ContigAlignment, group_blocks_by_contig};
use crate::cli::{MisassemblySettings, SharedSettings};
use crate::filenames::{
    MISASSEMBLY_CSV_SUFFIX, MISASSEMBLY_JSON_SUFFIX, MISASSEMBLY_REFERENCE_JSON_SUFFIX,
    get_unit_filename,
};
use crate::int_range::{IntRange, get_int_range_gap};
use crate::output_utils::{csv_field, write_json_file, write_text_file};
use crate::paf::{AlignmentRecord, Strand, read_paf_file};
use crate::reference_names::get_reference_display_name;
use crate::unit_inputs::ReferenceLengths;

#[derive(Clone, Debug, Eq, PartialEq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MisassemblyType {
    /// Blocks align to more than one reference, holding the names of all references
    Chimera(BTreeSet<String>),
    Inversion,
    Translocation,
    Insertion,
    Deletion,
    Duplication,
    Rearrangement,
    Inconsistency,
}

impl fmt::Display for MisassemblyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MisassemblyType::Chimera(refs) => {
                write!(f, "{} {{{}}}", self.as_ref(), refs.iter().join(", "))
            }
            _ => f.write_str(self.as_ref()),
        }
    }
}

/// Distance thresholds for the misassembly rules
///
#[derive(Clone, Debug)]
pub struct MisassemblyThresholds {
    /// Gaps between blocks larger than this are large enough to be called as an indel
    pub min_indel_distance: i64,

    /// Reference gaps larger than this are called as a translocation instead of a deletion
    pub max_deletion_distance: i64,
}

impl Default for MisassemblyThresholds {
    fn default() -> Self {
        Self {
            min_indel_distance: 50,
            max_deletion_distance: 1000,
        }
    }
}

/// Distances between consecutive alignment blocks of one contig
///
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDistances {
    /// Gaps between consecutive blocks after sorting on reference start
    pub ref_gaps: Vec<i64>,

    /// Gaps between consecutive blocks after sorting on contig start
    pub contig_gaps: Vec<i64>,

    /// For each block in its original order, its rank among the blocks sorted on reference start
    pub ref_order: Vec<usize>,
}

fn sort_by_start(ranges: &[IntRange]) -> Vec<IntRange> {
    let mut x = ranges.to_vec();
    x.sort_by_key(|x| x.start);
    x
}

fn get_consecutive_gaps(sorted_ranges: &[IntRange]) -> Vec<i64> {
    sorted_ranges
        .windows(2)
        .map(|w| get_int_range_gap(&w[0], &w[1]))
        .collect()
}

impl BlockDistances {
    pub fn new(ref_ranges: &[IntRange], contig_ranges: &[IntRange]) -> Self {
        let sorted_ref_ranges = sort_by_start(ref_ranges);
        let sorted_contig_ranges = sort_by_start(contig_ranges);

        // Identical ranges share the rank of their first sorted position
        let ref_order = ref_ranges
            .iter()
            .map(|x| sorted_ref_ranges.iter().position(|y| y == x).unwrap_or(0))
            .collect();

        Self {
            ref_gaps: get_consecutive_gaps(&sorted_ref_ranges),
            contig_gaps: get_consecutive_gaps(&sorted_contig_ranges),
            ref_order,
        }
    }

    fn any_ref_gap(&self, f: impl Fn(i64) -> bool) -> bool {
        self.ref_gaps.iter().any(|&x| f(x))
    }

    fn any_contig_gap(&self, f: impl Fn(i64) -> bool) -> bool {
        self.contig_gaps.iter().any(|&x| f(x))
    }

    fn is_ref_order_sorted(&self) -> bool {
        self.ref_order.windows(2).all(|w| w[0] <= w[1])
    }
}

type MisassemblyRule = fn(&BlockDistances, &MisassemblyThresholds) -> bool;

/// Rules applied to contigs aligned to a single reference, in label order
///
fn get_distance_rules() -> [(MisassemblyType, MisassemblyRule); 5] {
    [
        (MisassemblyType::Translocation, |d, t| {
            d.any_ref_gap(|x| x > t.max_deletion_distance)
        }),
        (MisassemblyType::Insertion, |d, t| {
            d.any_contig_gap(|x| x > t.min_indel_distance)
        }),
        (MisassemblyType::Deletion, |d, t| {
            d.any_ref_gap(|x| x > t.min_indel_distance && x <= t.max_deletion_distance)
                && d.any_contig_gap(|x| x <= 0)
        }),
        (MisassemblyType::Duplication, |d, _| {
            d.any_ref_gap(|x| x < 0) && d.any_contig_gap(|x| x <= 0)
        }),
        (MisassemblyType::Rearrangement, |d, _| {
            !d.is_ref_order_sorted()
        }),
    ]
}

/// Classification of one misassembled contig
///
#[derive(Clone, Debug)]
pub struct MisassemblyRecord {
    pub contig_name: String,
    pub contig_len: i64,

    /// Never empty
    pub labels: Vec<MisassemblyType>,

    /// Blocks of the contig in PAF order
    pub blocks: Vec<AlignmentBlock>,

    /// Block distances, which are left empty for chimeras
    pub distances: BlockDistances,

    pub references: BTreeSet<String>,
    pub strands: BTreeSet<Strand>,

    /// Canonical reference block ranges in PAF order
    pub ref_ranges: Vec<IntRange>,
    pub sorted_ref_ranges: Vec<IntRange>,

    /// Contig block ranges in PAF order
    pub contig_ranges: Vec<IntRange>,
    pub sorted_contig_ranges: Vec<IntRange>,
}

impl MisassemblyRecord {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn labels_string(&self) -> String {
        self.labels.iter().join("; ")
    }
}

/// Classify a contig with at least two alignment blocks
///
pub fn classify_contig(
    contig: &ContigAlignment,
    thresholds: &MisassemblyThresholds,
) -> MisassemblyRecord {
    let references = contig
        .blocks
        .iter()
        .map(|x| x.reference_name.clone())
        .collect::<BTreeSet<_>>();
    let strands = contig.blocks.iter().map(|x| x.strand).collect::<BTreeSet<_>>();
    let ref_ranges = contig.blocks.iter().map(|x| x.ref_range).collect::<Vec<_>>();
    let contig_ranges = contig
        .blocks
        .iter()
        .map(|x| x.contig_range)
        .collect::<Vec<_>>();

    let mut labels = Vec::new();
    let distances = if references.len() > 1 {
        labels.push(MisassemblyType::Chimera(references.clone()));
        BlockDistances {
            ref_gaps: Vec::new(),
            contig_gaps: Vec::new(),
            ref_order: Vec::new(),
        }
    } else {
        if strands.len() > 1 {
            labels.push(MisassemblyType::Inversion);
        }
        let distances = BlockDistances::new(&ref_ranges, &contig_ranges);
        for (label, rule) in get_distance_rules() {
            if rule(&distances, thresholds) {
                labels.push(label);
            }
        }
        distances
    };

    if labels.is_empty() {
        labels.push(MisassemblyType::Inconsistency);
    }

    MisassemblyRecord {
        contig_name: contig.name.clone(),
        contig_len: contig.len,
        labels,
        blocks: contig.blocks.clone(),
        distances,
        references,
        strands,
        sorted_ref_ranges: sort_by_start(&ref_ranges),
        ref_ranges,
        sorted_contig_ranges: sort_by_start(&contig_ranges),
        contig_ranges,
    }
}

/// Classify every contig broken into more than one alignment block
///
/// Records are returned in order of the contig's first appearance in the input.
///
pub fn classify_misassemblies(
    contigs: &[ContigAlignment],
    thresholds: &MisassemblyThresholds,
) -> Vec<MisassemblyRecord> {
    let records = contigs
        .iter()
        .filter(|x| x.block_count() > 1)
        .map(|x| classify_contig(x, thresholds))
        .collect::<Vec<_>>();
    for record in records.iter() {
        debug!(
            "Contig '{}' length {} with {} blocks over references {:?}: {}",
            record.contig_name,
            record.contig_len,
            record.block_count(),
            record.references,
            record.labels_string()
        );
    }
    records
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MisassemblyCounts {
    pub misassembled_contigs: usize,
    pub misassembly_events: usize,
}

impl MisassemblyCounts {
    fn add_record(&mut self, record: &MisassemblyRecord) {
        self.misassembled_contigs += 1;
        self.misassembly_events += record.labels.len();
    }
}

#[derive(Debug, Serialize)]
pub struct MisassemblySummary {
    pub sample: String,
    pub assembler: String,
    #[serde(flatten)]
    pub counts: MisassemblyCounts,
}

#[derive(Debug, Serialize)]
pub struct ReferenceMisassemblySummary {
    pub sample: String,
    pub assembler: String,

    /// Counts keyed on reference display name
    pub reference: BTreeMap<String, MisassemblyCounts>,
}

pub fn get_misassembly_counts(records: &[MisassemblyRecord]) -> MisassemblyCounts {
    let mut counts = MisassemblyCounts::default();
    for record in records {
        counts.add_record(record);
    }
    counts
}

/// Misassembly counts for each reference
///
/// A record touching several references is counted once for each of them.
///
pub fn get_reference_misassembly_counts(
    records: &[MisassemblyRecord],
) -> BTreeMap<String, MisassemblyCounts> {
    let mut counts = BTreeMap::<String, MisassemblyCounts>::new();
    for record in records {
        for reference in record.references.iter() {
            counts
                .entry(get_reference_display_name(reference).to_string())
                .or_default()
                .add_record(record);
        }
    }
    counts
}

/// Write one csv row per alignment block of each misassembled contig
///
pub fn write_misassembly_blocks_csv<W: Write>(
    w: &mut W,
    sample: &str,
    assembler: &str,
    records: &[MisassemblyRecord],
) -> io::Result<()> {
    writeln!(
        w,
        "Contig,Sample,Reference,Ref Start,Ref End,Misassembly,Assembler,Reference Length"
    )?;
    for record in records {
        let labels = csv_field(&record.labels_string());
        for block in record.blocks.iter() {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{}",
                csv_field(&record.contig_name),
                csv_field(sample),
                csv_field(get_reference_display_name(&block.reference_name)),
                block.ref_range.start,
                block.ref_range.end,
                labels,
                csv_field(assembler),
                block.ref_len,
            )?;
        }
    }
    Ok(())
}

/// Build alignment blocks for all records, grouped by contig
///
/// Fails if any record's target does not fit three copies of its reference.
///
pub fn get_contig_alignments(
    records: &[AlignmentRecord],
    ref_lengths: &ReferenceLengths,
) -> SimpleResult<Vec<ContigAlignment>> {
    let mut blocks = Vec::new();
    for record in records {
        let ref_len = ref_lengths.get_checked_ref_len(record)?;
        blocks.push((AlignmentBlock::from_record(record, ref_len), record.contig_len));
    }
    Ok(group_blocks_by_contig(blocks))
}

pub fn run_misassembly(
    _shared_settings: &SharedSettings,
    settings: &MisassemblySettings,
) -> SimpleResult<()> {
    let records = try_with!(
        read_paf_file(&settings.paf_filename),
        "Failed to parse PAF file '{}'",
        settings.paf_filename
    );
    let ref_lengths = ReferenceLengths::from_settings(settings.ref_filename.as_deref(), &records)?;

    let contigs = get_contig_alignments(&records, &ref_lengths)?;
    let mis_records = classify_misassemblies(&contigs, &settings.get_thresholds());

    let summary = MisassemblySummary {
        sample: settings.sample.clone(),
        assembler: settings.assembler.clone(),
        counts: get_misassembly_counts(&mis_records),
    };
    let ref_summary = ReferenceMisassemblySummary {
        sample: settings.sample.clone(),
        assembler: settings.assembler.clone(),
        reference: get_reference_misassembly_counts(&mis_records),
    };
    info!(
        "Found {} misassembled contigs with {} misassembly events",
        summary.counts.misassembled_contigs, summary.counts.misassembly_events
    );

    let output_dir = settings.output_dir.as_path();
    let get_filename = |suffix| -> Utf8PathBuf {
        output_dir.join(get_unit_filename(
            &settings.sample,
            &settings.assembler,
            suffix,
        ))
    };
    write_text_file(
        &get_filename(MISASSEMBLY_CSV_SUFFIX),
        "misassembly block table",
        |f| write_misassembly_blocks_csv(f, &settings.sample, &settings.assembler, &mis_records),
    )?;
    write_json_file(
        &get_filename(MISASSEMBLY_REFERENCE_JSON_SUFFIX),
        "per-reference misassembly summary",
        &ref_summary,
    )?;
    write_json_file(
        &get_filename(MISASSEMBLY_JSON_SUFFIX),
        "misassembly summary",
        &summary,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::test_utils::{make_paf_line, make_record};

    fn make_block(
        reference: &str,
        strand: Strand,
        contig: (i64, i64),
        reference_range: (i64, i64),
    ) -> AlignmentBlock {
        AlignmentBlock {
            contig_name: "c1".to_string(),
            reference_name: reference.to_string(),
            strand,
            contig_range: IntRange::from_pair(contig.0, contig.1),
            ref_range: IntRange::from_pair(reference_range.0, reference_range.1),
            tripled_ref_range: IntRange::from_pair(reference_range.0, reference_range.1),
            ref_len: 100_000,
            matches: contig.1 - contig.0,
        }
    }

    fn make_contig(blocks: Vec<AlignmentBlock>) -> ContigAlignment {
        let mut contig = ContigAlignment::new("c1", 20_000);
        contig.blocks = blocks;
        contig
    }

    fn classify(blocks: Vec<AlignmentBlock>) -> MisassemblyRecord {
        classify_contig(&make_contig(blocks), &MisassemblyThresholds::default())
    }

    #[test]
    fn test_single_block_contig_not_classified() {
        let contigs = vec![
            make_contig(vec![make_block("r1", Strand::Forward, (0, 1000), (0, 1000))]),
            make_contig(vec![
                make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
                make_block("r1", Strand::Forward, (1000, 2000), (2500, 3500)),
            ]),
        ];
        let records = classify_misassemblies(&contigs, &MisassemblyThresholds::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].block_count(), 2);
    }

    #[test]
    fn test_translocation() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1000, 2000), (2500, 3500)),
        ]);
        assert_eq!(record.labels, vec![MisassemblyType::Translocation]);
        assert_eq!(record.distances.ref_gaps, vec![1500]);
        assert_eq!(record.distances.contig_gaps, vec![0]);
    }

    #[test]
    fn test_classify_from_paf_lines() {
        let records = [
            make_paf_line("c1", 2000, (0, 1000), '+', "r1", 10_000, (10_500, 11_500), 1000),
            make_paf_line("c1", 2000, (1000, 2000), '+', "r1", 10_000, (3000, 4000), 1000),
            make_paf_line("c2", 800, (0, 800), '+', "r1", 10_000, (5000, 5800), 800),
        ]
        .iter()
        .map(|x| make_record(x))
        .collect::<Vec<_>>();

        let contigs = get_contig_alignments(&records, &ReferenceLengths::default()).unwrap();
        assert_eq!(contigs.len(), 2);
        assert_eq!(contigs[0].blocks[0].ref_range, IntRange::from_pair(500, 1500));

        let mis_records = classify_misassemblies(&contigs, &MisassemblyThresholds::default());
        assert_eq!(mis_records.len(), 1);
        assert_eq!(mis_records[0].contig_name, "c1");
        assert_eq!(mis_records[0].labels, vec![MisassemblyType::Translocation]);
        assert_eq!(mis_records[0].distances.ref_gaps, vec![1500]);
        assert_eq!(mis_records[0].distances.contig_gaps, vec![0]);
    }

    #[test]
    fn test_contig_alignments_reject_untripled_target() {
        let records = [make_record(&make_paf_line(
            "c1",
            2000,
            (0, 1000),
            '+',
            "r1",
            100,
            (0, 1000),
            1000,
        ))];
        assert!(get_contig_alignments(&records, &ReferenceLengths::default()).is_err());
    }

    #[test]
    fn test_chimera_is_exclusive() {
        // Opposite strands and a large gap would otherwise add more labels
        let record = classify(vec![
            make_block("Escherichia_coli", Strand::Forward, (0, 1000), (0, 1000)),
            make_block(
                "Escherichia_coli_plasmid",
                Strand::Reverse,
                (1000, 2000),
                (5000, 6000),
            ),
        ]);
        assert_eq!(record.labels.len(), 1);
        let refs = ["Escherichia_coli", "Escherichia_coli_plasmid"]
            .iter()
            .map(|x| x.to_string())
            .collect::<BTreeSet<_>>();
        assert_eq!(record.labels[0], MisassemblyType::Chimera(refs));
        assert_eq!(
            record.labels[0].to_string(),
            "chimera {Escherichia_coli, Escherichia_coli_plasmid}"
        );
        assert!(record.distances.ref_gaps.is_empty());
        assert_eq!(record.references.len(), 2);
    }

    #[test]
    fn test_inversion() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Reverse, (1000, 2000), (1000, 2000)),
        ]);
        assert!(record.labels.contains(&MisassemblyType::Inversion));
        assert_eq!(record.strands.len(), 2);
    }

    #[test]
    fn test_duplication() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1000, 2000), (500, 1500)),
        ]);
        assert_eq!(record.distances.ref_gaps, vec![-500]);
        assert!(record.labels.contains(&MisassemblyType::Duplication));
    }

    #[test]
    fn test_insertion_and_deletion() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1100, 2000), (1100, 2000)),
        ]);
        assert_eq!(record.labels, vec![MisassemblyType::Insertion]);

        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1000, 2000), (1200, 2200)),
        ]);
        assert_eq!(record.labels, vec![MisassemblyType::Deletion]);

        // Reference gap at the top of the deletion range
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1000, 2000), (2000, 3000)),
        ]);
        assert_eq!(record.labels, vec![MisassemblyType::Deletion]);
    }

    #[test]
    fn test_rearrangement() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (1000, 2000)),
            make_block("r1", Strand::Forward, (1000, 2000), (0, 1000)),
        ]);
        assert_eq!(record.distances.ref_order, vec![1, 0]);
        assert_eq!(record.labels, vec![MisassemblyType::Rearrangement]);
    }

    #[test]
    fn test_inconsistency() {
        let record = classify(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1010, 2000), (1020, 2000)),
        ]);
        assert_eq!(record.labels, vec![MisassemblyType::Inconsistency]);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = MisassemblyThresholds {
            min_indel_distance: 5,
            max_deletion_distance: 15,
        };
        let contig = make_contig(vec![
            make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("r1", Strand::Forward, (1010, 2000), (1020, 2000)),
        ]);
        let record = classify_contig(&contig, &thresholds);
        assert_eq!(
            record.labels,
            vec![MisassemblyType::Translocation, MisassemblyType::Insertion]
        );
    }

    #[test]
    fn test_misassembly_counts() {
        let records = vec![
            classify(vec![
                make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
                make_block("r2", Strand::Forward, (1000, 2000), (0, 1000)),
            ]),
            classify(vec![
                make_block("r1", Strand::Forward, (0, 1000), (0, 1000)),
                make_block("r1", Strand::Reverse, (1100, 2000), (3000, 4000)),
            ]),
        ];

        assert_eq!(
            get_misassembly_counts(&records),
            MisassemblyCounts {
                misassembled_contigs: 2,
                misassembly_events: 4,
            }
        );

        let ref_counts = get_reference_misassembly_counts(&records);
        assert_eq!(ref_counts.len(), 2);
        assert_eq!(ref_counts["r1"].misassembled_contigs, 2);
        assert_eq!(ref_counts["r1"].misassembly_events, 4);
        assert_eq!(ref_counts["r2"].misassembled_contigs, 1);
        assert_eq!(ref_counts["r2"].misassembly_events, 1);
    }

    #[test]
    fn test_summary_json() {
        let summary = MisassemblySummary {
            sample: "s1".to_string(),
            assembler: "SPAdes".to_string(),
            counts: MisassemblyCounts {
                misassembled_contigs: 3,
                misassembly_events: 5,
            },
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "sample": "s1",
                "assembler": "SPAdes",
                "misassembled_contigs": 3,
                "misassembly_events": 5,
            })
        );
    }

    #[test]
    fn test_write_misassembly_blocks_csv() {
        let records = vec![classify(vec![
            make_block("Escherichia_coli", Strand::Forward, (0, 1000), (0, 1000)),
            make_block("Bacillus_subtilis", Strand::Forward, (1000, 2000), (0, 1000)),
        ])];
        let mut out = Vec::new();
        write_misassembly_blocks_csv(&mut out, "s1", "MEGAHIT", &records).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "c1,s1,Escherichia coli,0,1000,\"chimera {Bacillus_subtilis, Escherichia_coli}\",MEGAHIT,100000"
        );
    }
}
