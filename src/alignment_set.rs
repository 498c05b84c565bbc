//! Alignment blocks grouped by contig and by reference
//!

use std::collections::HashMap;

use crate::int_range::{IntRange, get_consecutive_overlap_total};
use crate::paf::{AlignmentRecord, Strand};
use crate::ref_coord::{CoveredBases, adjust_reference_range};

/// One contig-to-reference alignment block, with the reference range in canonical coordinates
///
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentBlock {
    pub contig_name: String,
    pub reference_name: String,
    pub strand: Strand,
    pub contig_range: IntRange,

    /// Reference range folded into canonical coordinates
    pub ref_range: IntRange,

    /// Reference range as reported on the triplicated reference
    pub tripled_ref_range: IntRange,

    /// True length of the reference
    pub ref_len: i64,

    pub matches: i64,
}

impl AlignmentBlock {
    pub fn from_record(record: &AlignmentRecord, ref_len: i64) -> Self {
        let tripled_ref_range = record.target_range();
        Self {
            contig_name: record.contig_name.clone(),
            reference_name: record.reference_name.clone(),
            strand: record.strand,
            contig_range: record.query_range(),
            ref_range: adjust_reference_range(&tripled_ref_range, ref_len),
            tripled_ref_range,
            ref_len,
            matches: record.residue_matches,
        }
    }

    /// Aligned length in reference bases
    pub fn aligned_len(&self) -> i64 {
        self.tripled_ref_range.size()
    }
}

/// All alignment blocks of one contig
///
#[derive(Clone, Debug)]
pub struct ContigAlignment {
    pub name: String,
    pub len: i64,
    pub blocks: Vec<AlignmentBlock>,
}

impl ContigAlignment {
    pub fn new(name: &str, len: i64) -> Self {
        Self {
            name: name.to_string(),
            len,
            blocks: Vec::new(),
        }
    }

    /// Total base matches summed over all blocks, including any double-counted overlap
    pub fn base_matches(&self) -> i64 {
        self.blocks.iter().map(|x| x.matches).sum()
    }

    /// Total length of contig sequence shared between consecutive blocks
    pub fn contig_overlap_len(&self) -> i64 {
        let ranges = self.blocks.iter().map(|x| x.contig_range).collect::<Vec<_>>();
        get_consecutive_overlap_total(&ranges)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Group alignment blocks by contig, with contigs in order of first appearance
///
pub fn group_blocks_by_contig(
    blocks: impl IntoIterator<Item = (AlignmentBlock, i64)>,
) -> Vec<ContigAlignment> {
    let mut contig_index = HashMap::new();
    let mut contigs: Vec<ContigAlignment> = Vec::new();
    for (block, contig_len) in blocks {
        let index = *contig_index
            .entry(block.contig_name.clone())
            .or_insert_with(|| {
                contigs.push(ContigAlignment::new(&block.contig_name, contig_len));
                contigs.len() - 1
            });
        contigs[index].blocks.push(block);
    }
    contigs
}

/// Everything aligned to a single reference in one PAF file
///
pub struct ReferenceAlignmentSet {
    pub reference_name: String,

    /// True reference length
    pub ref_len: i64,

    /// Longest single alignment block in reference bases
    pub longest_alignment: i64,

    pub covered_bases: CoveredBases,
    pub contigs: Vec<ContigAlignment>,
}

impl ReferenceAlignmentSet {
    /// Build the alignment set from the PAF records of a single reference
    ///
    /// Records aligned to any other reference are ignored.
    ///
    pub fn from_records<'a>(
        reference_name: &str,
        ref_len: i64,
        records: impl IntoIterator<Item = &'a AlignmentRecord>,
    ) -> Self {
        let blocks = records
            .into_iter()
            .filter(|x| x.reference_name == reference_name)
            .map(|x| (AlignmentBlock::from_record(x, ref_len), x.contig_len))
            .collect::<Vec<_>>();

        let longest_alignment = blocks
            .iter()
            .map(|(x, _)| x.aligned_len())
            .max()
            .unwrap_or(0);
        let covered_bases =
            CoveredBases::from_ranges(ref_len, blocks.iter().map(|(x, _)| &x.tripled_ref_range));
        let contigs = group_blocks_by_contig(blocks);

        Self {
            reference_name: reference_name.to_string(),
            ref_len,
            longest_alignment,
            covered_bases,
            contigs,
        }
    }

    /// Sum of all block lengths on the reference
    pub fn total_aligned_len(&self) -> i64 {
        self.contigs
            .iter()
            .flat_map(|x| x.blocks.iter())
            .map(|x| x.aligned_len())
            .sum()
    }

    /// Sum of the full lengths of all distinct contigs aligned to the reference
    pub fn total_contig_len(&self) -> i64 {
        self.contigs.iter().map(|x| x.len).sum()
    }

    pub fn contig_lengths(&self) -> Vec<i64> {
        self.contigs.iter().map(|x| x.len).collect()
    }
}
