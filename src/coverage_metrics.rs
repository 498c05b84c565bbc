//! Reference coverage and identity metrics
//!
//! Multiplicity, validity and parsimony follow the COMPASS assembly evaluation definitions. All
//! ratio metrics return 0 instead of failing on an empty denominator.
//!

use crate::alignment_set::ContigAlignment;
use crate::ref_coord::CoveredBases;

/// Phred score reported for a contig with no detected differences
pub const MAX_PHRED_SCORE: f64 = 60.0;

fn safe_ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of the reference covered by at least one block
///
pub fn breadth_of_coverage(covered_bases: &CoveredBases) -> f64 {
    safe_ratio(covered_bases.len() as i64, covered_bases.ref_len())
}

/// Fraction of the reference covered by the single longest alignment block
pub fn contiguity(longest_alignment: i64, ref_len: i64) -> f64 {
    safe_ratio(longest_alignment, ref_len)
}

/// Aligned block length per covered reference base
pub fn multiplicity(total_aligned_len: i64, covered_bases: i64) -> f64 {
    safe_ratio(total_aligned_len, covered_bases)
}

/// Fraction of aligned contig sequence which is found in alignment blocks
pub fn validity(total_aligned_len: i64, total_contig_len: i64) -> f64 {
    safe_ratio(total_aligned_len, total_contig_len)
}

/// Aligned contig length per covered reference base
pub fn parsimony(total_contig_len: i64, covered_bases: i64) -> f64 {
    safe_ratio(total_contig_len, covered_bases)
}

/// Identity of a contig to the reference from its matching base count
///
/// Base matches from overlapping blocks are corrected for the overlapping contig sequence, and the
/// result is capped at 1.
///
pub fn contig_identity(base_matches: i64, overlap_len: i64, contig_len: i64) -> f64 {
    safe_ratio(base_matches - overlap_len, contig_len).clamp(0.0, 1.0)
}

pub fn get_contig_identity(contig: &ContigAlignment) -> f64 {
    contig_identity(
        contig.base_matches(),
        contig.contig_overlap_len(),
        contig.len,
    )
}

/// Phred-scaled quality of an identity value
///
pub fn phred(identity: f64) -> f64 {
    if identity < 1.0 {
        -10.0 * (1.0 - identity).log10()
    } else {
        MAX_PHRED_SCORE
    }
}
