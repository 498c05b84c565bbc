//! Contig length statistics
//!
//! Nx style statistics over contig length lists, and the whole-assembly summary computed without
//! reference to any alignment.
//!

use serde::Serialize;

use crate::fasta_utils::AssemblyContig;

fn sorted_descending(lengths: &[i64]) -> Vec<i64> {
    let mut x = lengths.to_vec();
    x.sort_unstable_by(|a, b| b.cmp(a));
    x
}

/// Length of the first contig, in descending length order, at which the cumulative length reaches
/// `target_length`
///
/// Returns 0 if the target is never reached.
///
fn get_length_at_target(lengths: &[i64], target_length: f64) -> i64 {
    let mut length_so_far = 0;
    for length in sorted_descending(lengths) {
        length_so_far += length;
        if length_so_far as f64 >= target_length {
            return length;
        }
    }
    0
}

/// Get the Nx value of a list of contig lengths, for target fraction `x` in [0,1]
///
pub fn get_nx(lengths: &[i64], x: f64) -> i64 {
    let total = lengths.iter().sum::<i64>();
    get_length_at_target(lengths, total as f64 * x)
}

/// Get the NGx value of a list of contig lengths, relative to the reference length
///
pub fn get_ngx(lengths: &[i64], ref_len: i64, x: f64) -> i64 {
    get_length_at_target(lengths, ref_len as f64 * x)
}

/// Get the number of contigs, longest first, needed to cover fraction `x` of the reference length
///
/// Returns 0 if all contigs together fall short of the target.
///
pub fn get_lx(lengths: &[i64], ref_len: i64, x: f64) -> usize {
    let target_length = ref_len as f64 * x;
    if lengths.is_empty() || (lengths.iter().sum::<i64>() as f64) < target_length {
        return 0;
    }

    let mut length_so_far = 0;
    for (index, length) in sorted_descending(lengths).into_iter().enumerate() {
        length_so_far += length;
        if length_so_far as f64 >= target_length {
            return index + 1;
        }
    }
    0
}

/// Convert an integer percentage into the fraction used by the Nx functions
pub fn percent_to_fraction(percent: u32) -> f64 {
    percent as f64 / 100.0
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct GlobalAssemblyStats {
    pub contigs: usize,
    pub basepairs: i64,
    pub max_contig_size: i64,
    #[serde(rename = "N50")]
    pub n50: i64,
    pub contigs_over_min_len: usize,
    pub basepairs_over_min_len: i64,
    #[serde(rename = "N50_over_min_len")]
    pub n50_over_min_len: i64,
    #[serde(rename = "Ns")]
    pub ns: i64,
    #[serde(rename = "Ns_over_min_len")]
    pub ns_over_min_len: i64,
}

impl GlobalAssemblyStats {
    /// Column labels matching the field order of `csv_values`
    pub const CSV_HEADER: &'static str = "Contigs,Basepairs,Max contig size,N50,Contigs over min length,Basepairs over min length,N50 over min length,Ns,Ns over min length";

    pub fn csv_values(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.contigs,
            self.basepairs,
            self.max_contig_size,
            self.n50,
            self.contigs_over_min_len,
            self.basepairs_over_min_len,
            self.n50_over_min_len,
            self.ns,
            self.ns_over_min_len,
        )
    }
}

/// Summarize all contigs in an assembly
///
/// Contigs strictly longer than `min_contig_len` contribute to the `*_over_min_len` values
///
pub fn get_global_assembly_stats(
    contigs: &[AssemblyContig],
    min_contig_len: i64,
) -> GlobalAssemblyStats {
    let lengths = contigs.iter().map(|x| x.len).collect::<Vec<_>>();
    let long_contigs = contigs
        .iter()
        .filter(|x| x.len > min_contig_len)
        .collect::<Vec<_>>();
    let long_lengths = long_contigs.iter().map(|x| x.len).collect::<Vec<_>>();

    GlobalAssemblyStats {
        contigs: lengths.len(),
        basepairs: lengths.iter().sum(),
        max_contig_size: lengths.iter().copied().max().unwrap_or(0),
        n50: get_nx(&lengths, 0.5),
        contigs_over_min_len: long_lengths.len(),
        basepairs_over_min_len: long_lengths.iter().sum(),
        n50_over_min_len: get_nx(&long_lengths, 0.5),
        ns: contigs.iter().map(|x| x.n_count).sum(),
        ns_over_min_len: long_contigs.iter().map(|x| x.n_count).sum(),
    }
}
