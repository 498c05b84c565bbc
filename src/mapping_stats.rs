//! Per-reference mapping statistics of one assembly
//!
//! Each reference in the triplicated reference FASTA gets one table of coverage, identity and
//! contig length statistics, computed from the contigs aligned to it.
//!

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::mpsc::channel;

use camino::Utf8PathBuf;
use log::{debug, error, info};
use serde_json::{Map, Value, json};
use simple_error::{SimpleResult, try_with};

use crate::alignment_set::ReferenceAlignmentSet;
use crate::assembly_stats::{get_lx, get_ngx, get_nx, percent_to_fraction};
use crate::cli::{MappingStatsSettings, SharedSettings};
use crate::coverage_metrics::{
    breadth_of_coverage, contiguity, get_contig_identity, multiplicity, parsimony, phred,
    validity,
};
use crate::fasta_utils::{ReferenceSeq, read_assembly_contigs, read_triplicated_reference};
use crate::filenames::{
    BREADTH_OF_COVERAGE_CSV_SUFFIX, LX_CSV_SUFFIX, MAPPING_STATS_JSON_SUFFIX, NAX_CSV_SUFFIX,
    NGX_CSV_SUFFIX, PHRED_CSV_SUFFIX, get_unit_filename,
};
use crate::output_utils::{csv_field, write_json_file, write_text_file};
use crate::paf::{AlignmentRecord, read_paf_file};
use crate::unit_inputs::{check_reference_spans, log_missing_references};

/// Target fractions for the single-value L, NA and NG entries of each reference table
///
#[derive(Clone, Copy, Debug)]
pub struct MappingStatsTargets {
    pub l_target: f64,
    pub n_target: f64,
}

impl Default for MappingStatsTargets {
    fn default() -> Self {
        Self {
            l_target: 0.9,
            n_target: 0.5,
        }
    }
}

/// Table key for a statistic at a target fraction, such as 'L90' or 'NG50'
///
fn get_target_key(prefix: &str, target: f64) -> String {
    format!("{}{}", prefix, (target * 100.0).round() as i64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContigPhred {
    pub name: String,
    pub len: i64,
    pub phred: f64,
}

/// All statistics of one reference
///
#[derive(Clone, Debug)]
pub struct ReferenceMappingStats {
    /// Reference name as found in the FASTA header
    pub header: String,

    pub display_name: String,
    pub ref_len: i64,
    pub contiguity: f64,
    pub multiplicity: f64,
    pub validity: f64,
    pub parsimony: f64,

    /// Mean identity over all aligned contigs
    pub identity: f64,

    /// Minimum identity over all aligned contigs
    ///
    /// This is a per-contig minimum, not the lowest identity over fixed-size windows of the
    /// longest alignment.
    pub lowest_identity: f64,

    pub breadth_of_coverage: f64,
    pub aligned_contigs: usize,
    pub aligned_basepairs: i64,
    pub ns: i64,

    /// Lengths of all contigs aligned to the reference, in order of first alignment
    pub contig_lengths: Vec<i64>,

    pub contig_phred: Vec<ContigPhred>,
}

impl ReferenceMappingStats {
    pub fn nax(&self, x: f64) -> i64 {
        get_nx(&self.contig_lengths, x)
    }

    pub fn ngx(&self, x: f64) -> i64 {
        get_ngx(&self.contig_lengths, self.ref_len, x)
    }

    pub fn lx(&self, x: f64) -> i64 {
        get_lx(&self.contig_lengths, self.ref_len, x) as i64
    }

    /// Build the json table of this reference
    ///
    pub fn get_reference_table(&self, assembler: &str, targets: &MappingStatsTargets) -> Value {
        let mut table = Map::new();
        table.insert("assembler".to_string(), json!(assembler));
        table.insert("contiguity".to_string(), json!(self.contiguity));
        table.insert("multiplicity".to_string(), json!(self.multiplicity));
        table.insert("validity".to_string(), json!(self.validity));
        table.insert("parsimony".to_string(), json!(self.parsimony));
        table.insert("identity".to_string(), json!(self.identity));
        table.insert("lowest_identity".to_string(), json!(self.lowest_identity));
        table.insert(
            "breadth_of_coverage".to_string(),
            json!(self.breadth_of_coverage),
        );
        table.insert(
            get_target_key("L", targets.l_target),
            json!(self.lx(targets.l_target)),
        );
        table.insert("aligned_contigs".to_string(), json!(self.aligned_contigs));
        table.insert(
            get_target_key("NA", targets.n_target),
            json!(self.nax(targets.n_target)),
        );
        table.insert(
            get_target_key("NG", targets.n_target),
            json!(self.ngx(targets.n_target)),
        );
        table.insert(
            "aligned_basepairs".to_string(),
            json!(self.aligned_basepairs),
        );
        table.insert("Ns".to_string(), json!(self.ns));
        Value::Object(table)
    }
}

/// Compute all statistics of a single reference from the full alignment record list
///
/// * `n_counts` - N-base count of each assembly contig, keyed on contig name
///
pub fn get_reference_mapping_stats(
    reference: &ReferenceSeq,
    records: &[AlignmentRecord],
    n_counts: &HashMap<String, i64>,
) -> ReferenceMappingStats {
    let ref_set = ReferenceAlignmentSet::from_records(&reference.header, reference.true_len, records);

    let covered_len = ref_set.covered_bases.len() as i64;
    let total_aligned_len = ref_set.total_aligned_len();
    let total_contig_len = ref_set.total_contig_len();

    let identities = ref_set
        .contigs
        .iter()
        .map(get_contig_identity)
        .collect::<Vec<_>>();
    let (identity, lowest_identity) = if identities.is_empty() {
        (0.0, 0.0)
    } else {
        (
            identities.iter().sum::<f64>() / identities.len() as f64,
            identities.iter().copied().fold(f64::INFINITY, f64::min),
        )
    };

    let contig_phred = ref_set
        .contigs
        .iter()
        .zip(identities.iter())
        .map(|(contig, &identity)| ContigPhred {
            name: contig.name.clone(),
            len: contig.len,
            phred: phred(identity),
        })
        .collect();

    let ns = ref_set
        .contigs
        .iter()
        .map(|x| n_counts.get(&x.name).copied().unwrap_or(0))
        .sum();

    ReferenceMappingStats {
        header: reference.header.clone(),
        display_name: reference.display_name.clone(),
        ref_len: reference.true_len,
        contiguity: contiguity(ref_set.longest_alignment, reference.true_len),
        multiplicity: multiplicity(total_aligned_len, covered_len),
        validity: validity(total_aligned_len, total_contig_len),
        parsimony: parsimony(total_contig_len, covered_len),
        identity,
        lowest_identity,
        breadth_of_coverage: breadth_of_coverage(&ref_set.covered_bases),
        aligned_contigs: ref_set.contigs.len(),
        aligned_basepairs: total_contig_len,
        ns,
        contig_lengths: ref_set.contig_lengths(),
        contig_phred,
    }
}

/// Compute the statistics of every reference on a worker pool
///
/// Results are returned in reference order regardless of thread count.
///
pub fn get_all_reference_mapping_stats(
    references: &[ReferenceSeq],
    records: &[AlignmentRecord],
    n_counts: &HashMap<String, i64>,
    thread_count: usize,
) -> Vec<ReferenceMappingStats> {
    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for (ref_index, reference) in references.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = get_reference_mapping_stats(reference, records, n_counts);
                tx.send((ref_index, result)).unwrap();
            });
        }
    });

    let mut all_stats = rx.into_iter().collect::<Vec<_>>();
    all_stats.sort_by_key(|(ref_index, _)| *ref_index);
    all_stats.into_iter().map(|(_, x)| x).collect()
}

/// Build the mapping statistics json report for one sample and assembler
///
/// Tables are keyed on reference display name. A reference whose display name is already taken
/// by an earlier reference is keyed on its display name followed by its FASTA header.
///
pub fn get_mapping_stats_report(
    sample: &str,
    assembler: &str,
    all_stats: &[ReferenceMappingStats],
    targets: &MappingStatsTargets,
) -> Value {
    let mut tables = Map::new();
    for stats in all_stats {
        let key = if tables.contains_key(&stats.display_name) {
            error!(
                "Reference '{}' has the same display name '{}' as an earlier reference. Its mapping statistics are reported under a key including the reference header",
                stats.header, stats.display_name
            );
            format!("{} ({})", stats.display_name, stats.header)
        } else {
            stats.display_name.clone()
        };
        tables.insert(key, stats.get_reference_table(assembler, targets));
    }
    json!({
        "sample_id": sample,
        "ReferenceTables": tables,
    })
}

/// Write one length statistic over all integer percentages from 0 to 100
///
/// * `label` - column label of the statistic, such as 'NAx'
///
pub fn write_series_csv<W: Write>(
    w: &mut W,
    assembler: &str,
    label: &str,
    all_stats: &[ReferenceMappingStats],
    get_value: impl Fn(&ReferenceMappingStats, f64) -> i64,
) -> io::Result<()> {
    writeln!(w, "Reference,Assembler,x,{label}")?;
    for stats in all_stats {
        for percent in 0..=100 {
            writeln!(
                w,
                "{},{},{},{}",
                csv_field(&stats.display_name),
                csv_field(assembler),
                percent,
                get_value(stats, percent_to_fraction(percent))
            )?;
        }
    }
    Ok(())
}

pub fn write_phred_csv<W: Write>(
    w: &mut W,
    assembler: &str,
    all_stats: &[ReferenceMappingStats],
) -> io::Result<()> {
    writeln!(
        w,
        "Assembler,Reference,Contig,Contig Length,Phred Quality Score"
    )?;
    for stats in all_stats {
        for contig in stats.contig_phred.iter() {
            writeln!(
                w,
                "{},{},{},{},{}",
                csv_field(assembler),
                csv_field(&stats.display_name),
                csv_field(&contig.name),
                contig.len,
                contig.phred
            )?;
        }
    }
    Ok(())
}

pub fn write_breadth_of_coverage_csv<W: Write>(
    w: &mut W,
    all_stats: &[ReferenceMappingStats],
) -> io::Result<()> {
    writeln!(w, "Reference,Breadth of Coverage,Contigs")?;
    for stats in all_stats {
        writeln!(
            w,
            "{},{},{}",
            csv_field(&stats.display_name),
            stats.breadth_of_coverage,
            stats.aligned_contigs
        )?;
    }
    Ok(())
}

pub fn run_mapping_stats(
    shared_settings: &SharedSettings,
    settings: &MappingStatsSettings,
) -> SimpleResult<()> {
    let records = try_with!(
        read_paf_file(&settings.paf_filename),
        "Failed to parse PAF file '{}'",
        settings.paf_filename
    );
    let references = read_triplicated_reference(&settings.ref_filename)?;
    log_missing_references(&records, &references);
    check_reference_spans(&records, &references)?;

    let n_counts = read_assembly_contigs(&settings.assembly_filename)?
        .into_iter()
        .map(|x| (x.name, x.n_count))
        .collect::<HashMap<_, _>>();
    debug!(
        "Computing mapping statistics for {} references over {} alignment records",
        references.len(),
        records.len()
    );

    let targets = settings.get_targets();
    let all_stats = get_all_reference_mapping_stats(
        &references,
        &records,
        &n_counts,
        shared_settings.thread_count,
    );
    info!(
        "Computed mapping statistics for {} references",
        all_stats.len()
    );
    let report = get_mapping_stats_report(
        &settings.sample,
        &settings.assembler,
        &all_stats,
        &targets,
    );

    let get_filename = |suffix| -> Utf8PathBuf {
        settings.output_dir.join(get_unit_filename(
            &settings.sample,
            &settings.assembler,
            suffix,
        ))
    };
    let assembler = settings.assembler.as_str();

    write_text_file(&get_filename(NAX_CSV_SUFFIX), "NAx series", |f| {
        write_series_csv(f, assembler, "NAx", &all_stats, |x, t| x.nax(t))
    })?;
    write_text_file(&get_filename(NGX_CSV_SUFFIX), "NGx series", |f| {
        write_series_csv(f, assembler, "NGx", &all_stats, |x, t| x.ngx(t))
    })?;
    write_text_file(&get_filename(LX_CSV_SUFFIX), "Lx series", |f| {
        write_series_csv(f, assembler, "Lx", &all_stats, |x, t| x.lx(t))
    })?;
    write_text_file(&get_filename(PHRED_CSV_SUFFIX), "contig phred scores", |f| {
        write_phred_csv(f, assembler, &all_stats)
    })?;
    write_text_file(
        &get_filename(BREADTH_OF_COVERAGE_CSV_SUFFIX),
        "breadth of coverage",
        |f| write_breadth_of_coverage_csv(f, &all_stats),
    )?;
    write_json_file(
        &get_filename(MAPPING_STATS_JSON_SUFFIX),
        "mapping statistics",
        &report,
    )?;

    Ok(())
}
