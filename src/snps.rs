//! Reference positions of single base substitutions in the assembly
//!

use std::collections::BTreeMap;
use std::io::{self, Write};

use camino::Utf8PathBuf;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, bail, try_with};

use crate::cli::{SharedSettings, SnpsSettings};
use crate::cs_tag::{get_substitutions, parse_cs_tag};
use crate::fasta_utils::{ReferenceSeq, read_triplicated_reference};
use crate::filenames::{SNPS_CSV_SUFFIX, SNPS_JSON_SUFFIX, get_unit_filename};
use crate::output_utils::{csv_field, write_json_file, write_text_file};
use crate::paf::{AlignmentRecord, read_paf_file};
use crate::ref_coord::get_canonical_base_pos;
use crate::unit_inputs::{check_reference_spans, log_missing_references};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snp {
    /// Position in canonical reference coordinates
    pub pos: i64,
    pub ref_base: u8,
    pub query_base: u8,
}

impl Snp {
    /// Substitution label such as 'c->t'
    pub fn substitution(&self) -> String {
        format!("{}->{}", self.ref_base as char, self.query_base as char)
    }
}

/// Find all substitutions in one alignment record
///
/// The cs walk starts at the record's target start on either strand, and every position is folded
/// from the triplicated reference into canonical coordinates.
///
pub fn get_record_snps(record: &AlignmentRecord, ref_len: i64) -> SimpleResult<Vec<Snp>> {
    let cs_tag = match &record.cs_tag {
        Some(x) => x,
        None => bail!(
            "Alignment of contig '{}' to reference '{}' has no cs tag",
            record.contig_name,
            record.reference_name
        ),
    };
    let ops = try_with!(
        parse_cs_tag(cs_tag),
        "Invalid cs tag in alignment of contig '{}' to reference '{}'",
        record.contig_name,
        record.reference_name
    );
    let snps = get_substitutions(&ops, record.target_start)
        .into_iter()
        .map(|x| Snp {
            pos: get_canonical_base_pos(x.pos, ref_len),
            ref_base: x.ref_base,
            query_base: x.query_base,
        })
        .collect();
    Ok(snps)
}

pub struct ReferenceSnps<'a> {
    pub reference: &'a ReferenceSeq,
    pub snps: Vec<Snp>,
}

/// Get the substitutions of every reference, in reference order
///
/// Substitutions are listed in input record order, then in order along each record's cs tag.
///
pub fn get_reference_snps<'a>(
    references: &'a [ReferenceSeq],
    records: &[AlignmentRecord],
) -> SimpleResult<Vec<ReferenceSnps<'a>>> {
    let mut reference_snps = Vec::new();
    for reference in references {
        let mut snps = Vec::new();
        for record in records
            .iter()
            .filter(|x| x.reference_name == reference.header)
        {
            snps.extend(get_record_snps(record, reference.true_len)?);
        }
        reference_snps.push(ReferenceSnps { reference, snps });
    }
    Ok(reference_snps)
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SnpCount {
    pub snps: usize,
}

#[derive(Debug, Serialize)]
pub struct SnpSummary {
    pub sample: String,
    pub assembler: String,

    /// Keyed on reference display name, only including references with at least one substitution
    pub reference: BTreeMap<String, SnpCount>,
}

pub fn get_snp_summary(
    sample: &str,
    assembler: &str,
    reference_snps: &[ReferenceSnps],
) -> SnpSummary {
    let reference = reference_snps
        .iter()
        .filter(|x| !x.snps.is_empty())
        .map(|x| {
            (
                x.reference.display_name.clone(),
                SnpCount {
                    snps: x.snps.len(),
                },
            )
        })
        .collect();
    SnpSummary {
        sample: sample.to_string(),
        assembler: assembler.to_string(),
        reference,
    }
}

pub fn write_snps_csv<W: Write>(
    w: &mut W,
    sample: &str,
    assembler: &str,
    reference_snps: &[ReferenceSnps],
) -> io::Result<()> {
    writeln!(
        w,
        "Sample,Assembler,Reference,Reference Length,SNP Location,Substitution Type"
    )?;
    for ref_snps in reference_snps {
        for snp in ref_snps.snps.iter() {
            writeln!(
                w,
                "{},{},{},{},{},{}",
                csv_field(sample),
                csv_field(assembler),
                csv_field(&ref_snps.reference.display_name),
                ref_snps.reference.true_len,
                snp.pos,
                snp.substitution()
            )?;
        }
    }
    Ok(())
}

pub fn run_snps(_shared_settings: &SharedSettings, settings: &SnpsSettings) -> SimpleResult<()> {
    let records = try_with!(
        read_paf_file(&settings.paf_filename),
        "Failed to parse PAF file '{}'",
        settings.paf_filename
    );
    let references = read_triplicated_reference(&settings.ref_filename)?;
    log_missing_references(&records, &references);
    check_reference_spans(&records, &references)?;

    let reference_snps = get_reference_snps(&references, &records)?;
    let summary = get_snp_summary(&settings.sample, &settings.assembler, &reference_snps);
    info!(
        "Found {} substitutions over {} references",
        reference_snps.iter().map(|x| x.snps.len()).sum::<usize>(),
        references.len()
    );

    let get_filename = |suffix| -> Utf8PathBuf {
        settings.output_dir.join(get_unit_filename(
            &settings.sample,
            &settings.assembler,
            suffix,
        ))
    };
    write_text_file(&get_filename(SNPS_CSV_SUFFIX), "substitution table", |f| {
        write_snps_csv(f, &settings.sample, &settings.assembler, &reference_snps)
    })?;
    write_json_file(
        &get_filename(SNPS_JSON_SUFFIX),
        "substitution summary",
        &summary,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::parse_paf_line;

    fn get_test_references() -> Vec<ReferenceSeq> {
        ["Listeria_monocytogenes", "Salmonella_enterica"]
            .iter()
            .map(|x| ReferenceSeq {
                header: x.to_string(),
                display_name: x.replace('_', " "),
                true_len: 1000,
                gc_percent: 40.0,
            })
            .collect()
    }

    fn make_record(strand: char, reference: &str, target_start: i64, cs_tag: &str) -> AlignmentRecord {
        let line = format!(
            "c1\t500\t0\t500\t{strand}\t{reference}\t3000\t{target_start}\t{}\t495\t500\t60\ttp:A:P\t{cs_tag}",
            target_start + 500
        );
        parse_paf_line(&line, 1).unwrap()
    }

    #[test]
    fn test_get_record_snps() {
        let record = make_record('+', "Listeria_monocytogenes", 100, "cs:Z::10*ag:489");
        let snps = get_record_snps(&record, 1000).unwrap();
        assert_eq!(
            snps,
            vec![Snp {
                pos: 110,
                ref_base: b'a',
                query_base: b'g'
            }]
        );
        assert_eq!(snps[0].substitution(), "a->g");

        // Reverse strand walks from the target start as well
        let record = make_record('-', "Listeria_monocytogenes", 100, "cs:Z::10*ag:489");
        assert_eq!(get_record_snps(&record, 1000).unwrap()[0].pos, 110);
    }

    #[test]
    fn test_get_record_snps_folds_to_canonical() {
        let record = make_record('+', "Listeria_monocytogenes", 1990, "cs:Z::5-tt:3*ct:5*ga:485");
        let snps = get_record_snps(&record, 1000).unwrap();
        let positions = snps.iter().map(|x| x.pos).collect::<Vec<_>>();
        // Tripled position 2000 is the reference origin
        assert_eq!(positions, vec![0, 6]);
    }

    #[test]
    fn test_get_record_snps_errors() {
        let record = make_record('+', "Listeria_monocytogenes", 0, "cs:Z::10&ag:489");
        assert!(get_record_snps(&record, 1000).is_err());

        let line = "c1\t500\t0\t500\t+\tr1\t3000\t0\t500\t495\t500\t60";
        let record = parse_paf_line(line, 1).unwrap();
        assert!(get_record_snps(&record, 1000).is_err());
    }

    #[test]
    fn test_snp_report() {
        let references = get_test_references();
        let records = vec![
            make_record('+', "Salmonella_enterica", 0, "cs:Z::10*ag:5*ct:483"),
            make_record('+', "Salmonella_enterica", 600, "cs:Z::500"),
        ];
        let reference_snps = get_reference_snps(&references, &records).unwrap();
        assert_eq!(reference_snps.len(), 2);
        assert!(reference_snps[0].snps.is_empty());
        assert_eq!(reference_snps[1].snps.len(), 2);

        let summary = get_snp_summary("s1", "metaSPAdes", &reference_snps);
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({
                "sample": "s1",
                "assembler": "metaSPAdes",
                "reference": {"Salmonella enterica": {"snps": 2}},
            })
        );

        let mut out = Vec::new();
        write_snps_csv(&mut out, "s1", "metaSPAdes", &reference_snps).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "s1,metaSPAdes,Salmonella enterica,1000,16,c->t");
    }
}
