//! Display names for the mock community reference sequences
//!

/// Reference FASTA header id to report display name
///
/// Sorted by header id for binary search.
///
const REFERENCE_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("Bacillus_subtilis", "Bacillus subtilis"),
    ("Cryptococcus_neoformans", "Cryptococcus neoformans"),
    ("Enterococcus_faecalis", "Enterococcus faecalis"),
    ("Escherichia_coli", "Escherichia coli"),
    ("Escherichia_coli_plasmid", "Escherichia coli plasmid"),
    ("Lactobacillus_fermentum", "Lactobacillus fermentum"),
    ("Listeria_monocytogenes", "Listeria monocytogenes"),
    ("Pseudomonas_aeruginosa", "Pseudomonas aeruginosa"),
    ("Saccharomyces_cerevisiae", "Saccharomyces cerevisiae"),
    ("Salmonella_enterica", "Salmonella enterica"),
    ("Staphylococcus_aureus", "Staphylococcus aureus"),
    ("Staphylococcus_aureus_plasmid1", "Staphylococcus aureus plasmid 1"),
    ("Staphylococcus_aureus_plasmid2", "Staphylococcus aureus plasmid 2"),
    ("Staphylococcus_aureus_plasmid3", "Staphylococcus aureus plasmid 3"),
];

/// Look up the display name of a reference from its FASTA header id
///
/// Header ids without an entry in the table are displayed as-is.
///
pub fn get_reference_display_name(header: &str) -> &str {
    match REFERENCE_DISPLAY_NAMES.binary_search_by(|(id, _)| (*id).cmp(header)) {
        Ok(index) => REFERENCE_DISPLAY_NAMES[index].1,
        Err(_) => header,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(
            REFERENCE_DISPLAY_NAMES
                .windows(2)
                .all(|w| w[0].0 < w[1].0)
        );
    }

    #[test]
    fn test_get_reference_display_name() {
        assert_eq!(
            get_reference_display_name("Listeria_monocytogenes"),
            "Listeria monocytogenes"
        );
        assert_eq!(
            get_reference_display_name("Staphylococcus_aureus_plasmid2"),
            "Staphylococcus aureus plasmid 2"
        );
        assert_eq!(get_reference_display_name("chr1"), "chr1");
    }
}
