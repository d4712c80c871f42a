//! Protein database side-table.
//!
//! Holds the protein entries of the searched database (usually parsed from the
//! FASTA file, see [`crate::data_sources::fasta`]) and answers the two lookups
//! the rollup needs:
//!
//! - PSM level: gene name and protein ID for a protein name, regardless of
//!   decoy status.
//! - Protein level: full metadata for a protein name, where decoy entries only
//!   match decoy proteins and target entries only match targets.

use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProteinDbRecord {
    pub original_header: String,
    /// First whitespace separated token of the header, the name search
    /// engines report proteins by.
    pub part_header: String,
    pub id: String,
    pub entry_name: String,
    pub protein_name: String,
    pub description: String,
    pub gene_names: String,
    pub organism: String,
    pub protein_existence: String,
    pub sequence: String,
    pub is_decoy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProteinDatabase {
    records: Vec<ProteinDbRecord>,
    by_part_header: HashMap<String, Vec<usize>>,
}

impl ProteinDatabase {
    pub fn new(records: Vec<ProteinDbRecord>) -> Self {
        let mut by_part_header: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, rec) in records.iter().enumerate() {
            by_part_header
                .entry(rec.part_header.clone())
                .or_default()
                .push(i);
        }
        Self {
            records,
            by_part_header,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ProteinDbRecord] {
        &self.records
    }

    /// First record registered under this exact protein name.
    pub fn find(&self, protein_name: &str) -> Option<&ProteinDbRecord> {
        self.by_part_header
            .get(protein_name)
            .and_then(|idxs| idxs.first())
            .map(|&i| &self.records[i])
    }

    /// Record describing `protein_name` with the same decoy status.
    ///
    /// Exact name matches win; otherwise the first record whose full header
    /// contains the name is used.
    pub fn find_matching(&self, protein_name: &str, is_decoy: bool) -> Option<&ProteinDbRecord> {
        let exact = self.by_part_header.get(protein_name).and_then(|idxs| {
            idxs.iter()
                .map(|&i| &self.records[i])
                .find(|rec| rec.is_decoy == is_decoy)
        });
        if exact.is_some() {
            return exact;
        }

        if protein_name.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|rec| rec.is_decoy == is_decoy && rec.original_header.contains(protein_name))
    }

    /// Display description for a record. UniProt entries carry it in the
    /// protein name field.
    pub fn description_of(record: &ProteinDbRecord) -> &str {
        if record.description.is_empty() {
            &record.protein_name
        } else {
            &record.description
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(part_header: &str, is_decoy: bool) -> ProteinDbRecord {
        ProteinDbRecord {
            original_header: format!("{} Some protein OS=Homo sapiens", part_header),
            part_header: part_header.to_string(),
            id: part_header.split('|').nth(1).unwrap_or_default().to_string(),
            is_decoy,
            ..Default::default()
        }
    }

    #[test]
    fn test_decoy_status_must_agree() {
        let db = ProteinDatabase::new(vec![
            record("sp|Q9P243|ZFAT_HUMAN", false),
            record("rev_sp|Q9P243|ZFAT_HUMAN", true),
        ]);
        let target = db.find_matching("sp|Q9P243|ZFAT_HUMAN", false).unwrap();
        assert!(!target.is_decoy);
        let decoy = db.find_matching("sp|Q9P243|ZFAT_HUMAN", true).unwrap();
        // Falls back to the header containment match
        assert_eq!(decoy.part_header, "rev_sp|Q9P243|ZFAT_HUMAN");
    }

    #[test]
    fn test_find_ignores_decoy_status() {
        let db = ProteinDatabase::new(vec![record("rev_sp|P02768|ALBU_HUMAN", true)]);
        assert_eq!(db.find("rev_sp|P02768|ALBU_HUMAN").unwrap().id, "P02768");
        assert!(db.find("sp|P02768|ALBU_HUMAN").is_none());
    }

    #[test]
    fn test_no_match() {
        let db = ProteinDatabase::new(vec![record("sp|P02768|ALBU_HUMAN", false)]);
        assert!(db.find_matching("sp|P69905|HBA_HUMAN", false).is_none());
        assert!(db.find_matching("", false).is_none());
    }

    #[test]
    fn test_description_fallback() {
        let mut rec = record("sp|P02768|ALBU_HUMAN", false);
        rec.protein_name = "Albumin".to_string();
        assert_eq!(ProteinDatabase::description_of(&rec), "Albumin");
        rec.description = "Serum albumin".to_string();
        assert_eq!(ProteinDatabase::description_of(&rec), "Serum albumin");
    }
}
