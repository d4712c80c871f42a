use crate::database::ProteinDatabase;
use crate::errors::{
    Result,
    RollupError,
};
use crate::models::{
    DecoyTag,
    IonFormKey,
    PsmRecord,
    SearchScores,
};
use crate::utils::neutral_mass_to_mz;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
};
use tracing::{
    debug,
    warn,
};

/// One consolidated peptide-spectrum match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsmEvidence {
    pub index: u32,
    pub spectrum: String,
    pub scan: u32,
    pub peptide: String,
    pub modified_peptide: Option<String>,
    pub ion_form: IonFormKey,
    pub assumed_charge: u8,
    pub hit_rank: u8,
    pub precursor_neutral_mass: f64,
    pub calc_neutral_pep_mass: f64,
    /// Undefined when the assumed charge is zero.
    pub mz: Option<f64>,
    pub retention_time: f64,
    pub massdiff: f64,
    pub probability: f64,
    pub expectation: f64,
    pub scores: SearchScores,
    pub intensity: f64,
    pub protein: String,
    pub protein_id: String,
    pub gene_name: String,
    pub alternative_proteins: Vec<String>,
    pub mapped_proteins: BTreeSet<String>,
    pub assigned_mass_diffs: Vec<f64>,
    pub assigned_modifications: BTreeMap<String, u32>,
    pub observed_modifications: BTreeMap<String, u32>,
    pub is_decoy: bool,
    pub is_unique: bool,
    pub is_razor: bool,
}

impl PsmEvidence {
    fn from_record(rec: PsmRecord, db: &ProteinDatabase, decoy_tag: &DecoyTag) -> Self {
        let ion_form = rec.ion_form();
        let is_decoy = decoy_tag.is_decoy(&rec.protein);
        let is_unique = rec.alternative_proteins.is_empty();

        let (protein_id, gene_name) = match db.find(&rec.protein) {
            Some(entry) => (entry.id.clone(), entry.gene_names.clone()),
            None => (String::new(), String::new()),
        };

        let mut mapped_proteins: BTreeSet<String> =
            rec.alternative_proteins.iter().cloned().collect();
        mapped_proteins.insert(rec.protein.clone());

        let mut assigned_modifications = BTreeMap::new();
        for label in rec.modification_labels.iter() {
            assigned_modifications.insert(label.clone(), 1);
        }

        Self {
            index: rec.index,
            mz: neutral_mass_to_mz(rec.calc_neutral_pep_mass, rec.assumed_charge),
            spectrum: rec.spectrum,
            scan: rec.scan,
            peptide: rec.peptide,
            modified_peptide: rec.modified_peptide,
            ion_form,
            assumed_charge: rec.assumed_charge,
            hit_rank: rec.hit_rank,
            precursor_neutral_mass: rec.precursor_neutral_mass,
            calc_neutral_pep_mass: rec.calc_neutral_pep_mass,
            retention_time: rec.retention_time,
            massdiff: rec.massdiff,
            probability: rec.probability,
            expectation: rec.expectation,
            scores: rec.scores,
            intensity: rec.intensity,
            protein: rec.protein,
            protein_id,
            gene_name,
            alternative_proteins: rec.alternative_proteins,
            mapped_proteins,
            assigned_mass_diffs: rec.assigned_mass_diffs,
            assigned_modifications,
            observed_modifications: BTreeMap::new(),
            is_decoy,
            is_unique,
            is_razor: false,
        }
    }

    /// Modified sequence when present, stripped sequence otherwise.
    pub fn modified_sequence(&self) -> &str {
        match self.modified_peptide.as_deref() {
            Some(x) if !x.is_empty() => x,
            _ => &self.peptide,
        }
    }
}

/// Builds the canonical PSM collection, sorted by spectrum.
///
/// Ties are broken by record index and hit rank so the order is total.
pub fn consolidate_psms(
    records: Vec<PsmRecord>,
    db: &ProteinDatabase,
    decoy_tag: &DecoyTag,
) -> Result<Vec<PsmEvidence>> {
    if records.is_empty() {
        return Err(RollupError::EmptyIdentifications {
            context: "no PSM records were provided",
        });
    }
    if db.is_empty() {
        return Err(RollupError::DatabaseNotFound);
    }

    let mut out: Vec<PsmEvidence> = records
        .into_iter()
        .map(|rec| PsmEvidence::from_record(rec, db, decoy_tag))
        .collect();

    let zero_charge = out.iter().filter(|x| x.assumed_charge == 0).count();
    if zero_charge > 0 {
        warn!(
            "{} PSMs report a charge of 0, their m/z is left undefined",
            zero_charge
        );
    }
    let unmatched = out.iter().filter(|x| x.protein_id.is_empty()).count();
    if unmatched > 0 {
        debug!("{} PSMs map to proteins missing from the database", unmatched);
    }

    out.sort_by(|a, b| {
        a.spectrum
            .cmp(&b.spectrum)
            .then(a.index.cmp(&b.index))
            .then(a.hit_rank.cmp(&b.hit_rank))
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ProteinDbRecord;

    fn psm(spectrum: &str, index: u32, protein: &str, alternatives: &[&str]) -> PsmRecord {
        PsmRecord {
            index,
            spectrum: spectrum.to_string(),
            scan: index,
            peptide: "PEPTIDE".to_string(),
            modified_peptide: None,
            protein: protein.to_string(),
            alternative_proteins: alternatives.iter().map(|x| x.to_string()).collect(),
            assumed_charge: 2,
            hit_rank: 1,
            precursor_neutral_mass: 799.36,
            calc_neutral_pep_mass: 799.36,
            retention_time: 0.0,
            massdiff: 0.0,
            probability: 0.9,
            expectation: 0.01,
            scores: SearchScores::default(),
            intensity: 0.0,
            assigned_mass_diffs: vec![],
            modification_labels: vec![],
        }
    }

    fn db() -> ProteinDatabase {
        ProteinDatabase::new(vec![ProteinDbRecord {
            part_header: "sp|P1|A_HUMAN".to_string(),
            original_header: "sp|P1|A_HUMAN Protein A".to_string(),
            id: "P1".to_string(),
            gene_names: "GENEA".to_string(),
            ..Default::default()
        }])
    }

    #[test]
    fn test_consolidate_flags_and_order() {
        let records = vec![
            psm("run1.00003.00003.2", 0, "sp|P1|A_HUMAN", &["sp|P2|B_HUMAN"]),
            psm("run1.00001.00001.2", 1, "rev_sp|P9|Z_HUMAN", &[]),
            psm("run1.00002.00002.2", 2, "sp|P1|A_HUMAN", &[]),
        ];
        let out = consolidate_psms(records, &db(), &DecoyTag::default()).unwrap();
        let spectra: Vec<_> = out.iter().map(|x| x.spectrum.as_str()).collect();
        assert_eq!(
            spectra,
            vec![
                "run1.00001.00001.2",
                "run1.00002.00002.2",
                "run1.00003.00003.2"
            ]
        );

        assert!(out[0].is_decoy);
        assert!(out[0].protein_id.is_empty());
        assert_eq!(out[1].gene_name, "GENEA");
        assert_eq!(out[1].protein_id, "P1");

        for x in out.iter() {
            assert_eq!(x.is_unique, x.alternative_proteins.is_empty());
        }
        assert_eq!(out[2].mapped_proteins.len(), 2);
    }

    #[test]
    fn test_ties_broken_by_index() {
        let records = vec![
            psm("run1.00001.00001.2", 7, "sp|P1|A_HUMAN", &[]),
            psm("run1.00001.00001.2", 3, "sp|P1|A_HUMAN", &[]),
        ];
        let out = consolidate_psms(records, &db(), &DecoyTag::default()).unwrap();
        assert_eq!(out[0].index, 3);
        assert_eq!(out[1].index, 7);
    }

    #[test]
    fn test_zero_charge_is_kept() {
        let mut rec = psm("run1.00001.00001.0", 0, "sp|P1|A_HUMAN", &[]);
        rec.assumed_charge = 0;
        let out = consolidate_psms(vec![rec], &db(), &DecoyTag::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].mz.is_none());
    }

    #[test]
    fn test_fatal_inputs() {
        let err = consolidate_psms(vec![], &db(), &DecoyTag::default());
        assert!(matches!(err, Err(RollupError::EmptyIdentifications { .. })));

        let recs = vec![psm("run1.00001.00001.2", 0, "sp|P1|A_HUMAN", &[])];
        let err = consolidate_psms(recs, &ProteinDatabase::default(), &DecoyTag::default());
        assert!(matches!(err, Err(RollupError::DatabaseNotFound)));
    }

    #[test]
    fn test_seeded_labels() {
        let mut rec = psm("run1.00001.00001.2", 0, "sp|P1|A_HUMAN", &[]);
        rec.modification_labels = vec!["15.9949:Oxidation (Oxidation or Hydroxylation)".to_string()];
        let out = consolidate_psms(vec![rec], &db(), &DecoyTag::default()).unwrap();
        assert_eq!(out[0].assigned_modifications.len(), 1);
    }
}
