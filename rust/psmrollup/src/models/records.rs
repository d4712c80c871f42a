//! Identification records as handed over by the upstream search, validation
//! and protein inference tools.
//!
//! These are the immutable inputs of a rollup; nothing in here is modified
//! once read.

use super::IonFormKey;
use serde::{
    Deserialize,
    Serialize,
};

/// Search engine scores attached to a PSM. Engines only fill the ones they
/// compute, everything else stays at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchScores {
    pub xcorr: f64,
    pub delta_cn: f64,
    pub delta_cn_star: f64,
    pub sp_score: f64,
    pub sp_rank: f64,
    pub hyperscore: f64,
    pub nextscore: f64,
    pub discriminant_value: f64,
}

/// One validated peptide-spectrum match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsmRecord {
    #[serde(default)]
    pub index: u32,
    pub spectrum: String,
    #[serde(default)]
    pub scan: u32,
    pub peptide: String,
    #[serde(default)]
    pub modified_peptide: Option<String>,
    pub protein: String,
    #[serde(default)]
    pub alternative_proteins: Vec<String>,
    pub assumed_charge: u8,
    #[serde(default)]
    pub hit_rank: u8,
    pub precursor_neutral_mass: f64,
    pub calc_neutral_pep_mass: f64,
    #[serde(default)]
    pub retention_time: f64,
    pub massdiff: f64,
    pub probability: f64,
    #[serde(default)]
    pub expectation: f64,
    #[serde(default)]
    pub scores: SearchScores,
    #[serde(default)]
    pub intensity: f64,
    /// Mass shift assigned by the search engine to each modified position.
    #[serde(default)]
    pub assigned_mass_diffs: Vec<f64>,
    /// Modification labels already resolved upstream, if any.
    #[serde(default)]
    pub modification_labels: Vec<String>,
}

impl PsmRecord {
    pub fn ion_form(&self) -> IonFormKey {
        IonFormKey::from_parts(
            &self.peptide,
            self.modified_peptide.as_deref(),
            self.assumed_charge,
            self.calc_neutral_pep_mass,
        )
    }
}

/// A peptide ion as listed under a protein by the protein inference tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideIonIdentification {
    pub peptide_sequence: String,
    #[serde(default)]
    pub modified_peptide: Option<String>,
    pub charge: u8,
    pub calc_neutral_pep_mass: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub group_weight: f64,
    /// The peptide maps to this protein only.
    #[serde(default)]
    pub is_unique: bool,
    /// The (shared) peptide was attributed to this protein by parsimony.
    #[serde(default)]
    pub razor: bool,
}

impl PeptideIonIdentification {
    pub fn ion_form(&self) -> IonFormKey {
        IonFormKey::from_parts(
            &self.peptide_sequence,
            self.modified_peptide.as_deref(),
            self.charge,
            self.calc_neutral_pep_mass,
        )
    }
}

/// One protein entry of a protein group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinIdentification {
    pub protein_name: String,
    pub group_number: u32,
    #[serde(default)]
    pub group_sibling_id: String,
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub percent_coverage: f32,
    pub probability: f64,
    #[serde(default)]
    pub top_pep_prob: f64,
    #[serde(default)]
    pub unique_stripped_peptides: Vec<String>,
    #[serde(default)]
    pub indistinguishable_proteins: Vec<String>,
    #[serde(default)]
    pub peptide_ions: Vec<PeptideIonIdentification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_record_defaults() {
        let json = r#"{
            "spectrum": "run1.00042.00042.2",
            "peptide": "PEPTIDE",
            "protein": "sp|P12345|TEST_HUMAN",
            "assumed_charge": 2,
            "precursor_neutral_mass": 799.36,
            "calc_neutral_pep_mass": 799.3600,
            "massdiff": 0.0,
            "probability": 0.99
        }"#;
        let psm: PsmRecord = serde_json::from_str(json).unwrap();
        assert!(psm.alternative_proteins.is_empty());
        assert_eq!(psm.scores, SearchScores::default());
        assert_eq!(psm.ion_form().as_str(), "PEPTIDE#2#799.3600");
    }

    #[test]
    fn test_peptide_ion_flags() {
        let json = r#"{
            "peptide_sequence": "BBB",
            "charge": 2,
            "calc_neutral_pep_mass": 300.0,
            "razor": true
        }"#;
        let ion: PeptideIonIdentification = serde_json::from_str(json).unwrap();
        assert!(ion.razor);
        assert!(!ion.is_unique);
        assert_eq!(ion.ion_form().as_str(), "BBB#2#300.0000");
    }
}
