//! Evidence levels, from the finest to the coarsest.
//!
//! PSMs are grouped into peptide ions by [`crate::models::IonFormKey`], ions
//! into peptides by stripped sequence, and ions are attached to proteins
//! following the protein inference results. [`propagate_status`] then writes
//! the protein level unique/razor decisions back onto the finer levels.

mod ion;
mod peptide;
mod protein;
mod psm;
mod status;

pub use ion::{
    IonEvidence,
    aggregate_ions,
};
pub use peptide::{
    PeptideEvidence,
    aggregate_peptides,
};
pub use protein::{
    ProteinEvidence,
    assemble_proteins,
};
pub use psm::{
    PsmEvidence,
    consolidate_psms,
};
pub use status::propagate_status;

#[cfg(test)]
pub(crate) mod test_utils {
    use super::PsmEvidence;
    use crate::models::{
        IonFormKey,
        PeptideIonIdentification,
        ProteinIdentification,
        SearchScores,
    };
    use std::collections::{
        BTreeMap,
        BTreeSet,
    };

    pub fn psm(spectrum: &str, peptide: &str, charge: u8, mass: f64) -> PsmEvidence {
        PsmEvidence {
            index: 0,
            spectrum: spectrum.to_string(),
            scan: 0,
            peptide: peptide.to_string(),
            modified_peptide: None,
            ion_form: IonFormKey::new(peptide, charge, mass),
            assumed_charge: charge,
            hit_rank: 1,
            precursor_neutral_mass: mass,
            calc_neutral_pep_mass: mass,
            mz: None,
            retention_time: 0.0,
            massdiff: 0.0,
            probability: 0.5,
            expectation: 0.0,
            scores: SearchScores::default(),
            intensity: 0.0,
            protein: "sp|P1|A_HUMAN".to_string(),
            protein_id: String::new(),
            gene_name: String::new(),
            alternative_proteins: vec![],
            mapped_proteins: BTreeSet::from(["sp|P1|A_HUMAN".to_string()]),
            assigned_mass_diffs: vec![],
            assigned_modifications: BTreeMap::new(),
            observed_modifications: BTreeMap::new(),
            is_decoy: false,
            is_unique: true,
            is_razor: false,
        }
    }

    pub fn listed_ion(
        seq: &str,
        charge: u8,
        mass: f64,
        is_unique: bool,
        razor: bool,
    ) -> PeptideIonIdentification {
        PeptideIonIdentification {
            peptide_sequence: seq.to_string(),
            modified_peptide: None,
            charge,
            calc_neutral_pep_mass: mass,
            weight: 1.0,
            group_weight: 1.0,
            is_unique,
            razor,
        }
    }

    pub fn protein(
        name: &str,
        group_number: u32,
        peptide_ions: Vec<PeptideIonIdentification>,
    ) -> ProteinIdentification {
        ProteinIdentification {
            protein_name: name.to_string(),
            group_number,
            group_sibling_id: "a".to_string(),
            length: 0,
            percent_coverage: 0.0,
            probability: 1.0,
            top_pep_prob: 0.99,
            unique_stripped_peptides: vec![],
            indistinguishable_proteins: vec![],
            peptide_ions,
        }
    }
}
