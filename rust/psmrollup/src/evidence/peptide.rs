use super::IonEvidence;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
};

/// Evidence for one stripped peptide sequence over all its ions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeptideEvidence {
    pub sequence: String,
    pub charge_states: BTreeSet<u8>,
    pub spectral_count: u32,
    pub intensity: f64,
    pub modified_observations: u32,
    pub unmodified_observations: u32,
    pub mapped_proteins: BTreeSet<String>,
    pub probability: f64,
}

pub fn aggregate_peptides(ions: &[IonEvidence]) -> Vec<PeptideEvidence> {
    let mut groups: BTreeMap<&str, PeptideEvidence> = BTreeMap::new();
    for ion in ions.iter() {
        let pep = groups
            .entry(ion.sequence.as_str())
            .or_insert_with(|| PeptideEvidence {
                sequence: ion.sequence.clone(),
                ..Default::default()
            });
        pep.charge_states.insert(ion.charge);
        pep.spectral_count += ion.spectral_count();
        pep.intensity = pep.intensity.max(ion.intensity);
        pep.probability = pep.probability.max(ion.probability);
        pep.modified_observations += ion.modified_observations;
        pep.unmodified_observations += ion.unmodified_observations;
        pep.mapped_proteins.extend(ion.mapped_proteins.iter().cloned());
    }

    // BTreeMap iteration is already sorted by sequence
    groups.into_values().collect()
}
