use super::PsmEvidence;
use crate::models::IonFormKey;
use crate::utils::is_unmodified_mass_diff;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
};

/// Evidence for one peptide ion (sequence, charge and mass), collected over
/// every PSM sharing its [`IonFormKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IonEvidence {
    pub key: IonFormKey,
    pub sequence: String,
    pub modified_sequence: String,
    pub charge: u8,
    pub calc_neutral_pep_mass: f64,
    pub precursor_neutral_mass: f64,
    pub mz: Option<f64>,
    /// Spectrum name to the number of PSMs reporting it.
    pub spectra: BTreeMap<String, u32>,
    pub mapped_proteins: BTreeSet<String>,
    pub probability: f64,
    pub expectation: f64,
    pub intensity: f64,
    pub assigned_modifications: BTreeMap<String, u32>,
    pub observed_modifications: BTreeMap<String, u32>,
    pub modified_observations: u32,
    pub unmodified_observations: u32,
    pub is_decoy: bool,
    pub is_unique: bool,
    pub is_razor: bool,
}

impl IonEvidence {
    /// Placeholder for an ion listed by protein inference but absent from
    /// the PSM collection.
    pub fn empty(key: IonFormKey) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    /// Number of supporting PSMs, counting repeated spectra.
    pub fn spectral_count(&self) -> u32 {
        self.spectra.values().sum()
    }

    fn seed(psm: &PsmEvidence) -> Self {
        Self {
            key: psm.ion_form.clone(),
            sequence: psm.peptide.clone(),
            modified_sequence: psm.modified_sequence().to_string(),
            charge: psm.assumed_charge,
            calc_neutral_pep_mass: psm.calc_neutral_pep_mass,
            precursor_neutral_mass: psm.precursor_neutral_mass,
            mz: psm.mz,
            expectation: psm.expectation,
            is_decoy: psm.is_decoy,
            is_unique: true,
            ..Default::default()
        }
    }

    fn add(&mut self, psm: &PsmEvidence) {
        *self.spectra.entry(psm.spectrum.clone()).or_insert(0) += 1;
        self.mapped_proteins.extend(psm.mapped_proteins.iter().cloned());
        self.probability = self.probability.max(psm.probability);
        self.intensity = self.intensity.max(psm.intensity);
        self.is_unique &= psm.is_unique;
        self.is_razor |= psm.is_razor;

        merge_counts(&mut self.assigned_modifications, &psm.assigned_modifications);
        merge_counts(&mut self.observed_modifications, &psm.observed_modifications);

        if is_unmodified_mass_diff(psm.massdiff) {
            self.unmodified_observations += 1;
        } else {
            self.modified_observations += 1;
        }
    }
}

pub(crate) fn merge_counts(into: &mut BTreeMap<String, u32>, from: &BTreeMap<String, u32>) {
    for (label, count) in from.iter() {
        *into.entry(label.clone()).or_insert(0) += count;
    }
}

/// Groups PSMs by ion-form key.
///
/// Descriptive fields come from the first PSM of each group in collection
/// order. An ion is unique only when every supporting PSM is.
pub fn aggregate_ions(psms: &[PsmEvidence]) -> Vec<IonEvidence> {
    let mut groups: BTreeMap<&IonFormKey, IonEvidence> = BTreeMap::new();
    for psm in psms.iter() {
        groups
            .entry(&psm.ion_form)
            .or_insert_with(|| IonEvidence::seed(psm))
            .add(psm);
    }

    let mut out: Vec<IonEvidence> = groups.into_values().collect();
    out.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.modified_sequence.cmp(&b.modified_sequence))
            .then(a.charge.cmp(&b.charge))
            .then_with(|| a.key.cmp(&b.key))
    });
    out
}
