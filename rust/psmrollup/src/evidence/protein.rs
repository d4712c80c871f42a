use super::IonEvidence;
use super::ion::merge_counts;
use crate::database::ProteinDatabase;
use crate::errors::{
    Result,
    RollupError,
};
use crate::models::{
    DecoyTag,
    IonFormKey,
    ProteinIdentification,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressBar,
    ProgressStyle,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
    HashMap,
};
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use tracing::{
    debug,
    info,
};

/// One protein entry with its supporting peptide ions.
///
/// `unique` holds the ions that map to this protein only, `urazor` adds the
/// shared ions protein inference attributed to it, and `total` holds every
/// listed ion. The maps always satisfy `unique ⊆ urazor ⊆ total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinEvidence {
    pub protein_name: String,
    pub group_number: u32,
    pub group_sibling_id: String,
    pub length: usize,
    pub percent_coverage: f32,
    pub probability: f64,
    pub top_pep_prob: f64,
    pub unique_stripped_peptides: usize,
    pub is_decoy: bool,
    pub indistinguishable_proteins: BTreeSet<String>,

    pub total_ions: BTreeMap<IonFormKey, IonEvidence>,
    pub unique_ions: BTreeMap<IonFormKey, IonEvidence>,
    pub urazor_ions: BTreeMap<IonFormKey, IonEvidence>,

    pub total_spc: u32,
    pub unique_spc: u32,
    pub urazor_spc: u32,
    pub total_intensity: f64,
    pub unique_intensity: f64,
    pub urazor_intensity: f64,

    pub urazor_modified_observations: u32,
    pub urazor_unmodified_observations: u32,
    pub urazor_assigned_modifications: BTreeMap<String, u32>,
    pub urazor_observed_modifications: BTreeMap<String, u32>,
    pub supporting_spectra: BTreeMap<String, u32>,

    // Database metadata, empty when the protein has no database entry
    pub original_header: String,
    pub protein_id: String,
    pub entry_name: String,
    pub organism: String,
    pub description: String,
    pub gene_names: String,
    pub protein_existence: String,
    pub sequence: String,
}

fn spectral_count(ions: &BTreeMap<IonFormKey, IonEvidence>) -> u32 {
    ions.values().map(|x| x.spectral_count()).sum()
}

fn intensity(ions: &BTreeMap<IonFormKey, IonEvidence>) -> f64 {
    ions.values().map(|x| x.intensity).sum()
}

impl ProteinEvidence {
    fn assemble(
        prot: &ProteinIdentification,
        ions: &HashMap<&IonFormKey, &IonEvidence>,
        is_decoy: bool,
        missing: &AtomicUsize,
    ) -> Self {
        let mut out = ProteinEvidence {
            protein_name: prot.protein_name.clone(),
            group_number: prot.group_number,
            group_sibling_id: prot.group_sibling_id.clone(),
            length: prot.length,
            percent_coverage: prot.percent_coverage,
            probability: prot.probability,
            top_pep_prob: prot.top_pep_prob,
            unique_stripped_peptides: prot.unique_stripped_peptides.len(),
            is_decoy,
            indistinguishable_proteins: prot.indistinguishable_proteins.iter().cloned().collect(),
            ..Default::default()
        };

        for listed in prot.peptide_ions.iter() {
            let key = listed.ion_form();
            let ion = match ions.get(&key) {
                Some(ion) => (*ion).clone(),
                None => {
                    missing.fetch_add(1, Ordering::Relaxed);
                    IonEvidence::empty(key.clone())
                }
            };

            // Map insertion is idempotent, the modification counters are not:
            // an ion both unique and razor contributes to them twice.
            if listed.is_unique {
                out.unique_ions.insert(key.clone(), ion.clone());
                out.urazor_ions.insert(key.clone(), ion.clone());
                out.add_urazor_observations(&ion);
            }
            if listed.razor {
                out.urazor_ions.insert(key.clone(), ion.clone());
                out.add_urazor_observations(&ion);
            }
            out.total_ions.insert(key, ion);
        }

        out.refresh_totals();
        out
    }

    fn add_urazor_observations(&mut self, ion: &IonEvidence) {
        self.urazor_modified_observations += ion.modified_observations;
        self.urazor_unmodified_observations += ion.unmodified_observations;
        merge_counts(
            &mut self.urazor_assigned_modifications,
            &ion.assigned_modifications,
        );
        merge_counts(
            &mut self.urazor_observed_modifications,
            &ion.observed_modifications,
        );
    }

    /// Recomputes the spectral counts, intensities and supporting spectra
    /// from the ion maps.
    pub fn refresh_totals(&mut self) {
        self.total_spc = spectral_count(&self.total_ions);
        self.unique_spc = spectral_count(&self.unique_ions);
        self.urazor_spc = spectral_count(&self.urazor_ions);
        self.total_intensity = intensity(&self.total_ions);
        self.unique_intensity = intensity(&self.unique_ions);
        self.urazor_intensity = intensity(&self.urazor_ions);

        self.supporting_spectra.clear();
        for ion in self.total_ions.values() {
            merge_counts(&mut self.supporting_spectra, &ion.spectra);
        }
    }

    fn merge_metadata(&mut self, db: &ProteinDatabase) {
        let Some(rec) = db.find_matching(&self.protein_name, self.is_decoy) else {
            return;
        };
        self.original_header = rec.original_header.clone();
        self.protein_id = rec.id.clone();
        self.entry_name = rec.entry_name.clone();
        self.organism = rec.organism.clone();
        self.description = ProteinDatabase::description_of(rec).to_string();
        self.gene_names = rec.gene_names.clone();
        self.protein_existence = rec.protein_existence.clone();
        self.sequence = rec.sequence.clone();
    }
}

/// Builds protein level evidence from protein inference results and the ion
/// collection.
///
/// Proteins are assembled in parallel. Decoys are dropped unless
/// `include_decoys` is set.
pub fn assemble_proteins(
    proteins: &[ProteinIdentification],
    ions: &[IonEvidence],
    db: &ProteinDatabase,
    decoy_tag: &DecoyTag,
    include_decoys: bool,
    show_progress: bool,
) -> Result<Vec<ProteinEvidence>> {
    if db.is_empty() {
        return Err(RollupError::DatabaseNotFound);
    }

    let ion_index: HashMap<&IonFormKey, &IonEvidence> =
        ions.iter().map(|x| (&x.key, x)).collect();
    let missing = AtomicUsize::new(0);

    let pb = if show_progress {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        ProgressBar::new(proteins.len() as u64).with_style(style)
    } else {
        ProgressBar::hidden()
    };

    let mut out: Vec<ProteinEvidence> = proteins
        .par_iter()
        .progress_with(pb)
        .filter_map(|prot| {
            let is_decoy = decoy_tag.is_decoy(&prot.protein_name);
            if is_decoy && !include_decoys {
                return None;
            }
            let mut evidence = ProteinEvidence::assemble(prot, &ion_index, is_decoy, &missing);
            evidence.merge_metadata(db);
            Some(evidence)
        })
        .collect();

    let dropped = proteins.len() - out.len();
    if dropped > 0 {
        info!("Dropped {} decoy proteins", dropped);
    }
    let missing = missing.into_inner();
    if missing > 0 {
        debug!(
            "{} listed peptide ions had no PSM evidence, using empty ions",
            missing
        );
    }
    let unmatched = out.iter().filter(|x| x.protein_id.is_empty()).count();
    if unmatched > 0 {
        debug!("{} proteins have no database entry", unmatched);
    }

    out.sort_by(|a, b| {
        a.group_number
            .cmp(&b.group_number)
            .then_with(|| a.group_sibling_id.cmp(&b.group_sibling_id))
            .then_with(|| a.protein_name.cmp(&b.protein_name))
    });

    Ok(out)
}
