//! End to end rollup of validated identifications.
//!
//! The stages run in a fixed order:
//!
//! 1. consolidate the raw PSMs ([`consolidate_psms`])
//! 2. label their mass differences against the reference table
//!    ([`map_mass_diffs`])
//! 3. group PSMs into ions and ions into peptides
//! 4. attach ions to proteins ([`assemble_proteins`])
//! 5. copy the protein level decisions back ([`propagate_status`])
//! 6. histogram the mass differences ([`bin_mass_differences`])
//!
//! Every stage is a plain function; [`run`] only wires them together and
//! records how long each one took.

mod timings;

use crate::database::ProteinDatabase;
use crate::errors::Result;
use crate::evidence::{
    IonEvidence,
    PeptideEvidence,
    ProteinEvidence,
    PsmEvidence,
    aggregate_ions,
    aggregate_peptides,
    assemble_proteins,
    consolidate_psms,
    propagate_status,
};
use crate::models::{
    DecoyTag,
    ProteinIdentification,
    PsmRecord,
};
use crate::modifications::{
    DEFAULT_UNIMOD_TOLERANCE,
    MassBin,
    MassBinParams,
    ModificationEntry,
    UnimodTable,
    annotate_bins,
    bin_mass_differences,
    map_mass_diffs,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Instant;
use tracing::info;

pub use timings::RollupTimings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupParams {
    pub decoy_tag: DecoyTag,
    /// Keep decoy proteins in the protein level output.
    pub include_decoys: bool,
    pub unimod_tolerance: f64,
    pub mass_bins: MassBinParams,
    pub show_progress: bool,
}

impl Default for RollupParams {
    fn default() -> Self {
        Self {
            decoy_tag: DecoyTag::default(),
            include_decoys: false,
            unimod_tolerance: DEFAULT_UNIMOD_TOLERANCE,
            mass_bins: MassBinParams::default(),
            show_progress: false,
        }
    }
}

/// Everything a rollup consumes, already loaded in memory.
#[derive(Debug, Clone, Default)]
pub struct RollupInputs {
    pub psms: Vec<PsmRecord>,
    pub proteins: Vec<ProteinIdentification>,
    pub database: ProteinDatabase,
    pub modifications: Vec<ModificationEntry>,
}

/// The four evidence levels plus the mass difference histogram, each sorted.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub psms: Vec<PsmEvidence>,
    pub ions: Vec<IonEvidence>,
    pub peptides: Vec<PeptideEvidence>,
    pub proteins: Vec<ProteinEvidence>,
    pub mass_bins: Vec<MassBin>,
    pub timings: RollupTimings,
}

pub fn run(inputs: RollupInputs, params: &RollupParams) -> Result<Evidence> {
    let RollupInputs {
        psms,
        proteins,
        database,
        modifications,
    } = inputs;
    let mut timings = RollupTimings::default();

    info!(
        "Rolling up {} PSMs and {} proteins against {} database entries",
        psms.len(),
        proteins.len(),
        database.len()
    );
    let table = UnimodTable::new(modifications)?;

    let st = Instant::now();
    let mut psms = consolidate_psms(psms, &database, &params.decoy_tag)?;
    map_mass_diffs(&mut psms, &table, params.unimod_tolerance)?;
    timings.psm = st.elapsed();
    info!("Consolidated {} PSMs in {:?}", psms.len(), timings.psm);

    let st = Instant::now();
    let mut ions = aggregate_ions(&psms);
    timings.ion = st.elapsed();
    info!("Aggregated {} ions in {:?}", ions.len(), timings.ion);

    let st = Instant::now();
    let peptides = aggregate_peptides(&ions);
    timings.peptide = st.elapsed();
    info!("Aggregated {} peptides in {:?}", peptides.len(), timings.peptide);

    let st = Instant::now();
    let mut proteins = assemble_proteins(
        &proteins,
        &ions,
        &database,
        &params.decoy_tag,
        params.include_decoys,
        params.show_progress,
    )?;
    timings.protein = st.elapsed();
    info!("Assembled {} proteins in {:?}", proteins.len(), timings.protein);

    let st = Instant::now();
    propagate_status(&mut psms, &mut ions, &mut proteins);
    timings.status = st.elapsed();

    let st = Instant::now();
    let mut mass_bins = bin_mass_differences(&psms, &params.mass_bins)?;
    annotate_bins(&mut mass_bins, &table);
    timings.mass_bins = st.elapsed();

    info!("Rollup finished in {:?}", timings.total());

    Ok(Evidence {
        psms,
        ions,
        peptides,
        proteins,
        mass_bins,
        timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_partial_json() {
        let params: RollupParams =
            serde_json::from_str(r#"{"decoy_tag": "DECOY_", "mass_bins": {"width": 0.5}}"#)
                .unwrap();
        assert_eq!(params.decoy_tag.as_str(), "DECOY_");
        assert_eq!(params.unimod_tolerance, 0.01);
        assert_eq!(params.mass_bins.width, 0.5);
        assert_eq!(params.mass_bins.amplitude, 500.0);
        assert!(!params.include_decoys);
    }

    #[test]
    fn test_missing_table_fails_first() {
        let out = run(RollupInputs::default(), &RollupParams::default());
        assert!(matches!(
            out,
            Err(crate::errors::RollupError::ModificationTableNotFound)
        ));
    }
}
