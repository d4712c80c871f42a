use super::UnimodTable;
use crate::errors::{
    DataProcessingError,
    Result,
};
use crate::evidence::PsmEvidence;
use crate::utils::round_decimals;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeSet,
    HashSet,
};
use tracing::debug;

/// Geometry of the mass difference histogram.
///
/// Bins are centered on multiples of `width` from `-amplitude` to
/// `amplitude`, each spanning `half_window * width` to both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBinParams {
    pub width: f64,
    /// Fraction of `width` covered on each side of the center.
    pub half_window: f64,
    pub amplitude: f64,
}

impl Default for MassBinParams {
    fn default() -> Self {
        Self {
            width: 0.1,
            half_window: 0.5,
            amplitude: 500.0,
        }
    }
}

impl MassBinParams {
    fn validate(&self) -> std::result::Result<(), DataProcessingError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(DataProcessingError::InvalidParameter {
                field: "mass_bins.width",
                context: format!("expected a positive width, got {}", self.width),
            });
        }
        if !(self.half_window > 0.0 && self.half_window <= 0.5) {
            return Err(DataProcessingError::InvalidParameter {
                field: "mass_bins.half_window",
                context: format!("expected a value in (0, 0.5], got {}", self.half_window),
            });
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(DataProcessingError::InvalidParameter {
                field: "mass_bins.amplitude",
                context: format!("expected a non negative amplitude, got {}", self.amplitude),
            });
        }
        Ok(())
    }

    pub fn num_bins(&self) -> usize {
        (2.0 * self.amplitude / self.width).round() as usize + 1
    }

    fn zero_bin(&self) -> usize {
        (self.amplitude / self.width).round() as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMember {
    pub spectrum: String,
    pub mass_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassBin {
    pub lower_mass: f64,
    pub upper_mass: f64,
    pub mass_center: f64,
    pub average_mass: f64,
    pub corrected_mass: f64,
    /// PSMs with an assigned per-residue mass diff in this bin.
    pub assigned: Vec<BinMember>,
    /// PSMs whose whole peptide mass difference falls in this bin.
    pub observed: Vec<BinMember>,
    /// Reference modifications with a mass inside the bin.
    pub modifications: BTreeSet<String>,
}

impl MassBin {
    /// Values in `(lower_mass, upper_mass]` belong to the bin.
    pub fn contains(&self, mass: f64) -> bool {
        mass > self.lower_mass && mass <= self.upper_mass
    }

    fn raw_average(&self) -> Option<f64> {
        if self.observed.is_empty() {
            return None;
        }
        let total: f64 = self.observed.iter().map(|x| x.mass_diff).sum();
        Some(total / self.observed.len() as f64)
    }
}

/// Fixed-width histogram of PSM mass differences.
pub struct MassBinner {
    params: MassBinParams,
    bins: Vec<MassBin>,
}

impl MassBinner {
    pub fn new(params: MassBinParams) -> Result<Self> {
        params
            .validate()
            .map_err(|e| e.append_to_context(" while building mass bins"))?;
        let n = params.num_bins();
        let half = params.half_window * params.width;
        let bins = (0..n)
            .map(|i| {
                let center = -params.amplitude + (i as f64 * params.width);
                MassBin {
                    lower_mass: round_decimals(center - half, 4),
                    upper_mass: round_decimals(center + half, 4),
                    mass_center: round_decimals(center, 4),
                    average_mass: 0.0,
                    corrected_mass: round_decimals(center, 4),
                    assigned: Vec::new(),
                    observed: Vec::new(),
                    modifications: BTreeSet::new(),
                }
            })
            .collect();
        Ok(Self { params, bins })
    }

    /// Index of the bin holding `mass`, if any.
    pub fn bin_index(&self, mass: f64) -> Option<usize> {
        if !mass.is_finite() {
            return None;
        }
        let guess = ((mass + self.params.amplitude) / self.params.width).round() as i64;
        (guess - 1..=guess + 1)
            .filter(|&i| i >= 0 && (i as usize) < self.bins.len())
            .map(|i| i as usize)
            .find(|&i| self.bins[i].contains(mass))
    }

    pub fn add_psm(&mut self, psm: &PsmEvidence) {
        // Identical values within one PSM land in the bin only once
        let mut seen: HashSet<u64> = HashSet::new();
        for &diff in psm.assigned_mass_diffs.iter() {
            if diff == 0.0 || !seen.insert(diff.to_bits()) {
                continue;
            }
            if let Some(i) = self.bin_index(diff) {
                self.bins[i].assigned.push(BinMember {
                    spectrum: psm.spectrum.clone(),
                    mass_diff: diff,
                });
            }
        }

        if let Some(i) = self.bin_index(psm.massdiff) {
            self.bins[i].observed.push(BinMember {
                spectrum: psm.spectrum.clone(),
                mass_diff: psm.massdiff,
            });
        }
    }

    pub fn finish(mut self) -> Vec<MassBin> {
        apply_correction(&mut self.bins, &self.params);
        self.bins
    }
}

/// Recomputes average and corrected masses from the bin members.
///
/// The correction shifts every non-empty bin towards zero by the average
/// mass of the zero bin. It is derived from the raw members only, so calling
/// this again leaves the bins unchanged.
pub fn apply_correction(bins: &mut [MassBin], params: &MassBinParams) {
    let zero_deviation = bins
        .get(params.zero_bin())
        .and_then(|b| b.raw_average())
        .unwrap_or(0.0);

    for bin in bins.iter_mut() {
        match bin.raw_average() {
            Some(avg) => {
                bin.average_mass = round_decimals(avg, 4);
                let corrected = if avg > 0.0 {
                    avg - zero_deviation
                } else {
                    avg + zero_deviation
                };
                bin.corrected_mass = round_decimals(corrected, 4);
            }
            None => {
                bin.average_mass = 0.0;
                bin.corrected_mass = bin.mass_center;
            }
        }
    }
}

pub fn bin_mass_differences(
    psms: &[PsmEvidence],
    params: &MassBinParams,
) -> Result<Vec<MassBin>> {
    let mut binner = MassBinner::new(*params)?;
    for psm in psms.iter() {
        binner.add_psm(psm);
    }
    let bins = binner.finish();
    debug!(
        "Binned mass differences into {} bins, {} populated",
        bins.len(),
        bins.iter().filter(|x| !x.observed.is_empty()).count()
    );
    Ok(bins)
}

/// Tags each bin with the reference modifications whose mass falls in it.
pub fn annotate_bins(bins: &mut [MassBin], table: &UnimodTable) {
    for entry in table.entries() {
        // Bins are ordered by their bounds
        let i = bins.partition_point(|b| b.upper_mass < entry.mono_mass);
        if let Some(bin) = bins.get_mut(i).filter(|b| b.contains(entry.mono_mass)) {
            bin.modifications.insert(entry.label());
        }
    }
}
