//! Wall time spent in each rollup stage.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct RollupTimings {
    /// PSM consolidation and UniMod mapping.
    pub psm: Duration,
    pub ion: Duration,
    pub peptide: Duration,
    pub protein: Duration,
    /// Status back-fill onto PSMs and ions.
    pub status: Duration,
    pub mass_bins: Duration,
}

impl RollupTimings {
    pub fn total(&self) -> Duration {
        self.psm + self.ion + self.peptide + self.protein + self.status + self.mass_bins
    }
}

impl Serialize for RollupTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("RollupTimings", 7)?;
        state.serialize_field("psm_ms", &self.psm.as_millis())?;
        state.serialize_field("ion_ms", &self.ion.as_millis())?;
        state.serialize_field("peptide_ms", &self.peptide.as_millis())?;
        state.serialize_field("protein_ms", &self.protein.as_millis())?;
        state.serialize_field("status_ms", &self.status.as_millis())?;
        state.serialize_field("mass_bins_ms", &self.mass_bins.as_millis())?;
        state.serialize_field("total_ms", &self.total().as_millis())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_in_millis() {
        let timings = RollupTimings {
            psm: Duration::from_millis(3),
            protein: Duration::from_millis(10),
            ..Default::default()
        };
        let json = serde_json::to_value(timings).unwrap();
        assert_eq!(json["psm_ms"], 3);
        assert_eq!(json["total_ms"], 13);
    }
}
