use crate::errors::{
    DataProcessingError,
    InputReadingError,
    Result,
    RollupError,
};
use crate::evidence::PsmEvidence;
use crate::utils::binary_search_range_by_key;
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

pub const UNKNOWN_MODIFICATION: &str = "Unknown";

/// Absolute tolerance in daltons used to match mass differences.
pub const DEFAULT_UNIMOD_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationEntry {
    pub title: String,
    pub mono_mass: f64,
    #[serde(default)]
    pub description: String,
}

impl ModificationEntry {
    /// `"<mass>:<title> (<description>)"`, mass with 4 decimals.
    pub fn label(&self) -> String {
        format!("{:.4}:{} ({})", self.mono_mass, self.title, self.description)
    }

    fn is_substitution(&self) -> bool {
        self.description.contains("substitution")
    }
}

/// Reference modification table sorted by monoisotopic mass.
#[derive(Debug, Clone)]
pub struct UnimodTable {
    entries: Vec<ModificationEntry>,
}

impl UnimodTable {
    pub fn new(mut entries: Vec<ModificationEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(RollupError::ModificationTableNotFound);
        }
        if let Some(bad) = entries.iter().find(|x| !x.mono_mass.is_finite()) {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: format!("Modification '{}' has mass {}", bad.title, bad.mono_mass),
            }
            .into());
        }
        entries.sort_by(|a, b| {
            a.mono_mass
                .total_cmp(&b.mono_mass)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ModificationEntry] {
        &self.entries
    }

    /// Entries whose mass lies in `[mass - tolerance, mass + tolerance]`.
    pub fn matches(&self, mass: f64, tolerance: f64) -> &[ModificationEntry] {
        let range = binary_search_range_by_key(
            &self.entries,
            (mass - tolerance)..=(mass + tolerance),
            |x| x.mono_mass,
        );
        &self.entries[range]
    }
}

/// Attaches reference modification labels to every PSM.
///
/// Each assigned mass diff matching a non-substitution entry adds one count
/// to that label. The whole peptide mass difference fills the observed
/// labels, skipping labels already assigned. PSMs whose nonzero mass
/// difference matches no entry get [`UNKNOWN_MODIFICATION`].
///
/// A mass difference explained only by an already assigned label is not
/// unknown: such a PSM ends with an empty observed set and no
/// [`UNKNOWN_MODIFICATION`] entry.
pub fn map_mass_diffs(
    psms: &mut [PsmEvidence],
    table: &UnimodTable,
    tolerance: f64,
) -> Result<()> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(DataProcessingError::InvalidParameter {
            field: "unimod_tolerance",
            context: format!("got {}", tolerance),
        }
        .into());
    }

    let mut unknown = 0;
    for psm in psms.iter_mut() {
        if !psm.massdiff.is_finite() {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: format!("Mass difference of {}", psm.spectrum),
            }
            .into());
        }

        for &diff in psm.assigned_mass_diffs.iter() {
            if diff == 0.0 {
                continue;
            }
            for entry in table.matches(diff, tolerance) {
                if entry.is_substitution() {
                    continue;
                }
                *psm.assigned_modifications.entry(entry.label()).or_insert(0) += 1;
            }
        }

        let observed = table.matches(psm.massdiff, tolerance);
        for entry in observed.iter() {
            let label = entry.label();
            if !psm.assigned_modifications.contains_key(&label) {
                *psm.observed_modifications.entry(label).or_insert(0) += 1;
            }
        }

        if psm.massdiff != 0.0 && observed.is_empty() {
            psm.observed_modifications.insert(UNKNOWN_MODIFICATION.to_string(), 1);
            unknown += 1;
        }
    }

    debug!(
        "{} of {} PSMs carry an unexplained mass difference",
        unknown,
        psms.len()
    );
    Ok(())
}

/// Reads the `[Term]` stanzas of a UniMod OBO file.
///
/// `name` becomes the title, the quoted part of `def` the description and the
/// `delta_mono_mass` xref the mass. Terms without a mass are skipped.
pub fn parse_unimod_obo<R: BufRead>(
    reader: R,
) -> std::result::Result<Vec<ModificationEntry>, InputReadingError> {
    let mut out = Vec::new();
    let mut in_term = false;
    let mut title = String::new();
    let mut description = String::new();
    let mut mass: Option<f64> = None;

    let mut flush = |title: &mut String, description: &mut String, mass: &mut Option<f64>| {
        if let Some(m) = mass.take() {
            out.push(ModificationEntry {
                title: std::mem::take(title),
                mono_mass: m,
                description: std::mem::take(description),
            });
        }
        title.clear();
        description.clear();
    };

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| InputReadingError::FileReadingError {
            source: e,
            context: "Error reading OBO line",
            path: PathBuf::new(),
        })?;
        let line = line.trim();

        if line.starts_with('[') {
            flush(&mut title, &mut description, &mut mass);
            in_term = line == "[Term]";
            continue;
        }
        if !in_term {
            continue;
        }

        if let Some(name) = line.strip_prefix("name:") {
            title = name.trim().to_string();
        } else if let Some(def) = line.strip_prefix("def:") {
            description = def
                .trim()
                .strip_prefix('"')
                .and_then(|x| x.split_once('"'))
                .map(|(text, _)| text.trim_end_matches('.').to_string())
                .unwrap_or_default();
        } else if let Some(xref) = line.strip_prefix("xref: delta_mono_mass") {
            let value = xref.trim().trim_matches('"');
            let parsed = value
                .parse::<f64>()
                .map_err(|e| InputReadingError::HeaderParsingError {
                    line: i + 1,
                    context: format!("Invalid delta_mono_mass '{}': {}", value, e),
                })?;
            mass = Some(parsed);
        }
    }
    flush(&mut title, &mut description, &mut mass);

    Ok(out)
}

pub fn read_unimod_obo(
    path: &Path,
) -> std::result::Result<Vec<ModificationEntry>, InputReadingError> {
    let file = std::fs::File::open(path).map_err(|e| InputReadingError::FileReadingError {
        source: e,
        context: "Error opening UniMod OBO file",
        path: PathBuf::from(path),
    })?;
    let out = parse_unimod_obo(BufReader::new(file))?;
    info!("Read {} modifications from {}", out.len(), path.display());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::test_utils::psm;
    use std::io::Cursor;

    fn entry(title: &str, mono_mass: f64, description: &str) -> ModificationEntry {
        ModificationEntry {
            title: title.to_string(),
            mono_mass,
            description: description.to_string(),
        }
    }

    fn table() -> UnimodTable {
        UnimodTable::new(vec![
            entry("Phospho", 79.9663, "O-phospho"),
            entry("Oxidation", 15.9949, "Oxidation or Hydroxylation"),
            entry("Ser->Thr", 14.0157, "Ser->Thr substitution"),
            entry("Methyl", 14.0157, "Methylation"),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_sorted() {
        let t = table();
        let masses: Vec<_> = t.entries().iter().map(|x| x.mono_mass).collect();
        assert_eq!(masses, vec![14.0157, 14.0157, 15.9949, 79.9663]);
        assert_eq!(t.matches(14.02, 0.01).len(), 2);
        assert!(t.matches(50.0, 0.01).is_empty());
    }

    #[test]
    fn test_phospho_and_unknown() {
        let mut phospho = psm("s1", "STY", 2, 400.0);
        phospho.massdiff = 79.9663;
        let mut odd = psm("s2", "STY", 2, 400.0);
        odd.massdiff = 999.0;
        let mut psms = vec![phospho, odd];

        map_mass_diffs(&mut psms, &table(), DEFAULT_UNIMOD_TOLERANCE).unwrap();
        assert_eq!(
            psms[0].observed_modifications.keys().collect::<Vec<_>>(),
            vec!["79.9663:Phospho (O-phospho)"]
        );
        assert_eq!(
            psms[1].observed_modifications.keys().collect::<Vec<_>>(),
            vec!["Unknown"]
        );
    }

    #[test]
    fn test_assigned_labels() {
        let mut p = psm("s1", "MSMK", 2, 500.0);
        p.assigned_mass_diffs = vec![15.9949, 15.9949, 14.0157, 0.0];
        p.massdiff = 15.9949;
        let mut psms = vec![p];
        map_mass_diffs(&mut psms, &table(), DEFAULT_UNIMOD_TOLERANCE).unwrap();

        let p = &psms[0];
        assert_eq!(
            p.assigned_modifications
                .get("15.9949:Oxidation (Oxidation or Hydroxylation)"),
            Some(&2)
        );
        assert_eq!(p.assigned_modifications.get("14.0157:Methyl (Methylation)"), Some(&1));
        assert!(
            !p.assigned_modifications
                .keys()
                .any(|x| x.contains("substitution"))
        );
        // Already explained by an assigned label, nothing left to observe
        assert!(p.observed_modifications.is_empty());
    }

    #[test]
    fn test_empty_table_is_fatal() {
        assert!(matches!(
            UnimodTable::new(vec![]),
            Err(RollupError::ModificationTableNotFound)
        ));
        assert!(matches!(
            UnimodTable::new(vec![entry("Bad", f64::NAN, "")]),
            Err(RollupError::DataProcessingError(_))
        ));
    }

    #[test]
    fn test_parse_obo() {
        let obo = r#"format-version: 1.4

[Term]
id: UNIMOD:0
name: unimod root node
def: "The root node of the unimod modifications ontology." []

[Term]
id: UNIMOD:21
name: Phospho
def: "Phosphorylation." [RESID:AA0036]
xref: delta_mono_mass "79.966331"
xref: delta_avge_mass "79.9799"

[Typedef]
id: part_of
name: part_of
"#;
        let entries = parse_unimod_obo(Cursor::new(obo)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Phospho");
        assert_eq!(entries[0].description, "Phosphorylation");
        assert_eq!(entries[0].mono_mass, 79.966331);
    }
}
