use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;

/// Canonical identity of a peptide ion: `sequence#charge#mass`.
///
/// The mass is always printed with 4 decimals and the sequence is the modified
/// sequence when one is available, the stripped one otherwise. Report columns
/// are keyed on this exact string, so the format must not change.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IonFormKey(String);

impl IonFormKey {
    pub fn new(sequence: &str, charge: u8, mass: f64) -> Self {
        IonFormKey(format!("{}#{}#{:.4}", sequence, charge, mass))
    }

    /// Builds the key preferring the modified sequence when it is present
    /// and non-empty.
    pub fn from_parts(
        peptide: &str,
        modified_peptide: Option<&str>,
        charge: u8,
        mass: f64,
    ) -> Self {
        let seq = match modified_peptide {
            Some(x) if !x.is_empty() => x,
            _ => peptide,
        };
        Self::new(seq, charge, mass)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IonFormKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IonFormKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(IonFormKey::new("AAA", 2, 500.1234).as_str(), "AAA#2#500.1234");
        assert_eq!(IonFormKey::new("BBB", 2, 300.0).as_str(), "BBB#2#300.0000");
        assert_eq!(
            IonFormKey::new("PEPTIDE", 3, 799.35996).as_str(),
            "PEPTIDE#3#799.3600"
        );
    }

    #[test]
    fn test_key_is_pure() {
        let a = IonFormKey::from_parts("PEPTIDE", None, 2, 799.359_964);
        let b = IonFormKey::from_parts("PEPTIDE", Some(""), 2, 799.359_964);
        let c = IonFormKey::from_parts("PEPTIDE", None, 2, 799.359_964);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_modified_sequence_takes_precedence() {
        let key = IonFormKey::from_parts("PEPTMIDE", Some("PEPTM[147]IDE"), 2, 950.4);
        assert_eq!(key.as_str(), "PEPTM[147]IDE#2#950.4000");
    }
}
