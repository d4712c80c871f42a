use serde::{
    Deserialize,
    Serialize,
};

/// Prefix that marks a protein name as a decoy entry, e.g. `rev_`.
///
/// NOTE: Matching is a plain prefix match on the protein name. Report columns
/// downstream rely on this exact behaviour, so `sp|rev_X` is NOT a decoy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DecoyTag(String);

impl Default for DecoyTag {
    fn default() -> Self {
        DecoyTag("rev_".to_string())
    }
}

impl std::fmt::Display for DecoyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DecoyTag {
    pub fn new(tag: impl Into<String>) -> Self {
        DecoyTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_decoy(&self, protein_name: &str) -> bool {
        // An empty tag would otherwise flag every protein as a decoy.
        !self.0.is_empty() && protein_name.starts_with(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoy_prefix() {
        let tag = DecoyTag::new("rev_");
        assert!(tag.is_decoy("rev_sp|Q9P243|ZFAT_HUMAN"));
        assert!(!tag.is_decoy("sp|Q9P243|ZFAT_HUMAN"));
        assert!(!tag.is_decoy("sp|rev_Q9P243|ZFAT_HUMAN"));
    }

    #[test]
    fn test_empty_tag_marks_nothing() {
        let tag = DecoyTag::new("");
        assert!(!tag.is_decoy("rev_sp|Q9P243|ZFAT_HUMAN"));
    }

    #[test]
    fn test_deserialize_transparent() {
        let tag: DecoyTag = serde_json::from_str("\"DECOY_\"").unwrap();
        assert_eq!(tag.as_str(), "DECOY_");
        assert!(tag.is_decoy("DECOY_sp|P02768|ALBU_HUMAN"));
    }
}
