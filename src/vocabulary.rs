use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const US_JURISDICTIONS: &[(&str, &str)] = &[
    ("al", "Alabama"),
    ("ak", "Alaska"),
    ("az", "Arizona"),
    ("ar", "Arkansas"),
    ("ca", "California"),
    ("co", "Colorado"),
    ("ct", "Connecticut"),
    ("de", "Delaware"),
    ("dc", "District of Columbia"),
    ("fl", "Florida"),
    ("ga", "Georgia"),
    ("hi", "Hawaii"),
    ("id", "Idaho"),
    ("il", "Illinois"),
    ("in", "Indiana"),
    ("ia", "Iowa"),
    ("ks", "Kansas"),
    ("ky", "Kentucky"),
    ("la", "Louisiana"),
    ("me", "Maine"),
    ("md", "Maryland"),
    ("ma", "Massachusetts"),
    ("mi", "Michigan"),
    ("mn", "Minnesota"),
    ("ms", "Mississippi"),
    ("mo", "Missouri"),
    ("mt", "Montana"),
    ("ne", "Nebraska"),
    ("nv", "Nevada"),
    ("nh", "New Hampshire"),
    ("nj", "New Jersey"),
    ("nm", "New Mexico"),
    ("ny", "New York"),
    ("nc", "North Carolina"),
    ("nd", "North Dakota"),
    ("oh", "Ohio"),
    ("ok", "Oklahoma"),
    ("or", "Oregon"),
    ("pa", "Pennsylvania"),
    ("ri", "Rhode Island"),
    ("sc", "South Carolina"),
    ("sd", "South Dakota"),
    ("tn", "Tennessee"),
    ("tx", "Texas"),
    ("ut", "Utah"),
    ("vt", "Vermont"),
    ("va", "Virginia"),
    ("wa", "Washington"),
    ("wv", "West Virginia"),
    ("wi", "Wisconsin"),
    ("wy", "Wyoming"),
];

const CONTINUATION_WORDS: &[&str] = &["And", "and", "&", "Of", "of"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jurisdiction {
    pub abbreviation: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vocabulary {
    pub jurisdictions: Vec<Jurisdiction>,
    pub continuation_words: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            jurisdictions: US_JURISDICTIONS
                .iter()
                .map(|(abbreviation, name)| Jurisdiction {
                    abbreviation: abbreviation.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            continuation_words: CONTINUATION_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read vocabulary file {}", path.display()))?;
        let vocabulary: Vocabulary = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse vocabulary file {}", path.display()))?;

        if vocabulary.jurisdictions.is_empty() {
            bail!("vocabulary file {} has no jurisdictions", path.display());
        }

        Ok(vocabulary)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn is_continuation(&self, line: &str) -> bool {
        self.continuation_words
            .iter()
            .any(|word| !word.is_empty() && line.starts_with(word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_states_and_district() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.jurisdictions.len(), 51);
        let jurisdictions = &vocabulary.jurisdictions;
        let district = jurisdictions.iter().find(|j| j.abbreviation == "dc");
        let name = district.map(|j| j.name.as_str());
        assert_eq!(name, Some("District of Columbia"));
    }

    #[test]
    fn continuation_is_a_prefix_test() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_continuation("And Another Location"));
        assert!(vocabulary.is_continuation("& Grill"));
        assert!(vocabulary.is_continuation("of the Sea"));
        assert!(!vocabulary.is_continuation("Another Location"));
    }

    #[test]
    fn load_reads_json_override() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("vocab.json");
        let json = r#"{
            "jurisdictions": [{"abbreviation": "on", "name": "Ontario"}],
            "continuation_words": ["Et"]
        }"#;
        fs::write(&path, json).expect("vocabulary file should be written");

        let vocabulary = Vocabulary::load(&path).expect("vocabulary should load");
        assert_eq!(vocabulary.jurisdictions[0].name, "Ontario");
        assert!(vocabulary.is_continuation("Et cetera"));
        assert!(!vocabulary.is_continuation("And more"));
    }

    #[test]
    fn load_rejects_empty_jurisdictions() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("empty.json");
        let json = r#"{"jurisdictions": [], "continuation_words": []}"#;
        fs::write(&path, json).expect("vocabulary file should be written");
        assert!(Vocabulary::load(&path).is_err());
    }
}
