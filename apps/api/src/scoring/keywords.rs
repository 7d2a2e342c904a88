//! Keyword Dictionary: the weighted skill and certification terms the scorer looks for.
//!
//! Each term carries a precompiled case-insensitive whole-word pattern, so "SQL"
//! never fires inside "SQLite" and "Data" never fires inside "Database".

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SKILLS: &[(&str, u32)] = &[
    ("Python", 20),
    ("SQL", 20),
    ("Excel", 10),
    ("Power BI", 15),
    ("Logistics", 5),
    ("Data", 10),
    ("Analysis", 10),
    ("Marketing", 5),
    ("Sales", 5),
    ("Customer Service", 5),
    ("HR", 5),
];

const DEFAULT_CERTIFICATIONS: &[(&str, u32)] = &[
    ("PMP", 15),
    ("Scrum", 10),
    ("AWS", 20),
    ("AZ-900", 10),
    ("Google Cloud", 15),
];

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("Failed to read keyword file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyword file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Keyword terms must not be empty")]
    EmptyTerm,

    #[error("Invalid pattern for term '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}

/// A single weighted term with its whole-word matcher.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub term: String,
    pub weight: u32,
    pattern: Regex,
}

impl Keyword {
    pub fn new(term: &str, weight: u32) -> Result<Self, KeywordError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(KeywordError::EmptyTerm);
        }
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).map_err(
            |source| KeywordError::Pattern {
                term: term.to_string(),
                source,
            },
        )?;
        Ok(Self {
            term: term.to_string(),
            weight,
            pattern,
        })
    }

    pub fn is_found_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered term → weight table. Iteration order is insertion order, which keeps
/// matched-term lists stable across runs.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    entries: Vec<Keyword>,
}

impl KeywordTable {
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, KeywordError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut entries: Vec<Keyword> = Vec::new();
        for (term, weight) in pairs {
            let keyword = Keyword::new(term, weight)?;
            // Case-insensitive duplicates would double count the same match.
            if entries
                .iter()
                .any(|k| k.term.eq_ignore_ascii_case(&keyword.term))
            {
                continue;
            }
            entries.push(keyword);
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Skills and certifications, scored into the same running total.
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    pub skills: KeywordTable,
    pub certifications: KeywordTable,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(default)]
    skills: BTreeMap<String, u32>,
    #[serde(default)]
    certifications: BTreeMap<String, u32>,
}

impl KeywordDictionary {
    #[cfg(test)]
    pub fn new(skills: KeywordTable, certifications: KeywordTable) -> Self {
        Self {
            skills,
            certifications,
        }
    }

    /// Built-in recruiter dictionary.
    pub fn builtin() -> Result<Self, KeywordError> {
        Ok(Self {
            skills: KeywordTable::from_pairs(DEFAULT_SKILLS.iter().copied())?,
            certifications: KeywordTable::from_pairs(DEFAULT_CERTIFICATIONS.iter().copied())?,
        })
    }

    /// Loads `{"skills": {...}, "certifications": {...}}` from disk.
    /// Terms in a JSON object have no meaningful order, so they are kept sorted.
    pub fn from_json_file(path: &Path) -> Result<Self, KeywordError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, KeywordError> {
        let file: KeywordFile = serde_json::from_str(raw)?;
        Ok(Self {
            skills: KeywordTable::from_pairs(file.skills.iter().map(|(t, w)| (t.as_str(), *w)))?,
            certifications: KeywordTable::from_pairs(
                file.certifications.iter().map(|(t, w)| (t.as_str(), *w)),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary_weights() {
        let dict = KeywordDictionary::builtin().unwrap();
        assert_eq!(dict.skills.len(), 11);
        assert_eq!(dict.certifications.len(), 5);
        let python = dict.skills.iter().find(|k| k.term == "Python").unwrap();
        assert_eq!(python.weight, 20);
    }

    #[test]
    fn test_whole_word_rejects_longer_token() {
        let sql = Keyword::new("SQL", 20).unwrap();
        assert!(!sql.is_found_in("Worked with SQLite daily"));
        assert!(sql.is_found_in("Worked with sql daily"));
    }

    #[test]
    fn test_data_does_not_match_database() {
        let data = Keyword::new("Data", 10).unwrap();
        assert!(!data.is_found_in("Database administrator"));
        assert!(data.is_found_in("Data, pipelines and reports"));
    }

    #[test]
    fn test_hyphenated_and_multiword_terms() {
        let az = Keyword::new("AZ-900", 10).unwrap();
        assert!(az.is_found_in("Certified: az-900 (2023)"));
        let gcp = Keyword::new("Google Cloud", 15).unwrap();
        assert!(gcp.is_found_in("Deployed on Google Cloud Run"));
        assert!(!gcp.is_found_in("Google Cloudflare"));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let cpp = Keyword::new("C.", 5).unwrap();
        assert!(!cpp.is_found_in("CX"));
    }

    #[test]
    fn test_empty_term_rejected() {
        assert!(matches!(Keyword::new("  ", 5), Err(KeywordError::EmptyTerm)));
    }

    #[test]
    fn test_duplicate_terms_collapse() {
        let table = KeywordTable::from_pairs([("Python", 20), ("python", 5)]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().weight, 20);
    }

    #[test]
    fn test_from_json_str() {
        let dict = KeywordDictionary::from_json_str(
            r#"{"skills": {"Rust": 30, "Go": 10}, "certifications": {"CKA": 25}}"#,
        )
        .unwrap();
        let skills: Vec<_> = dict.skills.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(skills, vec!["Go", "Rust"]);
        assert_eq!(dict.certifications.len(), 1);
    }

    #[test]
    fn test_from_json_str_negative_weight_rejected() {
        let result = KeywordDictionary::from_json_str(r#"{"skills": {"Rust": -3}}"#);
        assert!(matches!(result, Err(KeywordError::Parse(_))));
    }
}
