//! Scoring Engine: deterministic keyword pass over extracted résumé text.
//!
//! Algorithm:
//! 1. Whole-word, case-insensitive scan for every skill term; add its weight.
//! 2. Same scan for every certification term, into the same running total.
//! 3. Clamp the total to 0..=100.
//! 4. Classify: ≥70 ready, 40–69 needs review, <40 not recommended.
//! 5. Name candidate = first line (only when the text has a line break).
//! 6. Years of experience = first "<n> year(s) of experience" capture.
//!
//! No I/O and no clock: identical text always produces an identical `ScoreResult`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scoring::keywords::{KeywordDictionary, KeywordTable};

pub const MAX_SCORE: u32 = 100;
pub const READY_THRESHOLD: u32 = 70;
pub const REVIEW_THRESHOLD: u32 = 40;

pub const NAME_NOT_FOUND: &str = "Name not found";
pub const EXPERIENCE_NOT_DETECTED: &str = "Not detected";

const EXPERIENCE_PATTERN: &str = r"(?i)(\d+)\s+years?\s+of\s+experience";

/// Recommendation class derived from the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    ReadyForInterview,
    NeedsReview,
    NotRecommended,
}

impl RecommendationStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= READY_THRESHOLD {
            RecommendationStatus::ReadyForInterview
        } else if score >= REVIEW_THRESHOLD {
            RecommendationStatus::NeedsReview
        } else {
            RecommendationStatus::NotRecommended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecommendationStatus::ReadyForInterview => "Ready for Interview",
            RecommendationStatus::NeedsReview => "Needs Review",
            RecommendationStatus::NotRecommended => "Not Recommended",
        }
    }

    /// Fixed justification per class. Describes the reason, never the number.
    pub fn justification(self) -> &'static str {
        match self {
            RecommendationStatus::ReadyForInterview => {
                "The score is high due to relevant skills and certifications."
            }
            RecommendationStatus::NeedsReview => {
                "The candidate has some of the skills, but the profile needs a closer review."
            }
            RecommendationStatus::NotRecommended => {
                "The résumé does not contain the key skills required."
            }
        }
    }
}

/// Output of one scoring pass. Maps onto `AnalysisRecord` minus narrative and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub candidate_name: String,
    pub score: u32,
    pub status: RecommendationStatus,
    pub justification: String,
    pub matched_skills: Vec<String>,
    pub matched_certifications: Vec<String>,
    pub experience_years: String,
}

/// Pure keyword scorer. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ResumeScorer {
    dictionary: KeywordDictionary,
    experience: Regex,
}

impl ResumeScorer {
    pub fn new(dictionary: KeywordDictionary) -> Self {
        Self {
            dictionary,
            experience: Regex::new(EXPERIENCE_PATTERN).expect("experience pattern is valid"),
        }
    }

    pub fn score(&self, text: &str) -> ScoreResult {
        let (skill_total, matched_skills) = scan_table(&self.dictionary.skills, text);
        let (cert_total, matched_certifications) =
            scan_table(&self.dictionary.certifications, text);

        let score = skill_total.saturating_add(cert_total).min(MAX_SCORE);
        let status = RecommendationStatus::from_score(score);

        ScoreResult {
            candidate_name: extract_candidate_name(text),
            score,
            status,
            justification: status.justification().to_string(),
            matched_skills,
            matched_certifications,
            experience_years: self.extract_experience_years(text),
        }
    }

    fn extract_experience_years(&self, text: &str) -> String {
        self.experience
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| EXPERIENCE_NOT_DETECTED.to_string())
    }
}

fn scan_table(table: &KeywordTable, text: &str) -> (u32, Vec<String>) {
    let mut total = 0_u32;
    let mut matched = Vec::new();
    for keyword in table.iter() {
        if keyword.is_found_in(text) {
            total = total.saturating_add(keyword.weight);
            matched.push(keyword.term.clone());
        }
    }
    (total, matched)
}

/// First line of the document, trimmed. Single-line text has no reliable name line.
fn extract_candidate_name(text: &str) -> String {
    match text.split_once('\n') {
        Some((first, _)) => first.trim().to_string(),
        None => NAME_NOT_FOUND.to_string(),
    }
}
