use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::{RecommendationStatus, ScoreResult};

/// One analyzed résumé. `name` (the uploaded filename) is the unique key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub name: String,
    pub candidate_name: String,
    pub score: u32,
    pub status: RecommendationStatus,
    pub justification: String,
    pub matched_skills: Vec<String>,
    pub matched_certifications: Vec<String>,
    pub experience_years: String,
    pub narrative_summary: String,
    pub full_text: String,
    pub upload_date: NaiveDate,
}

impl AnalysisRecord {
    /// Merges the two independent analysis passes into one record.
    pub fn assemble(
        name: String,
        score: ScoreResult,
        narrative_summary: String,
        full_text: String,
        upload_date: NaiveDate,
    ) -> Self {
        Self {
            name,
            candidate_name: score.candidate_name,
            score: score.score,
            status: score.status,
            justification: score.justification,
            matched_skills: score.matched_skills,
            matched_certifications: score.matched_certifications,
            experience_years: score.experience_years,
            narrative_summary,
            full_text,
            upload_date,
        }
    }
}

/// A document received at the ingestion boundary.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub content: Bytes,
}

/// Both predicates are optional; supplied ones are ANDed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    pub status: Option<RecommendationStatus>,
    pub date: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        self.status.map_or(true, |s| record.status == s)
            && self.date.map_or(true, |d| record.upload_date == d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Duplicate,
    UnsupportedType,
    ExtractionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
}

/// Result of one batch: the new records in input order, plus what was passed over.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    pub analyzed: Vec<AnalysisRecord>,
    pub skipped: Vec<SkippedFile>,
}
