//! Analysis Orchestrator: runs a batch of uploads through extraction, the narrative
//! summarizer and the keyword scorer, then appends the merged records to the store.
//!
//! Pipeline per file (input order):
//!   dedup by filename → detect kind → extract text → summarize (never fails) → score
//!
//! Analysis runs without holding the store lock; only the final commit (re-checked
//! dedup, append, one persist) does. If that write fails the batch is undone in
//! memory and the error is returned.

use std::collections::HashSet;

use anyhow::anyhow;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::analysis::models::{
    AnalysisRecord, IngestOutcome, SkipReason, SkippedFile, UploadedFile,
};
use crate::analysis::store::{ResultStore, StoreError};
use crate::errors::AppError;
use crate::extraction::{extract_text_blocking, DocumentKind, ExtractError};
use crate::scoring::ResumeScorer;
use crate::summary::{summarize_or_fallback, NarrativeSummarizer};

pub async fn ingest_batch(
    store: &Mutex<ResultStore>,
    files: Vec<UploadedFile>,
    scorer: &ResumeScorer,
    summarizer: &dyn NarrativeSummarizer,
    today: NaiveDate,
) -> Result<IngestOutcome, AppError> {
    let known = store.lock().await.names();
    let mut seen: HashSet<String> = HashSet::new();
    let mut outcome = IngestOutcome::default();
    let mut pending = Vec::new();

    for file in files {
        // Only the first file of a given name in a batch is considered.
        if known.contains(&file.name) || !seen.insert(file.name.clone()) {
            info!("Skipping {}: already analyzed", file.name);
            outcome.skipped.push(skipped(file.name, SkipReason::Duplicate));
            continue;
        }

        let Some(kind) = DocumentKind::detect(file.mime_type.as_deref(), &file.name) else {
            warn!(
                "Skipping {}: unsupported type {:?}",
                file.name, file.mime_type
            );
            outcome.skipped.push(skipped(file.name, SkipReason::UnsupportedType));
            continue;
        };

        let text = match extract_text_blocking(kind, file.content).await {
            Ok(text) => text,
            Err(ExtractError::Cancelled(e)) => {
                return Err(AppError::Internal(anyhow!(
                    "spawn_blocking failed while extracting {}: {e}",
                    file.name
                )));
            }
            Err(e) => {
                warn!("Skipping {}: text extraction failed: {e}", file.name);
                outcome
                    .skipped
                    .push(skipped(file.name, SkipReason::ExtractionFailed));
                continue;
            }
        };

        pending.push(analyze_document(file.name, text, scorer, summarizer, today).await);
    }

    let mut store = store.lock().await;
    commit_records(&mut store, pending, &mut outcome)?;
    Ok(outcome)
}

/// Appends analyzed records and persists once. Names stored by a concurrent batch
/// since the analysis started are skipped as duplicates.
fn commit_records(
    store: &mut ResultStore,
    records: Vec<AnalysisRecord>,
    outcome: &mut IngestOutcome,
) -> Result<(), StoreError> {
    let len_before = store.len();
    for record in records {
        if store.contains(&record.name) {
            info!("Skipping {}: stored by another upload", record.name);
            outcome.skipped.push(skipped(record.name, SkipReason::Duplicate));
            continue;
        }
        info!(
            "Analyzed {}: score={} status={}",
            record.name,
            record.score,
            record.status.label()
        );
        store.insert(record.clone());
        outcome.analyzed.push(record);
    }

    if !outcome.analyzed.is_empty() {
        if let Err(e) = store.persist() {
            store.truncate(len_before);
            outcome.analyzed.clear();
            return Err(e);
        }
    }
    Ok(())
}

/// Runs both analysis passes over one document's text and merges them.
pub async fn analyze_document(
    name: String,
    text: String,
    scorer: &ResumeScorer,
    summarizer: &dyn NarrativeSummarizer,
    today: NaiveDate,
) -> AnalysisRecord {
    let narrative = summarize_or_fallback(summarizer, &text).await;
    let score = scorer.score(&text);
    AnalysisRecord::assemble(name, score, narrative, text, today)
}

fn skipped(name: String, reason: SkipReason) -> SkippedFile {
    SkippedFile { name, reason }
}
