//! Axum route handlers for the résumé analysis API.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::Local;
use serde::Serialize;

use crate::analysis::models::{AnalysisRecord, IngestOutcome, RecordFilter, UploadedFile};
use crate::analysis::orchestrator::ingest_batch;
use crate::analysis::store::StoreSummary;
use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::archive_accepted;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

/// POST /api/v1/resumes
///
/// Multipart upload; every part carrying a filename is one résumé. Files are analyzed
/// in order, then archived unless skipped as duplicates. Duplicates and unsupported
/// types come back under `skipped`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestOutcome>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().map(str::to_string);
        let content = field.bytes().await?;
        files.push(UploadedFile {
            name,
            mime_type,
            content,
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "upload contained no files".to_string(),
        ));
    }

    let today = Local::now().date_naive();
    let outcome = ingest_batch(
        &state.store,
        files.clone(),
        &state.scorer,
        state.summarizer.as_ref(),
        today,
    )
    .await?;

    archive_accepted(&state.config.upload_dir, &files, &outcome).await;

    Ok(Json(outcome))
}

/// GET /api/v1/resumes?status=&date=
pub async fn handle_list(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Json<Vec<AnalysisRecord>> {
    let store = state.store.lock().await;
    Json(store.filter(&filter))
}

/// GET /api/v1/resumes/:name
pub async fn handle_get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let store = state.store.lock().await;
    store
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No analysis for '{name}'")))
}

/// DELETE /api/v1/resumes/:name
///
/// Deleting a name that is not stored is a no-op reporting zero deletions.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut store = state.store.lock().await;
    let deleted = store.delete(&name)?;
    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/v1/summary
pub async fn handle_summary(State(state): State<AppState>) -> Json<StoreSummary> {
    let store = state.store.lock().await;
    Json(store.summary())
}
