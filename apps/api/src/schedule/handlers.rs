use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::schedule::ScheduleEntry;
use crate::state::AppState;

/// GET /api/v1/schedule
pub async fn handle_list_schedule(State(state): State<AppState>) -> Json<Vec<ScheduleEntry>> {
    let log = state.schedule.lock().await;
    Json(log.entries().to_vec())
}

/// POST /api/v1/schedule
pub async fn handle_add_schedule(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<ScheduleEntry>), AppError> {
    let Json(entry) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    state.schedule.lock().await.append(entry.clone());
    tracing::info!("Scheduled meeting on {} at {}", entry.date, entry.time);
    Ok((StatusCode::CREATED, Json(entry)))
}
