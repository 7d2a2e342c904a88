use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and the number of stored analyses. Never waits on the
/// store: while a batch is being committed `records` is null.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let records = state.store.try_lock().ok().map(|store| store.len());
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screener-api",
        "records": records
    }))
}
