//! Sync codes: export the whole collection, or merge one in from another device

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use gc_common::events::{GarageEvent, RecordSource};
use gc_common::sync_code;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::import::ImportResponse;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SyncCodeResponse {
    pub code: String,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SyncCodeRequest {
    pub code: String,
}

/// GET /api/sync
pub async fn export_sync_code(State(state): State<AppState>) -> ApiResult<Json<SyncCodeResponse>> {
    let store = state.store.read().await;
    let code = sync_code::encode(store.records()).map_err(gc_common::Error::from)?;
    Ok(Json(SyncCodeResponse {
        code,
        count: store.len(),
    }))
}

/// POST /api/sync
///
/// Decoded records are prepended. A code that fails to decode changes nothing.
pub async fn import_sync_code(
    State(state): State<AppState>,
    payload: Result<Json<SyncCodeRequest>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(request) = payload?;
    let records = sync_code::decode(&request.code).map_err(gc_common::Error::from)?;

    let mut store = state.store.write().await;
    let imported = store.add_batch(records).await?;

    if imported > 0 {
        state.event_bus.emit_saved(
            GarageEvent::RecordsAdded {
                count: imported,
                source: RecordSource::SyncCode,
                timestamp: Utc::now(),
            },
            store.len(),
        );
    }

    info!(imported, total = store.len(), "Sync code applied");
    Ok(Json(ImportResponse {
        imported,
        total: store.len(),
    }))
}
