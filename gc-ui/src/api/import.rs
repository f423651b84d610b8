//! Spreadsheet import
//!
//! The browser parses the workbook (first sheet, blank cells as "") and
//! posts the rows as a JSON array of objects keyed by column header.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use gc_common::events::{GarageEvent, RecordSource};
use gc_common::import::Importer;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub total: usize,
}

/// POST /api/import
pub async fn import_rows(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(payload) = payload?;
    let rows = Importer::parse_rows(payload).map_err(gc_common::Error::from)?;
    let records = state
        .importer
        .import_rows(&rows)
        .map_err(gc_common::Error::from)?;

    let mut store = state.store.write().await;
    let imported = store.add_batch(records).await?;

    state.event_bus.emit_saved(
        GarageEvent::RecordsAdded {
            count: imported,
            source: RecordSource::Spreadsheet,
            timestamp: Utc::now(),
        },
        store.len(),
    );

    info!(imported, total = store.len(), "Spreadsheet imported");
    Ok(Json(ImportResponse {
        imported,
        total: store.len(),
    }))
}
