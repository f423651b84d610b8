//! Collection browsing, manual entry and deletion

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use gc_common::events::{GarageEvent, RecordSource};
use gc_common::import::RawRow;
use gc_common::placeholder::PlaceholderImages;
use gc_common::{search, Record};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// A record plus the image URL the UI should show for it
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "displayImageUrl")]
    pub display_image_url: String,
}

impl RecordView {
    pub fn new(record: &Record, placeholders: &PlaceholderImages) -> Self {
        Self {
            display_image_url: record.display_image_url(placeholders),
            record: record.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Free-text filter over model, brand and year
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    /// Size of the whole collection
    pub total: usize,
    /// Number of records returned
    pub count: usize,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: usize,
    pub total: usize,
}

/// GET /api/records?q=
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<RecordListResponse> {
    let store = state.store.read().await;
    let term = params.q.unwrap_or_default();

    let records: Vec<RecordView> = search::filter(store.records(), &term)
        .into_iter()
        .map(|r| RecordView::new(r, &state.placeholders))
        .collect();

    Json(RecordListResponse {
        total: store.len(),
        count: records.len(),
        records,
    })
}

/// GET /api/records/:id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordView>> {
    let store = state.store.read().await;
    let record = store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("record {}", id)))?;
    Ok(Json(RecordView::new(record, &state.placeholders)))
}

/// POST /api/records
///
/// Body: field label → value. `Modello` is required.
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<RawRow>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordView>)> {
    let Json(form) = payload?;
    let record = state.importer.manual_record(&form)?;

    let mut store = state.store.write().await;
    store.add_one(record.clone()).await?;
    state.event_bus.emit_saved(
        GarageEvent::RecordsAdded {
            count: 1,
            source: RecordSource::Manual,
            timestamp: Utc::now(),
        },
        store.len(),
    );

    info!(id = %record.id, "Record added manually");
    Ok((
        StatusCode::CREATED,
        Json(RecordView::new(&record, &state.placeholders)),
    ))
}

/// DELETE /api/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let mut store = state.store.write().await;
    if !store.remove_one(&id).await? {
        return Err(ApiError::NotFound(format!("record {}", id)));
    }

    state.event_bus.emit_saved(
        GarageEvent::RecordsRemoved {
            count: 1,
            timestamp: Utc::now(),
        },
        store.len(),
    );

    Ok(Json(DeleteResponse {
        removed: 1,
        total: store.len(),
    }))
}

/// POST /api/records/delete
///
/// Unknown ids are ignored.
pub async fn delete_records(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let Json(request) = payload?;
    let ids: HashSet<String> = request.ids.into_iter().collect();

    let mut store = state.store.write().await;
    let removed = store.remove_many(&ids).await?;

    if removed > 0 {
        state.event_bus.emit_saved(
            GarageEvent::RecordsRemoved {
                count: removed,
                timestamp: Utc::now(),
            },
            store.len(),
        );
    }

    Ok(Json(DeleteResponse {
        removed,
        total: store.len(),
    }))
}
