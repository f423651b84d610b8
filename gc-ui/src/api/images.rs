//! Record photos: direct URL, upload, reference search and Google link

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use gc_common::events::GarageEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::records::RecordView;
use crate::error::{ApiError, ApiResult};
use crate::image_search::{google_images_url, PhotoQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetImageRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImageSearchResponse {
    pub id: String,
    pub url: String,
    /// False when the record was deleted while the search ran
    pub applied: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
}

/// Store `url` as the photo of record `id`
async fn apply_image(state: &AppState, id: &str, url: String) -> ApiResult<bool> {
    let mut store = state.store.write().await;
    let updated = store.update_image(id, url).await?;

    if updated {
        state.event_bus.emit_saved(
            GarageEvent::ImageUpdated {
                id: id.to_string(),
                timestamp: Utc::now(),
            },
            store.len(),
        );
    }
    Ok(updated)
}

async fn record_view(state: &AppState, id: &str) -> ApiResult<Json<RecordView>> {
    let store = state.store.read().await;
    store
        .get(id)
        .map(|r| Json(RecordView::new(r, &state.placeholders)))
        .ok_or_else(|| ApiError::NotFound(format!("record {}", id)))
}

/// PUT /api/records/:id/image
pub async fn set_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SetImageRequest>, JsonRejection>,
) -> ApiResult<Json<RecordView>> {
    let Json(request) = payload?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }

    if !apply_image(&state, &id, url.to_string()).await? {
        return Err(ApiError::NotFound(format!("record {}", id)));
    }
    record_view(&state, &id).await
}

/// POST /api/records/:id/image/upload
///
/// Raw image bytes; stored inline as a `data:` URL.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<RecordView>> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_default();

    if !mime.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "expected an image content type, got {:?}",
            mime
        )));
    }
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload".to_string()));
    }

    let url = data_url(&mime, &body);
    debug!(id, bytes = body.len(), mime, "Photo uploaded");

    if !apply_image(&state, &id, url).await? {
        return Err(ApiError::NotFound(format!("record {}", id)));
    }
    record_view(&state, &id).await
}

/// POST /api/records/:id/image/search
///
/// The search runs without holding the store lock; its result is applied
/// only if the record still exists.
pub async fn search_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ImageSearchResponse>> {
    let query = {
        let store = state.store.read().await;
        let record = store
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("record {}", id)))?;
        PhotoQuery::from(record)
    };

    let url = state.image_search.find_reference_photo(&query).await;
    let applied = apply_image(&state, &id, url.clone()).await?;
    if !applied {
        info!(id, "Record deleted during photo search, result discarded");
    }

    Ok(Json(ImageSearchResponse { id, url, applied }))
}

/// GET /api/records/:id/image/google
pub async fn google_image_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LinkResponse>> {
    let store = state.store.read().await;
    let record = store
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("record {}", id)))?;
    Ok(Json(LinkResponse {
        url: google_images_url(record),
    }))
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
