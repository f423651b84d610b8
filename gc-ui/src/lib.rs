//! gc-ui library - GarageCloud collection service
//!
//! HTTP API and embedded web UI over one shared collection store.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use gc_common::events::EventBus;
use gc_common::import::Importer;
use gc_common::placeholder::PlaceholderImages;
use gc_common::store::CollectionStore;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod image_search;

use image_search::ImageSearch;

/// Largest accepted request body (spreadsheet rows, uploaded photos)
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The collection; mutations hold the write lock for their whole
    /// compute, persist and swap sequence
    pub store: Arc<RwLock<CollectionStore>>,
    pub importer: Importer,
    pub placeholders: PlaceholderImages,
    /// Change notifications for SSE clients
    pub event_bus: EventBus,
    pub image_search: Arc<dyn ImageSearch>,
}

impl AppState {
    pub fn new(
        store: CollectionStore,
        placeholders: PlaceholderImages,
        image_search: Arc<dyn ImageSearch>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            importer: Importer::new(placeholders.clone()),
            placeholders,
            event_bus: EventBus::new(100),
            image_search,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route(
            "/api/records",
            get(api::list_records).post(api::create_record),
        )
        .route("/api/records/delete", post(api::delete_records))
        .route(
            "/api/records/:id",
            get(api::get_record).delete(api::delete_record),
        )
        .route("/api/records/:id/image", put(api::set_image))
        .route("/api/records/:id/image/upload", post(api::upload_image))
        .route("/api/records/:id/image/search", post(api::search_image))
        .route("/api/records/:id/image/google", get(api::google_image_link))
        .route("/api/import", post(api::import_rows))
        .route("/api/sync", get(api::export_sync_code).post(api::import_sync_code))
        .route("/api/stats", get(api::get_summary))
        .route("/api/stats/:field", get(api::get_field_stats))
        .route("/api/events", get(api::event_stream));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
