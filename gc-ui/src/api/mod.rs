//! HTTP API handlers for gc-ui

pub mod buildinfo;
pub mod health;
pub mod images;
pub mod import;
pub mod records;
pub mod sse;
pub mod stats;
pub mod sync;
pub mod ui;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use images::{google_image_link, search_image, set_image, upload_image};
pub use import::import_rows;
pub use records::{create_record, delete_record, delete_records, get_record, list_records};
pub use sse::event_stream;
pub use stats::{get_field_stats, get_summary};
pub use sync::{export_sync_code, import_sync_code};
pub use ui::{serve_app_js, serve_index};
