//! # GarageCloud Common Library
//!
//! Collection pipeline shared by the GarageCloud services:
//! - Record model and field vocabulary
//! - Spreadsheet import and manual entry
//! - Collection store with SQLite persistence
//! - Sync codes for moving a collection between devices
//! - Search and statistics over the collection
//! - Configuration loading and change events

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod import;
pub mod model;
pub mod placeholder;
pub mod search;
pub mod stats;
pub mod store;
pub mod sync_code;

pub use error::{Error, Result};
pub use model::{Field, Record};
