//! Dropoff Validator
//!
//! Checks uploaded shipment spreadsheets for deliveries whose actual dropoff
//! point is far from the planned delivery point.
//!
//! Layout:
//! - `data`: spreadsheet intake (Excel via calamine, CSV via Polars)
//! - `utils/`: alias table, column normalization, haversine
//! - `distance`: per-row distance scoring
//! - `pipeline`: normalize → score → threshold filter
//! - `export`: CSV export and table previews
//! - `server` / `web/`: upload page and result rendering (feature `web`)

pub mod config;
pub mod data;
pub mod distance;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod utils;

#[cfg(feature = "web")]
pub mod server;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use config::{validate_threshold, ServerConfig, ValidatorConfig, DEFAULT_MIN_DISTANCE_KM};
pub use data::{SheetFormat, UploadedSheet};
pub use distance::{compute_distances, DistanceReport, ExcludedRow};
pub use error::ValidationError;
pub use export::{preview, write_result_csv, TablePreview, RESULT_FILE_NAME};
pub use pipeline::{select_over_threshold, DropoffValidator, ValidationReport};
pub use utils::{AliasTable, CanonicalColumn};

#[cfg(feature = "web")]
pub use server::{create_router, AppState};
