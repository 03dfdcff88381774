//! Utility modules for the validation pipeline
//!
//! - Aliases: canonical column names and header synonyms
//! - Normalization: header mapping and coordinate coercion
//! - Geo: haversine distance

pub mod aliases;
pub mod normalization;
pub mod geo;

// Re-export commonly used types
pub use aliases::{AliasTable, CanonicalColumn, canonicalize_header};
pub use normalization::{normalize_columns, parse_coordinate};
pub use geo::{GeoPoint, haversine_km, distance_km_and_meters, EARTH_RADIUS_KM};
