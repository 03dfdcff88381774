//! Dropoff Validator - coordinator for one upload
//!
//! Runs the three stages in order on a single in-memory table:
//! normalize columns → compute distances → keep rows above the threshold,
//! sorted by distance (descending).

use crate::config::ValidatorConfig;
use crate::data::UploadedSheet;
use crate::distance::{compute_distances, ExcludedRow, DISTANCE_KM};
use crate::error::Result;
use crate::export::{preview, write_result_csv, TablePreview, PREVIEW_ROWS};
use crate::utils::normalization::normalize_columns;
use polars::prelude::*;
use std::path::Path;

/// Main validator; holds only immutable configuration
pub struct DropoffValidator {
    config: ValidatorConfig,
}

/// Everything the shells render for one upload
#[derive(Debug)]
pub struct ValidationReport {
    pub threshold_km: f64,
    /// First rows of the sheet as uploaded
    pub raw_preview: TablePreview,
    /// First rows after column normalization
    pub normalized_preview: TablePreview,
    /// All rows with a computed distance, input order
    pub scored: DataFrame,
    /// Rows dropped for a missing coordinate
    pub excluded: Vec<ExcludedRow>,
    /// Rows with distance_km > threshold, farthest first
    pub result: DataFrame,
}

impl ValidationReport {
    pub fn result_count(&self) -> usize {
        self.result.height()
    }

    pub fn has_results(&self) -> bool {
        self.result.height() > 0
    }

    /// Full result set for display
    pub fn result_preview(&self) -> Result<TablePreview> {
        preview(&self.result, None)
    }

    /// Result set as the downloadable CSV
    pub fn result_csv(&self) -> Result<Vec<u8>> {
        write_result_csv(&self.result)
    }
}

impl DropoffValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        tracing::info!(
            "Dropoff validator ready ({} aliases, default threshold {} km)",
            config.aliases.len(),
            config.default_threshold_km
        );
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run the pipeline on a raw table
    ///
    /// The threshold is taken as given; shells validate the operator range
    /// with `config::validate_threshold` before calling.
    pub fn validate(&self, raw: &DataFrame, threshold_km: f64) -> Result<ValidationReport> {
        let raw_preview = preview(raw, Some(PREVIEW_ROWS))?;

        let normalized = normalize_columns(raw, &self.config.aliases)?;
        let normalized_preview = preview(&normalized, Some(PREVIEW_ROWS))?;
        tracing::info!("Normalized {} rows", normalized.height());

        let distances = compute_distances(&normalized)?;
        let result = select_over_threshold(&distances.scored, threshold_km)?;
        tracing::info!(
            "{} of {} scored rows exceed {} km",
            result.height(),
            distances.scored.height(),
            threshold_km
        );

        Ok(ValidationReport {
            threshold_km,
            raw_preview,
            normalized_preview,
            scored: distances.scored,
            excluded: distances.excluded,
            result,
        })
    }

    /// Read an uploaded file, then run the pipeline
    pub fn validate_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        threshold_km: f64,
    ) -> Result<ValidationReport> {
        let sheet = UploadedSheet::from_bytes(file_name, bytes)?;
        self.validate(&sheet.table, threshold_km)
    }

    pub fn validate_path(&self, path: &Path, threshold_km: f64) -> Result<ValidationReport> {
        let sheet = UploadedSheet::load(path)?;
        self.validate(&sheet.table, threshold_km)
    }
}

/// Keep rows with `distance_km` strictly above the threshold, farthest first
///
/// Sort is stable: equal distances keep their input order.
pub fn select_over_threshold(scored: &DataFrame, threshold_km: f64) -> Result<DataFrame> {
    let result = scored
        .clone()
        .lazy()
        .filter(col(DISTANCE_KM).gt(lit(threshold_km)))
        .sort(
            [DISTANCE_KM],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(codes: &[&str], km: &[f64]) -> DataFrame {
        let meters: Vec<f64> = km.iter().map(|v| v * 1000.0).collect();
        DataFrame::new(vec![
            Column::new("shipment_code".into(), codes),
            Column::new("distance_km".into(), km),
            Column::new("distance_meters".into(), meters),
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_is_strict_and_sorted_descending() {
        let df = scored(&["A", "B", "C", "D"], &[0.5, 1.0, 2.5, 1.5]);

        let result = select_over_threshold(&df, 1.0).unwrap();
        let codes: Vec<Option<&str>> = result
            .column("shipment_code")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some("C"), Some("D")]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let df = scored(&["first", "second", "third"], &[3.0, 5.0, 3.0]);

        let result = select_over_threshold(&df, 1.0).unwrap();
        let codes: Vec<Option<&str>> = result
            .column("shipment_code")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some("second"), Some("first"), Some("third")]);
    }

    #[test]
    fn test_nothing_above_threshold() {
        let df = scored(&["A"], &[0.2]);
        let result = select_over_threshold(&df, 1.0).unwrap();
        assert_eq!(result.height(), 0);
        assert_eq!(result.width(), 3);
    }
}
