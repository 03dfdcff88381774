//! Distance Calculator
//!
//! Scores normalized shipment rows with the haversine distance between the
//! planned delivery point and the actual dropoff point.
//!
//! **Columns needed** (canonical schema):
//!   1. delivery_latitude / delivery_longitude
//!   2. dropoff_latitude / dropoff_longitude
//!   3. shipment_code (only to label excluded rows)
//!
//! **Columns added**: distance_km, distance_meters

use crate::error::Result;
use crate::utils::aliases::CanonicalColumn;
use crate::utils::geo::{distance_km_and_meters, GeoPoint};
use polars::prelude::*;

pub const DISTANCE_KM: &str = "distance_km";
pub const DISTANCE_METERS: &str = "distance_meters";

/// A normalized row dropped because a coordinate was missing
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedRow {
    /// Zero-based position in the normalized table
    pub row_index: usize,
    pub shipment_code: Option<String>,
}

impl ExcludedRow {
    /// Display label, numbered over data rows (header and blank sheet rows not counted)
    pub fn label(&self) -> String {
        match &self.shipment_code {
            Some(code) => format!("data row {}: {}", self.row_index + 1, code),
            None => format!("data row {}", self.row_index + 1),
        }
    }
}

/// Result of the distance stage
#[derive(Debug)]
pub struct DistanceReport {
    /// Rows with all four coordinates, input order, plus the distance columns
    pub scored: DataFrame,
    /// Rows left out of `scored`
    pub excluded: Vec<ExcludedRow>,
}

/// Compute per-row distances
///
/// Rows with any missing coordinate are not scored; they are returned in
/// `excluded` instead of being dropped silently.
pub fn compute_distances(normalized: &DataFrame) -> Result<DistanceReport> {
    let delivery_lat = normalized.column(CanonicalColumn::DeliveryLatitude.as_str())?.f64()?;
    let delivery_lng = normalized.column(CanonicalColumn::DeliveryLongitude.as_str())?.f64()?;
    let dropoff_lat = normalized.column(CanonicalColumn::DropoffLatitude.as_str())?.f64()?;
    let dropoff_lng = normalized.column(CanonicalColumn::DropoffLongitude.as_str())?.f64()?;
    let shipment_codes = normalized.column(CanonicalColumn::ShipmentCode.as_str())?.str()?;

    let n = normalized.height();
    let mut keep = Vec::with_capacity(n);
    let mut km_values = Vec::with_capacity(n);
    let mut meter_values = Vec::with_capacity(n);
    let mut excluded = Vec::new();

    for idx in 0..n {
        match (
            delivery_lat.get(idx),
            delivery_lng.get(idx),
            dropoff_lat.get(idx),
            dropoff_lng.get(idx),
        ) {
            (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => {
                let (km, meters) =
                    distance_km_and_meters(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2));
                keep.push(true);
                km_values.push(km);
                meter_values.push(meters);
            }
            _ => {
                keep.push(false);
                excluded.push(ExcludedRow {
                    row_index: idx,
                    shipment_code: shipment_codes.get(idx).map(|s| s.to_string()),
                });
            }
        }
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    let mut scored = normalized.filter(&mask)?;
    scored.with_column(Column::new(DISTANCE_KM.into(), km_values))?;
    scored.with_column(Column::new(DISTANCE_METERS.into(), meter_values))?;

    if excluded.is_empty() {
        tracing::info!("Scored {} rows", scored.height());
    } else {
        tracing::warn!(
            "Scored {} rows; excluded {} rows with missing coordinates",
            scored.height(),
            excluded.len()
        );
    }

    Ok(DistanceReport { scored, excluded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normalized(rows: &[(&str, Option<f64>, Option<f64>, Option<f64>, Option<f64>)]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "shipment_code".into(),
                rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            ),
            Column::new("delivery_latitude".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new("delivery_longitude".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("dropoff_latitude".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
            Column::new("dropoff_longitude".into(), rows.iter().map(|r| r.4).collect::<Vec<_>>()),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_coordinate_row_is_excluded_and_reported() {
        let df = normalized(&[
            ("SHP-1", Some(0.0), Some(0.0), Some(0.0), Some(1.0)),
            ("SHP-2", None, Some(0.0), Some(0.0), Some(1.0)),
            ("SHP-3", Some(0.0), Some(0.0), Some(1.0), Some(0.0)),
        ]);

        let report = compute_distances(&df).unwrap();
        assert_eq!(report.scored.height(), 2);
        assert_eq!(
            report.excluded,
            vec![ExcludedRow { row_index: 1, shipment_code: Some("SHP-2".to_string()) }]
        );

        let codes = report.scored.column("shipment_code").unwrap().str().unwrap();
        assert_eq!(codes.get(0), Some("SHP-1"));
        assert_eq!(codes.get(1), Some("SHP-3"));

        let km = report.scored.column(DISTANCE_KM).unwrap().f64().unwrap();
        assert_relative_eq!(km.get(0).unwrap(), 111.19, epsilon = 0.5);
        assert_relative_eq!(km.get(1).unwrap(), 111.19, epsilon = 0.5);
    }

    #[test]
    fn test_excluded_row_label_counts_data_rows() {
        let coded = ExcludedRow { row_index: 1, shipment_code: Some("S2".to_string()) };
        assert_eq!(coded.label(), "data row 2: S2");

        let uncoded = ExcludedRow { row_index: 0, shipment_code: None };
        assert_eq!(uncoded.label(), "data row 1");
    }

    #[test]
    fn test_meters_equal_km_times_1000_for_every_row() {
        let df = normalized(&[
            ("A", Some(-6.2088), Some(106.8456), Some(-6.9175), Some(107.6191)),
            ("B", Some(3.5952), Some(98.6722), Some(3.6), Some(98.7)),
            ("C", Some(10.0), Some(10.0), Some(10.0), Some(10.0)),
        ]);

        let report = compute_distances(&df).unwrap();
        let km = report.scored.column(DISTANCE_KM).unwrap().f64().unwrap();
        let m = report.scored.column(DISTANCE_METERS).unwrap().f64().unwrap();
        for idx in 0..report.scored.height() {
            assert_eq!(m.get(idx).unwrap(), km.get(idx).unwrap() * 1000.0);
        }
        assert!(km.get(2).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_output_columns_follow_canonical_order() {
        let df = normalized(&[("A", Some(0.0), Some(0.0), Some(0.0), Some(0.0))]);
        let report = compute_distances(&df).unwrap();
        let names: Vec<&str> = report
            .scored
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "shipment_code",
                "delivery_latitude",
                "delivery_longitude",
                "dropoff_latitude",
                "dropoff_longitude",
                "distance_km",
                "distance_meters"
            ]
        );
    }

    #[test]
    fn test_all_rows_excluded_gives_empty_scored_table() {
        let df = normalized(&[("A", None, None, None, None)]);
        let report = compute_distances(&df).unwrap();
        assert_eq!(report.scored.height(), 0);
        assert_eq!(report.scored.width(), 7);
        assert_eq!(report.excluded.len(), 1);
    }
}
