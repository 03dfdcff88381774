//! Column Normalization
//!
//! Maps raw spreadsheet headers onto the five canonical columns and coerces
//! coordinate cells to `Float64`.
//!
//! Steps:
//! 1. Trim + lower-case every header, resolve through the alias table
//! 2. Fail if a canonical column is missing, or claimed by more than one header
//! 3. Project onto the canonical columns, in canonical order
//! 4. Parse coordinate cells; anything unparseable becomes null

use crate::error::{Result, ValidationError};
use crate::utils::aliases::{AliasTable, CanonicalColumn};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Normalize a raw table to the canonical schema
///
/// Headers the alias table does not know are dropped. A malformed coordinate
/// cell never fails the call; it becomes null and the row is excluded later by
/// the distance stage.
pub fn normalize_columns(raw: &DataFrame, aliases: &AliasTable) -> Result<DataFrame> {
    let mut sources: BTreeMap<CanonicalColumn, Vec<&Column>> = BTreeMap::new();

    for column in raw.get_columns() {
        let header = column.name().as_str();
        let resolved = aliases
            .resolve(header)
            .or_else(|| duplicate_base(header).and_then(|base| aliases.resolve(base)));
        match resolved {
            Some(canonical) => {
                tracing::debug!("Column '{}' -> {}", header, canonical);
                sources.entry(canonical).or_default().push(column);
            }
            None => tracing::debug!("Dropping unmapped column '{}'", header),
        }
    }

    let missing: Vec<String> = CanonicalColumn::ALL
        .iter()
        .filter(|c| !sources.contains_key(c))
        .map(|c| c.as_str().to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns {
            required: CanonicalColumn::required_names(),
            missing,
        });
    }

    if let Some((canonical, columns)) = sources.iter().find(|(_, cols)| cols.len() > 1) {
        return Err(ValidationError::AmbiguousColumns {
            canonical: canonical.as_str().to_string(),
            headers: columns.iter().map(|c| c.name().to_string()).collect(),
        });
    }

    let mut projected = Vec::with_capacity(CanonicalColumn::ALL.len());
    for canonical in CanonicalColumn::ALL {
        let source = sources[&canonical][0];
        let column = if canonical.is_coordinate() {
            coerce_coordinates(source, canonical.as_str())?
        } else {
            source
                .cast(&DataType::String)?
                .with_name(canonical.as_str().into())
        };
        projected.push(column);
    }

    Ok(DataFrame::new(projected)?)
}

/// Parse one coordinate cell; `None` for anything that is not a finite number
pub fn parse_coordinate(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Intake renames a repeated header `x` to `x_duplicated_<n>`; recover `x` so
/// the repeat counts as a second source for the same column.
fn duplicate_base(header: &str) -> Option<&str> {
    let (base, n) = header.rsplit_once("_duplicated_")?;
    (!n.is_empty() && n.chars().all(|c| c.is_ascii_digit())).then_some(base)
}

fn coerce_coordinates(source: &Column, name: &str) -> Result<Column> {
    let values: Float64Chunked = match source.dtype() {
        DataType::String => source
            .str()?
            .into_iter()
            .map(|cell| cell.and_then(parse_coordinate))
            .collect(),
        _ => {
            // Non-strict cast: values that cannot be represented become null
            let cast = source.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect()
        }
    };

    Ok(Column::from(values.with_name(name.into()).into_series()))
}
