//! Canonical column names and the alias table that maps spreadsheet headers
//! onto them.
//!
//! The table is a plain value handed to the normalizer. Defaults cover the
//! header spellings seen in operator exports; extra spellings can be merged in
//! from a JSON file:
//!
//! ```json
//! { "dropoff_latitude": ["lat_aktual"], "shipment_code": ["awb"] }
//! ```

use crate::error::{Result, ValidationError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// The five columns every shipment row must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalColumn {
    ShipmentCode,
    DeliveryLatitude,
    DeliveryLongitude,
    DropoffLatitude,
    DropoffLongitude,
}

impl CanonicalColumn {
    /// Canonical order; also the column order of normalized and exported tables.
    pub const ALL: [CanonicalColumn; 5] = [
        CanonicalColumn::ShipmentCode,
        CanonicalColumn::DeliveryLatitude,
        CanonicalColumn::DeliveryLongitude,
        CanonicalColumn::DropoffLatitude,
        CanonicalColumn::DropoffLongitude,
    ];

    pub const COORDINATES: [CanonicalColumn; 4] = [
        CanonicalColumn::DeliveryLatitude,
        CanonicalColumn::DeliveryLongitude,
        CanonicalColumn::DropoffLatitude,
        CanonicalColumn::DropoffLongitude,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalColumn::ShipmentCode => "shipment_code",
            CanonicalColumn::DeliveryLatitude => "delivery_latitude",
            CanonicalColumn::DeliveryLongitude => "delivery_longitude",
            CanonicalColumn::DropoffLatitude => "dropoff_latitude",
            CanonicalColumn::DropoffLongitude => "dropoff_longitude",
        }
    }

    pub fn is_coordinate(&self) -> bool {
        !matches!(self, CanonicalColumn::ShipmentCode)
    }

    /// Names of all canonical columns in canonical order
    pub fn required_names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and lower-case a raw header
pub fn canonicalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Many-to-one mapping: canonicalized alias → canonical column
#[derive(Debug, Clone)]
pub struct AliasTable {
    map: FxHashMap<String, CanonicalColumn>,
}

/// On-disk layout: canonical column → list of aliases
#[derive(Debug, Deserialize)]
struct AliasFile(BTreeMap<CanonicalColumn, Vec<String>>);

impl Default for AliasTable {
    fn default() -> Self {
        use CanonicalColumn::*;

        let groups: [(CanonicalColumn, &[&str]); 5] = [
            (ShipmentCode, &["shipment_code", "shipment"]),
            (
                DeliveryLatitude,
                &["delivery_lat", "delivery_latitude", "delivery_latitude_deg"],
            ),
            (
                DeliveryLongitude,
                &["delivery_lng", "delivery_long", "delivery_longitude"],
            ),
            (
                DropoffLatitude,
                &[
                    "actual_lat",
                    "actual_latitude",
                    "actual_dropoff_lat",
                    "dropoff_lat",
                    "dropoff_latitude",
                ],
            ),
            (
                DropoffLongitude,
                &[
                    "actual_lng",
                    "actual_longitude",
                    "actual_dropoff_long",
                    "dropoff_lng",
                    "dropoff_long",
                    "dropoff_longitude",
                ],
            ),
        ];

        let mut map = FxHashMap::default();
        for (canonical, aliases) in groups {
            for alias in aliases {
                map.insert(alias.to_string(), canonical);
            }
        }

        AliasTable { map }
    }
}

impl AliasTable {
    /// Table containing only the canonical names themselves
    pub fn canonical_only() -> Self {
        let map = CanonicalColumn::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), *c))
            .collect();
        AliasTable { map }
    }

    /// Add one alias. Re-adding an alias for the same column is a no-op;
    /// claiming it for a different column is an error.
    pub fn insert(&mut self, alias: &str, canonical: CanonicalColumn) -> Result<()> {
        let key = canonicalize_header(alias);
        if key.is_empty() {
            return Err(ValidationError::AliasConfig(format!(
                "empty alias for '{}'",
                canonical
            )));
        }

        match self.map.get(&key) {
            Some(existing) if *existing != canonical => Err(ValidationError::AliasConfig(format!(
                "alias '{}' is claimed by both '{}' and '{}'",
                key, existing, canonical
            ))),
            _ => {
                self.map.insert(key, canonical);
                Ok(())
            }
        }
    }

    /// Build a table from `(alias, canonical)` pairs on top of the canonical names
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, CanonicalColumn)>,
    {
        let mut table = Self::canonical_only();
        for (alias, canonical) in pairs {
            table.insert(alias, canonical)?;
        }
        Ok(table)
    }

    /// Load aliases from a JSON file
    ///
    /// With `replace_defaults` the result holds only the file's aliases (plus
    /// the canonical names); otherwise they are merged over the defaults.
    pub fn load(path: &Path, replace_defaults: bool) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ValidationError::AliasConfig(format!("failed to read {:?}: {}", path, e))
        })?;

        let file: AliasFile = serde_json::from_str(&contents).map_err(|e| {
            ValidationError::AliasConfig(format!("failed to parse {:?}: {}", path, e))
        })?;

        let mut table = if replace_defaults {
            Self::canonical_only()
        } else {
            Self::default()
        };

        for (canonical, aliases) in file.0 {
            for alias in aliases {
                table.insert(&alias, canonical)?;
            }
        }

        tracing::debug!("Loaded alias table from {:?} ({} aliases)", path, table.len());
        Ok(table)
    }

    /// Resolve a raw header (canonicalized here) to its canonical column
    pub fn resolve(&self, header: &str) -> Option<CanonicalColumn> {
        self.map.get(&canonicalize_header(header)).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Aliases grouped per canonical column, sorted (for help output)
    pub fn grouped(&self) -> BTreeMap<CanonicalColumn, Vec<String>> {
        let mut grouped: BTreeMap<CanonicalColumn, Vec<String>> = BTreeMap::new();
        for (alias, canonical) in &self.map {
            grouped.entry(*canonical).or_default().push(alias.clone());
        }
        for aliases in grouped.values_mut() {
            aliases.sort();
        }
        grouped
    }
}
