//! Error taxonomy for one validation run
//!
//! Every variant renders a message meant for the operator: the web shell and
//! the CLI print `to_string()` verbatim.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Upload could not be parsed as a spreadsheet.
    #[error("Failed to read spreadsheet '{file_name}': {reason}")]
    FileRead { file_name: String, reason: String },

    /// Required canonical columns absent after alias mapping.
    #[error(
        "Required columns are incomplete.\n\
         Expected: {}\n\
         Missing: {}\n\
         Rename the spreadsheet headers or extend the alias table.",
        format_list(.required),
        format_list(.missing)
    )]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    /// Several source columns resolved to one canonical column.
    #[error(
        "Columns {} all map to '{canonical}'. Keep only one of them.",
        format_list(.headers)
    )]
    AmbiguousColumns {
        canonical: String,
        headers: Vec<String>,
    },

    #[error("Minimum distance must be between {min} and {max} km, got {value}")]
    InvalidThreshold { value: f64, min: f64, max: f64 },

    #[error("Alias configuration error: {0}")]
    AliasConfig(String),

    #[error("Table operation failed: {0}")]
    Table(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ValidationError {
    /// True for failures caused by the uploaded content or operator input,
    /// as opposed to internal table/IO failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ValidationError::FileRead { .. }
                | ValidationError::MissingColumns { .. }
                | ValidationError::AmbiguousColumns { .. }
                | ValidationError::InvalidThreshold { .. }
        )
    }
}

fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}

pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_both_sets() {
        let err = ValidationError::MissingColumns {
            required: vec!["shipment_code".into(), "dropoff_longitude".into()],
            missing: vec!["dropoff_longitude".into()],
        };
        let msg = err.to_string();

        assert!(msg.contains("Expected: ['shipment_code', 'dropoff_longitude']"));
        assert!(msg.contains("Missing: ['dropoff_longitude']"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_ambiguous_columns_message() {
        let err = ValidationError::AmbiguousColumns {
            canonical: "delivery_latitude".into(),
            headers: vec!["delivery_lat".into(), "Delivery_Latitude".into()],
        };
        assert_eq!(
            err.to_string(),
            "Columns ['delivery_lat', 'Delivery_Latitude'] all map to 'delivery_latitude'. Keep only one of them."
        );
    }
}
