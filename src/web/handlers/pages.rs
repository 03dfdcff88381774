// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse};

use crate::config::{validate_threshold, MIN_DISTANCE_LOWER_KM, MIN_DISTANCE_UPPER_KM};
use crate::distance::ExcludedRow;
use crate::export::{TablePreview, RESULT_FILE_NAME};
use crate::pipeline::ValidationReport;
use crate::server::{AppError, AppState};

const TITLE: &str = "Delivery vs Actual Dropoff Check";

/// Render a template, falling back to the error text
pub fn render<T: Template>(template: &T) -> String {
    template
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e))
}

// ============================================================================
// Upload Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub min_km: f64,
    pub min_km_lower: f64,
    pub min_km_upper: f64,
    pub error: Option<String>,
    pub info: Option<String>,
}

impl HomeTemplate {
    pub fn new(min_km: f64) -> Self {
        Self {
            title: TITLE.to_string(),
            min_km,
            min_km_lower: MIN_DISTANCE_LOWER_KM,
            min_km_upper: MIN_DISTANCE_UPPER_KM,
            error: None,
            info: None,
        }
    }

    pub fn with_error(min_km: f64, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::new(min_km)
        }
    }

    pub fn with_info(min_km: f64, message: &str) -> Self {
        Self {
            info: Some(message.to_string()),
            ..Self::new(min_km)
        }
    }
}

pub async fn home_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = HomeTemplate::new(state.validator.config().default_threshold_km);
    Html(render(&template))
}

// ============================================================================
// Result Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/result.html")]
pub struct ResultTemplate {
    pub title: String,
    pub source_name: String,
    pub threshold_label: String,
    pub result_count_label: String,
    pub raw_preview: TablePreview,
    pub normalized_preview: TablePreview,
    pub result_preview: TablePreview,
    pub excluded_labels: Vec<String>,
    pub download_href: Option<String>,
    pub download_name: String,
}

impl ResultTemplate {
    pub fn from_report(source_name: &str, report: &ValidationReport) -> crate::error::Result<Self> {
        let download_href = if report.has_results() {
            let csv = report.result_csv()?;
            let encoded = urlencoding::encode_binary(&csv);
            Some(format!("data:text/csv;charset=utf-8,{}", encoded))
        } else {
            None
        };

        let excluded_labels = report.excluded.iter().map(ExcludedRow::label).collect();

        Ok(Self {
            title: TITLE.to_string(),
            source_name: source_name.to_string(),
            threshold_label: format!("{:.2}", report.threshold_km),
            result_count_label: format_count(report.result_count()),
            raw_preview: report.raw_preview.clone(),
            normalized_preview: report.normalized_preview.clone(),
            result_preview: report.result_preview()?,
            excluded_labels,
            download_href,
            download_name: RESULT_FILE_NAME.to_string(),
        })
    }
}

/// Accepts multipart fields `file` and `min_km`
pub async fn validate_page(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let default_km = state.validator.config().default_threshold_km;
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut min_km_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    upload = Some((file_name, bytes.to_vec()));
                }
            }
            Some("min_km") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
                min_km_field = Some(text);
            }
            _ => {}
        }
    }

    let min_km = match min_km_field.as_deref().map(str::trim) {
        None | Some("") => default_km,
        Some(text) => text
            .parse::<f64>()
            .map_err(|_| AppError::BadRequest(format!("min_km is not a number: '{}'", text)))?,
    };
    let min_km = validate_threshold(min_km).map_err(|e| AppError::from_validation(e, default_km))?;

    let Some((file_name, bytes)) = upload else {
        let page = HomeTemplate::with_info(min_km, "Upload a spreadsheet above to start checking.");
        return Ok(Html(render(&page)));
    };

    tracing::info!("Validating upload '{}' ({} bytes, > {} km)", file_name, bytes.len(), min_km);

    let report = state
        .validator
        .validate_upload(&file_name, &bytes, min_km)
        .map_err(|e| AppError::from_validation(e, min_km))?;

    let page = ResultTemplate::from_report(&file_name, &report)
        .map_err(|e| AppError::from_validation(e, min_km))?;

    Ok(Html(render(&page)))
}

/// 12345 -> "12,345"
fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
