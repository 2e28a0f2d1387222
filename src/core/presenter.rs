// src/core/presenter.rs
use crate::core::types::{CancerType, ModelOutput, PredictionResult, RiskLevel};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

/// Visual treatment of a risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Alert,
    Calm,
}

impl From<&RiskLevel> for Emphasis {
    fn from(level: &RiskLevel) -> Self {
        if level.is_high() {
            Emphasis::Alert
        } else {
            Emphasis::Calm
        }
    }
}

/// `0.823 -> "82.3%"`. Ties round away from zero, so `0.3425 -> "34.3%"`.
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", (p * 1000.0).round() / 10.0)
}

/// Renders the service timestamp in the viewer's local time.
/// Naive timestamps are taken as already local; anything unparseable is echoed back.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(TIMESTAMP_DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return local.format(TIMESTAMP_DISPLAY).to_string();
            }
        }
    }
    raw.to_string()
}

/// `"tnm_n" -> "Tnm N"`, `"pr-status" -> "Pr-Status"`.
/// Underscores become spaces; every word character that starts a word is uppercased.
pub fn field_label(field: &str) -> String {
    let mut label = String::with_capacity(field.len());
    let mut in_word = false;
    for c in field.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !in_word {
            label.push(c.to_ascii_uppercase());
        } else {
            label.push(c);
        }
        in_word = is_word;
    }
    label
}

/// `"core_ratio" -> "Enter core ratio"`
pub fn placeholder(field: &str) -> String {
    format!("Enter {}", field.replace('_', " "))
}

pub fn cancer_type_display(cancer_type: &CancerType) -> String {
    match cancer_type.as_str() {
        "LNSC" => "Lung Non-Small Cell Cancer".to_string(),
        "LSC" => "Lung Small Cell Cancer".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => format!("{}{} Cancer", first.to_uppercase(), chars.as_str()),
                None => String::new(),
            }
        }
    }
}

pub fn submit_label(submitting: bool) -> &'static str {
    if submitting {
        "Predicting..."
    } else {
        "Predict Metastasis Risk"
    }
}

/// Display-ready numbers for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelView {
    pub title: &'static str,
    pub metastasis: String,
    pub no_metastasis: String,
    pub risk_label: String,
    pub emphasis: Emphasis,
}

impl ModelView {
    pub fn new(title: &'static str, output: &ModelOutput) -> Self {
        Self {
            title,
            metastasis: format_probability(output.metastasis),
            no_metastasis: format_probability(output.no_metastasis),
            risk_label: output.risk_level.label().to_string(),
            emphasis: Emphasis::from(&output.risk_level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub models: Vec<ModelView>,
    pub generated_at: String,
}

impl ResultView {
    pub fn new(result: &PredictionResult) -> Self {
        let models = result
            .predictions
            .iter()
            .map(|(name, output)| ModelView::new(model_title(name), output))
            .collect();
        Self {
            models,
            generated_at: format!("Prediction generated at: {}", format_timestamp(&result.timestamp)),
        }
    }
}

fn model_title(name: &str) -> &'static str {
    match name {
        "logistic_regression" => "Logistic Regression",
        "random_forest" => "Random Forest",
        _ => "Model",
    }
}
