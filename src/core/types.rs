// src/core/types.rs
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Server-defined cancer category, e.g. "LNSC" or "kidney".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancerType(String);

impl CancerType {
    /// Returns `None` for an empty or whitespace-only identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `GET /cancer-types`.
#[derive(Debug, Clone, Deserialize)]
pub struct CancerTypeList {
    pub cancer_types: Vec<String>,
}

/// One required field and its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub field: String,
    pub description: String,
}

/// Ordered field -> description mapping for one cancer type.
/// Order is the server's document order and is the display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    entries: Vec<FieldEntry>,
}

impl FieldSchema {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut schema = Self::default();
        for (field, description) in pairs {
            schema.insert(field.into(), description.into());
        }
        schema
    }

    /// A repeated key keeps its first position and takes the later description.
    fn insert(&mut self, field: String, description: String) {
        match self.entries.iter_mut().find(|e| e.field == field) {
            Some(existing) => existing.description = description,
            None => self.entries.push(FieldEntry { field, description }),
        }
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    pub fn description(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for FieldSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = FieldSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field id to description")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FieldSchema, A::Error> {
                let mut schema = FieldSchema::default();
                while let Some((field, value)) = map.next_entry::<String, serde_json::Value>()? {
                    // Non-string descriptions carry no hints; they resolve to free text.
                    let description = match value {
                        serde_json::Value::String(s) => s,
                        _ => String::new(),
                    };
                    schema.insert(field, description);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// Field id -> entered value. Serialized as the `POST /predict` body.
pub type AnswerSet = BTreeMap<String, String>;

/// Binary risk label produced by a model: "HIGH" or anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    High,
    Other(String),
}

impl RiskLevel {
    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High)
    }

    pub fn label(&self) -> &str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Other(label) => label,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(label: String) -> Self {
        if label == "HIGH" {
            RiskLevel::High
        } else {
            RiskLevel::Other(label)
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.label().to_string()
    }
}

/// Output of one trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub metastasis: f64,
    pub no_metastasis: f64,
    pub risk_level: RiskLevel,
}

pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

impl ModelOutput {
    /// The two probabilities must be complementary.
    pub fn is_consistent(&self) -> bool {
        (self.metastasis + self.no_metastasis - 1.0).abs() <= PROBABILITY_TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPredictions {
    pub logistic_regression: ModelOutput,
    pub random_forest: ModelOutput,
}

impl ModelPredictions {
    /// Models in display order, keyed by their wire name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ModelOutput)> {
        [
            ("logistic_regression", &self.logistic_regression),
            ("random_forest", &self.random_forest),
        ]
        .into_iter()
    }
}

/// Successful body of `POST /predict/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predictions: ModelPredictions,
    /// ISO-8601 generation time as sent by the service.
    pub timestamp: String,
}

/// Either shape the predict endpoint may answer with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Rejected { error: String },
    Accepted(PredictionResult),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_keeps_document_order() {
        let schema: FieldSchema =
            serde_json::from_str(r#"{"zeta": "Z (number)", "alpha": "A", "mid": "(Yes, No)"}"#)
                .unwrap();
        let fields: Vec<&str> = schema.entries().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.description("mid"), Some("(Yes, No)"));
    }

    #[test]
    fn non_string_description_becomes_empty() {
        let schema: FieldSchema = serde_json::from_str(r#"{"age": 5, "sex": null}"#).unwrap();
        assert_eq!(schema.description("age"), Some(""));
        assert_eq!(schema.description("sex"), Some(""));
    }

    #[test]
    fn cancer_type_rejects_blank() {
        assert!(CancerType::new("").is_none());
        assert!(CancerType::new("  ").is_none());
        assert_eq!(CancerType::new("LNSC").unwrap().as_str(), "LNSC");
    }

    #[test]
    fn predict_response_error_shape() {
        let resp: PredictResponse =
            serde_json::from_str(r#"{"error": "missing field: sex"}"#).unwrap();
        assert_eq!(
            resp,
            PredictResponse::Rejected {
                error: "missing field: sex".to_string()
            }
        );
    }

    #[test]
    fn predict_response_success_shape() {
        let body = r#"{
            "predictions": {
                "logistic_regression": {"metastasis": 0.823, "no_metastasis": 0.177, "risk_level": "HIGH"},
                "random_forest": {"metastasis": 0.2, "no_metastasis": 0.8, "risk_level": "LOW"}
            },
            "timestamp": "2024-05-01T10:00:00"
        }"#;
        let PredictResponse::Accepted(result) = serde_json::from_str::<PredictResponse>(body).unwrap() else {
            panic!("expected a prediction");
        };
        assert!(result.predictions.logistic_regression.risk_level.is_high());
        assert_eq!(
            result.predictions.random_forest.risk_level,
            RiskLevel::Other("LOW".to_string())
        );
        assert!(result.predictions.iter().all(|(_, m)| m.is_consistent()));
    }
}
