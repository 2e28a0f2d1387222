// Shared fake prediction service for integration tests.
#![allow(dead_code)]

use form_core::core::types::{AnswerSet, CancerType, FieldSchema, PredictResponse};
use form_core::error::ClientError;
use form_core::PredictionService;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// In-memory stand-in for the remote service. Calls can be held back
/// with gates to control the order in which responses land.
#[derive(Default)]
pub struct FakeService {
    pub types: Option<Vec<String>>,
    pub schemas: HashMap<String, FieldSchema>,
    pub predict_body: Option<String>,
    gates: Mutex<HashMap<String, Receiver<()>>>,
    pub submitted: Mutex<Vec<AnswerSet>>,
}

fn unavailable() -> ClientError {
    ClientError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_schema(mut self, cancer_type: &str, pairs: &[(&str, &str)]) -> Self {
        self.schemas
            .insert(cancer_type.to_string(), FieldSchema::from_pairs(pairs.iter().copied()));
        self
    }

    pub fn with_predict_body(mut self, body: &str) -> Self {
        self.predict_body = Some(body.to_string());
        self
    }

    /// Holds the call keyed by `key` until the returned sender fires.
    /// Schema calls are keyed by cancer type, predictions by "predict".
    pub fn gate(&self, key: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    fn pass_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(rx) = gate {
            let _ = rx.recv();
        }
    }
}

impl PredictionService for FakeService {
    fn list_cancer_types(&self) -> Result<Vec<CancerType>, ClientError> {
        let types = self.types.clone().ok_or_else(unavailable)?;
        Ok(types.into_iter().filter_map(CancerType::new).collect())
    }

    fn fetch_schema(&self, cancer_type: &CancerType) -> Result<FieldSchema, ClientError> {
        self.pass_gate(cancer_type.as_str());
        self.schemas
            .get(cancer_type.as_str())
            .cloned()
            .ok_or_else(unavailable)
    }

    fn predict(
        &self,
        _cancer_type: &CancerType,
        answers: &AnswerSet,
    ) -> Result<PredictResponse, ClientError> {
        self.pass_gate("predict");
        self.submitted.lock().unwrap().push(answers.clone());
        let body = self.predict_body.as_deref().ok_or_else(unavailable)?;
        Ok(serde_json::from_str(body)?)
    }
}

pub fn kind(id: &str) -> CancerType {
    CancerType::new(id).unwrap()
}

pub const HIGH_RISK_BODY: &str = r#"{
    "predictions": {
        "logistic_regression": {"metastasis": 0.823, "no_metastasis": 0.177, "risk_level": "HIGH"},
        "random_forest": {"metastasis": 0.31, "no_metastasis": 0.69, "risk_level": "LOW"}
    },
    "timestamp": "2024-05-01T10:15:30.123456"
}"#;
