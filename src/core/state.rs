// File: src/core/state.rs
use crate::core::resolver::{resolve, ControlSpec};
use crate::core::types::{AnswerSet, CancerType, FieldSchema, PredictResponse, PredictionResult};
use crate::error::{ClientError, StoreError};

pub const CANCER_TYPES_FAILED: &str = "failed to fetch cancer types";
pub const SCHEMA_FAILED: &str = "failed to fetch input requirements";
pub const PREDICTION_FAILED: &str = "failed to get prediction";

/// Identifies one schema request. Only the ticket from the latest
/// selection may apply its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTicket {
    generation: u64,
    cancer_type: CancerType,
}

impl SchemaTicket {
    pub fn cancer_type(&self) -> &CancerType {
        &self.cancer_type
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a schema response changed the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    Applied,
    Failed,
    Stale,
}

/// Everything a submission needs, captured when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub cancer_type: CancerType,
    pub answers: AnswerSet,
    generation: u64,
}

impl SubmissionRequest {
    /// Selection generation the answers were collected under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The form's single source of truth. All mutation goes through the
/// transition methods below; the host serializes calls.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    cancer_types: Vec<CancerType>,
    selected: Option<CancerType>,
    schema: FieldSchema,
    answers: AnswerSet,
    prediction: Option<PredictionResult>,
    error: Option<String>,
    submitting: bool,
    generation: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancer_types(&self) -> &[CancerType] {
        &self.cancer_types
    }

    pub fn selected(&self) -> Option<&CancerType> {
        self.selected.as_ref()
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Resolved controls in display order.
    pub fn controls(&self) -> Vec<(ControlSpec, &str)> {
        self.schema
            .entries()
            .iter()
            .map(|e| (resolve(&e.field, &e.description), e.description.as_str()))
            .collect()
    }

    /// Schema fields still lacking a non-blank answer, in display order.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.schema
            .entries()
            .iter()
            .filter(|e| {
                self.answers
                    .get(&e.field)
                    .map_or(true, |v| v.trim().is_empty())
            })
            .map(|e| e.field.as_str())
            .collect()
    }

    /// Outcome of the one-off startup fetch.
    pub fn apply_cancer_types(&mut self, result: Result<Vec<CancerType>, ClientError>) {
        match result {
            Ok(types) => {
                log::debug!("loaded {} cancer types", types.len());
                self.cancer_types = types;
            }
            Err(e) => {
                log::warn!("cancer type list failed: {e}");
                self.cancer_types.clear();
                self.error = Some(CANCER_TYPES_FAILED.to_string());
            }
        }
    }

    /// Records the selection and hands out the ticket its schema fetch must carry.
    /// The visible schema and answers stay until that fetch lands.
    pub fn select_cancer_type(&mut self, cancer_type: CancerType) -> SchemaTicket {
        self.generation += 1;
        log::debug!("selected {cancer_type} (generation {})", self.generation);
        self.selected = Some(cancer_type.clone());
        SchemaTicket {
            generation: self.generation,
            cancer_type,
        }
    }

    /// Applies a schema response if its ticket is still current.
    pub fn apply_schema(
        &mut self,
        ticket: &SchemaTicket,
        result: Result<FieldSchema, ClientError>,
    ) -> SchemaOutcome {
        if ticket.generation != self.generation {
            log::warn!(
                "discarding schema for {} (generation {}, current {})",
                ticket.cancer_type,
                ticket.generation,
                self.generation
            );
            return SchemaOutcome::Stale;
        }
        match result {
            Ok(schema) => {
                log::debug!("schema for {} has {} fields", ticket.cancer_type, schema.len());
                self.answers.clear();
                self.prediction = None;
                self.error = None;
                self.schema = schema;
                SchemaOutcome::Applied
            }
            Err(e) => {
                log::warn!("schema fetch for {} failed: {e}", ticket.cancer_type);
                self.error = Some(SCHEMA_FAILED.to_string());
                SchemaOutcome::Failed
            }
        }
    }

    /// Writes one answer. Keys outside the schema are kept but never sent.
    pub fn answer_field(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        if !self.schema.contains(&field) {
            log::debug!("answer for '{field}' is not in the current schema");
        }
        self.answers.insert(field, value.into());
    }

    /// Starts a submission and raises the in-flight flag.
    pub fn begin_submission(&mut self) -> Result<SubmissionRequest, StoreError> {
        if self.submitting {
            return Err(StoreError::AlreadySubmitting);
        }
        let cancer_type = self.selected.clone().ok_or(StoreError::NoCancerType)?;
        let answers: AnswerSet = self
            .answers
            .iter()
            .filter(|(field, _)| self.schema.contains(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        if answers.is_empty() {
            return Err(StoreError::NoAnswers);
        }
        self.submitting = true;
        self.error = None;
        Ok(SubmissionRequest {
            cancer_type,
            answers,
            generation: self.generation,
        })
    }

    /// Lands a submission outcome: result and error replace each other.
    /// An outcome for a request made before the latest selection is dropped.
    /// Returns whether the outcome was applied.
    pub fn finish_submission(
        &mut self,
        request: &SubmissionRequest,
        result: Result<PredictResponse, ClientError>,
    ) -> bool {
        self.submitting = false;
        if request.generation != self.generation {
            log::warn!(
                "discarding prediction for {} (generation {}, current {})",
                request.cancer_type,
                request.generation,
                self.generation
            );
            return false;
        }
        match result {
            Ok(PredictResponse::Accepted(prediction)) => {
                for (model, output) in prediction.predictions.iter() {
                    if !output.is_consistent() {
                        log::warn!(
                            "{model} probabilities sum to {}",
                            output.metastasis + output.no_metastasis
                        );
                    }
                }
                self.prediction = Some(prediction);
                self.error = None;
            }
            Ok(PredictResponse::Rejected { error }) => {
                log::warn!("service rejected prediction: {error}");
                self.prediction = None;
                self.error = Some(error);
            }
            Err(e) => {
                log::warn!("prediction request failed: {e}");
                self.prediction = None;
                self.error = Some(PREDICTION_FAILED.to_string());
            }
        }
        true
    }
}
