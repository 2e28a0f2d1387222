// File: src/client.rs
use crate::config::Config;
use crate::core::types::{AnswerSet, CancerType, CancerTypeList, FieldSchema, PredictResponse};
use crate::error::ClientError;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

/// The three calls the form makes against the prediction service.
pub trait PredictionService: Send + Sync {
    fn list_cancer_types(&self) -> Result<Vec<CancerType>, ClientError>;

    fn fetch_schema(&self, cancer_type: &CancerType) -> Result<FieldSchema, ClientError>;

    /// A server-reported `{error}` is a successful call returning `PredictResponse::Rejected`.
    fn predict(
        &self,
        cancer_type: &CancerType,
        answers: &AnswerSet,
    ) -> Result<PredictResponse, ClientError>;
}

/// Blocking HTTP implementation.
pub struct HttpPredictionClient {
    config: Config,
    client: Client,
}

impl HttpPredictionClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Decodes a JSON body. Like the browser's `response.json()`, the status
/// code only matters when the body is not the JSON we expect.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text()?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::Status {
            status: status.as_u16(),
            body,
        }),
        Err(e) => Err(ClientError::Decode(e)),
    }
}

impl PredictionService for HttpPredictionClient {
    fn list_cancer_types(&self) -> Result<Vec<CancerType>, ClientError> {
        let url = self.config.cancer_types_url()?;
        log::debug!("GET {url}");
        let list: CancerTypeList = decode(self.client.get(url).send()?)?;
        let types: Vec<CancerType> = list.cancer_types.into_iter().filter_map(CancerType::new).collect();
        log::debug!("service offers {} cancer types", types.len());
        Ok(types)
    }

    fn fetch_schema(&self, cancer_type: &CancerType) -> Result<FieldSchema, ClientError> {
        let url = self.config.inputs_url(cancer_type)?;
        log::debug!("GET {url}");
        decode(self.client.get(url).send()?)
    }

    fn predict(
        &self,
        cancer_type: &CancerType,
        answers: &AnswerSet,
    ) -> Result<PredictResponse, ClientError> {
        let url = self.config.predict_url(cancer_type)?;
        log::debug!("POST {url} with {} answers", answers.len());
        let response = self.client.post(url).json(answers).send()?;
        decode(response)
    }
}
