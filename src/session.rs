// File: src/session.rs
use crate::client::PredictionService;
use crate::core::state::{FormState, SchemaOutcome, SchemaTicket, SubmissionRequest};
use crate::core::types::{CancerType, FieldSchema, PredictResponse};
use crate::error::{ClientError, StoreError};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A finished network call, waiting to be applied to the form.
#[derive(Debug)]
pub enum Completion {
    CancerTypes(Result<Vec<CancerType>, ClientError>),
    Schema(SchemaTicket, Result<FieldSchema, ClientError>),
    Prediction(SubmissionRequest, Result<PredictResponse, ClientError>),
}

/// The form plus the service it talks to.
///
/// Calls either run inline (`load_cancer_types`, `select`, `submit`) or on a
/// worker thread (`request_*`), whose results come back through `poll`/`wait`
/// and are applied on the caller's thread, one at a time.
pub struct FormSession<S: PredictionService + 'static> {
    state: FormState,
    service: Arc<S>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<S: PredictionService + 'static> FormSession<S> {
    pub fn new(service: S) -> Self {
        Self::with_shared(Arc::new(service))
    }

    pub fn with_shared(service: Arc<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: FormState::new(),
            service,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn answer(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.state.answer_field(field, value);
    }

    pub fn load_cancer_types(&mut self) {
        let result = self.service.list_cancer_types();
        self.state.apply_cancer_types(result);
    }

    pub fn select(&mut self, cancer_type: CancerType) -> SchemaOutcome {
        let ticket = self.state.select_cancer_type(cancer_type);
        let result = self.service.fetch_schema(ticket.cancer_type());
        self.state.apply_schema(&ticket, result)
    }

    pub fn submit(&mut self) -> Result<(), StoreError> {
        let request = self.state.begin_submission()?;
        let result = self.service.predict(&request.cancer_type, &request.answers);
        self.state.finish_submission(&request, result);
        Ok(())
    }

    pub fn request_cancer_types(&self) {
        self.spawn(|service| Completion::CancerTypes(service.list_cancer_types()));
    }

    /// Starts a schema fetch in the background. Selecting again before it
    /// lands makes its response stale.
    pub fn request_schema(&mut self, cancer_type: CancerType) -> SchemaTicket {
        let ticket = self.state.select_cancer_type(cancer_type);
        let carried = ticket.clone();
        self.spawn(move |service| {
            let result = service.fetch_schema(carried.cancer_type());
            Completion::Schema(carried, result)
        });
        ticket
    }

    /// Starts a prediction in the background; refused while one is in flight.
    pub fn request_prediction(&mut self) -> Result<(), StoreError> {
        let request = self.state.begin_submission()?;
        self.spawn(move |service| {
            let result = service.predict(&request.cancer_type, &request.answers);
            Completion::Prediction(request, result)
        });
        Ok(())
    }

    fn spawn<F>(&self, call: F)
    where
        F: FnOnce(&S) -> Completion + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        thread::spawn(move || {
            if tx.send(call(&*service)).is_err() {
                log::debug!("session dropped before completion arrived");
            }
        });
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::CancerTypes(result) => self.state.apply_cancer_types(result),
            Completion::Schema(ticket, result) => {
                self.state.apply_schema(&ticket, result);
            }
            Completion::Prediction(request, result) => {
                self.state.finish_submission(&request, result);
            }
        }
    }

    /// Applies every completion that has already arrived. Returns how many.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for one completion and applies it.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply(completion);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}
