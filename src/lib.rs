// src/lib.rs

pub mod c_api;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod session;

pub use crate::client::{HttpPredictionClient, PredictionService};
pub use crate::config::Config;
pub use crate::core::resolver::{resolve, ControlSpec};
pub use crate::core::state::FormState;
pub use crate::session::FormSession;
