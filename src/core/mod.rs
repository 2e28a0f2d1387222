// src/core/mod.rs
pub mod presenter;
pub mod resolver;
pub mod state;
pub mod types;
