//! # Fake News Detector
//!
//! Fine-tune a pretrained BERT-family checkpoint to tell fake news from real news, evaluate it,
//! persist it and serve single-text predictions over HTTP.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;

/// HTTP endpoint
pub mod server;

#[cfg(test)]
mod testing;
