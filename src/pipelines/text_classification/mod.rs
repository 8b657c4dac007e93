/// Pipeline errors
pub mod error;

/// The binary label space
pub mod label;

/// Hyperparameters and run settings
pub mod config;

/// Common model traits for text classification
pub mod model;

/// The tokenization policy
pub mod tokenization;

/// Batcher
pub mod batcher;

/// Text Classification Items
pub mod item;

/// Encoding and batching of dataset splits
pub mod preprocess;

/// Learning rate schedule
pub mod schedule;

/// Gradient clipping
pub mod clipping;

/// Training
pub mod training;

/// Classification metrics
pub mod metrics;

/// Evaluation
pub mod evaluation;

/// Inference
pub mod inference;

/// Model persistence
pub mod artifacts;

/// The end-to-end train pipeline
pub mod pipeline;

pub use batcher::Batcher;
pub use config::{Settings, Training};
pub use error::{Error, Result};
pub use evaluation::{evaluate, Evaluation};
pub use inference::{infer, Detector, Prediction};
pub use item::Item;
pub use label::{Label, N_CLASSES};
pub use model::{Classifier, ModelConfig};
pub use pipeline::{train_pipeline, Report};
pub use tokenization::Tokenization;
pub use training::train;
