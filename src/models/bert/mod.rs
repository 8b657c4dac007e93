/// The model configuration
pub mod config;

/// BERT with a sequence classification head
pub mod model;

/// Pretrained checkpoint loading
pub mod loader;

pub use config::Config;
pub use loader::{load_checkpoint, Pretrained};
pub use model::{Model, ModelRecord};
