/// Hugging Face utilities
pub mod hugging_face;

/// Device selection
pub mod device;

/// Renderer Utilities
pub mod renderer;
