use std::path::PathBuf;

/// Text Classification pipeline errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A dataset record is missing a required field
    #[error("record {row} of the {split} split has no `{field}` field")]
    MissingField {
        /// The split the record belongs to
        split: String,
        /// Zero-based record index within the split
        row: usize,
        /// The absent field
        field: &'static str,
    },

    /// A dataset record could not be parsed
    #[error("malformed record in the {split} split: {message}")]
    MalformedRecord {
        /// The split the record belongs to
        split: String,
        /// Parser message
        message: String,
    },

    /// A label outside of {0 = fake, 1 = real}
    #[error("label {0} is outside of the binary label space (0 = fake, 1 = real)")]
    UnknownLabel(i64),

    /// Predictions and reference labels are not aligned
    #[error("{predictions} predictions for {labels} labels")]
    LengthMismatch {
        /// Number of predictions
        predictions: usize,
        /// Number of reference labels
        labels: usize,
    },

    /// A hyperparameter is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text submitted for inference is unusable
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tokenizer failed to encode or could not be configured
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// A file or directory could not be read or written
    #[error("unable to access {path}: {message}")]
    Resource {
        /// The path involved
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A persisted model does not match the classification head
    #[error("incompatible model: {0}")]
    Incompatible(String),

    /// The loss diverged
    #[error("non-finite loss {loss} at step {step}")]
    NonFiniteLoss {
        /// One-based global step
        step: usize,
        /// The offending loss value
        loss: f64,
    },

    /// The gradients diverged
    #[error("non-finite gradient norm {norm} at step {step}")]
    NonFiniteGradient {
        /// One-based global step
        step: usize,
        /// The offending global norm
        norm: f64,
    },
}

impl Error {
    /// Build a resource error for the given path
    pub fn resource(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this is a data-validation failure
    pub fn is_data_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. }
                | Error::MalformedRecord { .. }
                | Error::UnknownLabel(_)
                | Error::LengthMismatch { .. }
        )
    }

    /// Whether this is an input-validation failure
    pub fn is_input_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Text Classification Result
pub type Result<T> = std::result::Result<T, Error>;
