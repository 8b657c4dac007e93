use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// BERT and RoBERTa for text classification
pub mod bert;

/// Supported pretrained checkpoints
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Checkpoint {
    /// `bert-base-uncased`
    #[default]
    BertBaseUncased,

    /// `bert-base-cased`
    BertBaseCased,

    /// `roberta-base`
    RobertaBase,
}

lazy_static! {
    /// Checkpoints by their Hugging Face Hub name
    static ref CHECKPOINTS_BY_NAME: HashMap<&'static str, Checkpoint> = Checkpoint::ALL
        .iter()
        .map(|checkpoint| (checkpoint.name(), *checkpoint))
        .collect();
}

impl Checkpoint {
    /// Every supported checkpoint
    pub const ALL: [Checkpoint; 3] = [
        Checkpoint::BertBaseUncased,
        Checkpoint::BertBaseCased,
        Checkpoint::RobertaBase,
    ];

    /// The Hugging Face Hub repository of the checkpoint
    pub fn name(&self) -> &'static str {
        match self {
            Checkpoint::BertBaseUncased => "bert-base-uncased",
            Checkpoint::BertBaseCased => "bert-base-cased",
            Checkpoint::RobertaBase => "roberta-base",
        }
    }
}

impl TryFrom<&str> for Checkpoint {
    type Error = CheckpointError;

    /// Try to convert a Hub name to a Checkpoint
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CHECKPOINTS_BY_NAME
            .get(value.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| CheckpointError::Unknown(value.to_string()))
    }
}

impl Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Checkpoint Error
#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    /// No checkpoint found for the given string
    #[error("no checkpoint found for {0}, expected one of: bert-base-uncased, bert-base-cased, roberta-base")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_hub_names() {
        for checkpoint in Checkpoint::ALL {
            assert_eq!(Checkpoint::try_from(checkpoint.name()).unwrap(), checkpoint);
        }

        assert_eq!(
            Checkpoint::try_from("BERT-base-uncased").unwrap(),
            Checkpoint::BertBaseUncased
        );
    }

    #[test]
    fn rejects_unsupported_checkpoints() {
        let error = Checkpoint::try_from("distilbert-base-uncased").unwrap_err();

        assert!(error.to_string().contains("distilbert-base-uncased"));
    }
}
