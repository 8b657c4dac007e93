use std::path::PathBuf;

use burn::{tensor::backend::Backend, LearningRate};
use derive_new::new;

use crate::models::Checkpoint;

use super::{Error, Result};

/// Hyperparameters and locations for a fine-tuning run
#[derive(burn::config::Config, Debug)]
pub struct Training {
    /// The pretrained checkpoint to fine-tune
    #[config(default = "Checkpoint::BertBaseUncased")]
    pub checkpoint: Checkpoint,

    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 3)]
    pub num_epochs: usize,

    /// Peak learning rate, reached at the end of warmup
    #[config(default = 2e-5)]
    pub learning_rate: LearningRate,

    /// AdamW weight decay
    #[config(default = 0.0)]
    pub weight_decay: f32,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Steps over which the learning rate ramps up from zero
    #[config(default = 0)]
    pub warmup_steps: usize,

    /// Upper bound for the global gradient norm
    #[config(default = 1.0)]
    pub max_grad_norm: f64,

    /// Dropout rate
    #[config(default = 0.1)]
    pub hidden_dropout_prob: f64,

    /// Seed for shuffling the training batches
    #[config(default = 42)]
    pub seed: u64,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,

    /// The directory trained models are saved under
    #[config(default = "\"models\".to_string()")]
    pub models_dir: String,

    /// The name the trained model is saved as
    #[config(default = "\"fake_news_detector\".to_string()")]
    pub model_name: String,
}

impl Training {
    /// Reject hyperparameters no run can be built from
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".to_string()));
        }

        if self.num_epochs == 0 {
            return Err(Error::InvalidConfig("num_epochs must be positive".to_string()));
        }

        Ok(())
    }

    /// The directory holding the artifacts of the named model
    pub fn artifact_dir(&self) -> PathBuf {
        PathBuf::from(&self.models_dir).join(&self.model_name)
    }
}

/// Settings shared by every stage of a run
#[derive(Clone, Debug, new)]
pub struct Settings<B: Backend> {
    /// Training hyperparameters
    pub training: Training,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_follow_the_reference_run() {
        let config = Training::new();

        assert_eq!(config.batch_size, 32);
        assert_eq!(config.num_epochs, 3);
        assert_eq!(config.learning_rate, 2e-5);
        assert_eq!(config.weight_decay, 0.0);
        assert_eq!(config.warmup_steps, 0);
        assert_eq!(config.max_grad_norm, 1.0);
        assert_eq!(config.checkpoint, Checkpoint::BertBaseUncased);
        assert_eq!(
            config.artifact_dir(),
            PathBuf::from("models").join("fake_news_detector")
        );
    }

    #[test]
    fn rejects_empty_batches_and_runs() {
        assert!(Training::new().validate().is_ok());

        for config in [
            Training::new().with_batch_size(0),
            Training::new().with_num_epochs(0),
        ] {
            let error = config.validate().unwrap_err();
            assert!(matches!(error, Error::InvalidConfig(_)), "{error}");
        }
    }

    #[test]
    fn reads_yaml_overrides() {
        let yaml = "\
checkpoint: RobertaBase
batch_size: 8
num_epochs: 1
learning_rate: 0.0001
weight_decay: 0.01
adam_epsilon: 1.0e-8
warmup_steps: 10
max_grad_norm: 0.5
hidden_dropout_prob: 0.1
seed: 7
data_dir: /tmp/data
models_dir: /tmp/models
model_name: detector
";

        let config: Training = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.checkpoint, Checkpoint::RobertaBase);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.warmup_steps, 10);
        assert_eq!(config.artifact_dir(), PathBuf::from("/tmp/models/detector"));
    }
}
