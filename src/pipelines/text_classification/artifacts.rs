//! Persistence of trained models
//!
//! A trained model lives in its own directory:
//!
//! - `config.json`: the model configuration, including the class labels
//! - `model.mpk.gz`: the weights, written by the `CompactRecorder`
//! - `tokenizer.json`: the tokenizer, so loading needs no network access
//! - `training.json`: the hyperparameters the model was trained with

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{config::Config as _, module::Module, record::CompactRecorder, tensor::backend::Backend};
use log::info;
use tokenizers::Tokenizer;

use super::{Error, ModelConfig, Result, Training, N_CLASSES};

const CONFIG_FILE: &str = "config.json";
const MODEL_FILE: &str = "model";
const TOKENIZER_FILE: &str = "tokenizer.json";
const TRAINING_FILE: &str = "training.json";

/// Everything needed to run a trained model
pub struct Artifacts<B: Backend, C: ModelConfig> {
    /// The model configuration
    pub config: C,

    /// The trained model
    pub model: C::Model<B>,

    /// The tokenizer the model was trained with
    pub tokenizer: Tokenizer,

    /// The hyperparameters the model was trained with
    pub training: Training,
}

/// Save a trained model with its configuration and tokenizer
pub fn save<B, C>(
    dir: &Path,
    config: &C,
    model: C::Model<B>,
    tokenizer: &Tokenizer,
    training: &Training,
) -> Result<()>
where
    B: Backend,
    C: ModelConfig,
{
    fs::create_dir_all(dir).map_err(|e| Error::resource(dir, e))?;

    let path = dir.join(CONFIG_FILE);
    config.save(&path).map_err(|e| Error::resource(path, e))?;

    let path = dir.join(TRAINING_FILE);
    training.save(&path).map_err(|e| Error::resource(path, e))?;

    let path = dir.join(TOKENIZER_FILE);
    tokenizer
        .save(&path, false)
        .map_err(|e| Error::resource(path, e))?;

    let path = dir.join(MODEL_FILE);
    model
        .save_file(path.clone(), &CompactRecorder::new())
        .map_err(|e| Error::resource(path, e))?;

    info!("Saved model to {}", dir.display());

    Ok(())
}

/// Load a trained model with its configuration and tokenizer
pub fn load<B, C>(dir: &Path, device: &B::Device) -> Result<Artifacts<B, C>>
where
    B: Backend,
    C: ModelConfig,
{
    if !dir.is_dir() {
        return Err(Error::resource(dir, "no such model directory"));
    }

    let path = dir.join(CONFIG_FILE);
    let config = C::load(&path).map_err(|e| Error::resource(path, e))?;

    if config.n_classes() != N_CLASSES {
        return Err(Error::Incompatible(format!(
            "the model in {} has {} classes, expected {}",
            dir.display(),
            config.n_classes(),
            N_CLASSES
        )));
    }

    let path = dir.join(TOKENIZER_FILE);
    let tokenizer = Tokenizer::from_file(&path).map_err(|e| Error::resource(path, e))?;

    let training = load_training(dir)?;

    let path: PathBuf = dir.join(MODEL_FILE);
    let model = config
        .init::<B>(device)
        .load_file(path.clone(), &CompactRecorder::new(), device)
        .map_err(|e| Error::resource(path, e))?;

    info!("Loaded model from {}", dir.display());

    Ok(Artifacts {
        config,
        model,
        tokenizer,
        training,
    })
}

fn load_training(dir: &Path) -> Result<Training> {
    let path = dir.join(TRAINING_FILE);

    Training::load(&path).map_err(|e| Error::resource(path, e))
}

#[cfg(test)]
mod tests {
    use burn::config::Config as _;
    use pretty_assertions::assert_eq;

    use crate::testing::{
        temp_dir, word_tokenizer, TestBackend, TinyClassifier, TinyConfig, TEST_DEVICE,
    };

    use super::*;

    fn weights(model: &TinyClassifier<TestBackend>) -> Vec<f32> {
        model.output.weight.val().into_data().value
    }

    #[test]
    fn round_trips_a_trained_model() {
        let dir = temp_dir("artifacts_round_trip");
        let config = TinyConfig::new();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);
        let expected = weights(&model);

        let training = Training::new().with_model_name("tiny".to_string());
        save::<TestBackend, _>(&dir, &config, model, &word_tokenizer(), &training).unwrap();

        let loaded = load::<TestBackend, TinyConfig>(&dir, &TEST_DEVICE).unwrap();

        // Weights are stored at half precision
        for (a, b) in weights(&loaded.model).iter().zip(&expected) {
            assert!((a - b).abs() < 1e-2, "{a} != {b}");
        }
        assert_eq!(loaded.config.vocab_size, config.vocab_size);
        assert_eq!(
            loaded.tokenizer.get_vocab_size(true),
            word_tokenizer().get_vocab_size(true)
        );
        assert_eq!(loaded.training.model_name, "tiny");

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rejects_a_head_of_the_wrong_width() {
        let dir = temp_dir("artifacts_wrong_width");
        let config = TinyConfig::new();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);
        save::<TestBackend, _>(&dir, &config, model, &word_tokenizer(), &Training::new()).unwrap();

        config
            .clone()
            .with_n_classes(3)
            .save(dir.join(CONFIG_FILE))
            .unwrap();

        let error = load::<TestBackend, TinyConfig>(&dir, &TEST_DEVICE)
            .err()
            .unwrap();
        assert!(matches!(error, Error::Incompatible(_)));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn requires_the_training_record() {
        let dir = temp_dir("artifacts_no_training");
        let config = TinyConfig::new();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);
        save::<TestBackend, _>(&dir, &config, model, &word_tokenizer(), &Training::new()).unwrap();

        fs::remove_file(dir.join(TRAINING_FILE)).unwrap();

        let error = load::<TestBackend, TinyConfig>(&dir, &TEST_DEVICE)
            .err()
            .unwrap();
        assert!(matches!(error, Error::Resource { .. }));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_directories_are_resource_errors() {
        let error = load::<TestBackend, TinyConfig>(Path::new("/nonexistent/model"), &TEST_DEVICE)
            .err()
            .unwrap();

        assert!(matches!(error, Error::Resource { .. }));
    }
}
