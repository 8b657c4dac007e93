use std::path::Path;

use burn::{data::dataloader::batcher::Batcher as _, tensor::backend::Backend};
use log::{debug, info};
use serde::Serialize;

use super::{
    artifacts, batcher::Infer, Batcher, Classifier, Error, Label, ModelConfig, Result, Tokenization,
};

/// The class predicted for one text
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    /// The most likely class
    pub label: Label,

    /// Raw, unnormalized class scores
    pub logits: Vec<f32>,
}

/// Classify one raw text, tokenized with the same policy used in training
pub fn infer<B, M>(
    model: &M,                   // Trained model
    tokenization: &Tokenization, // Tokenization policy the model was trained with
    batcher: &Batcher<B>,        // Batcher following the same policy
    text: &str,                  // Raw text to classify
) -> Result<Prediction>
where
    B: Backend,
    M: Classifier<B>,
{
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("text must not be empty".to_string()));
    }

    let token_ids = tokenization.encode(text)?;
    if token_ids.is_empty() {
        return Err(Error::InvalidInput("text encodes to no tokens".to_string()));
    }

    debug!("Encoded the input into {} tokens", token_ids.len());

    let batch: Infer<B> = batcher.batch(vec![token_ids]);
    let logits = model.logits(batch);

    let class_id = logits
        .clone()
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .value
        .first()
        .copied()
        .ok_or_else(|| Error::Incompatible("the model produced no output".to_string()))?;

    Ok(Prediction {
        label: Label::try_from(class_id)?,
        logits: logits.into_data().convert::<f32>().value,
    })
}

/// A trained model ready to classify texts one at a time
pub struct Detector<B: Backend, M: Classifier<B>> {
    model: M,
    tokenization: Tokenization,
    batcher: Batcher<B>,
}

impl<B: Backend, M: Classifier<B>> Detector<B, M> {
    /// Wrap a trained model and its tokenization policy
    pub fn new(model: M, tokenization: Tokenization, device: B::Device) -> Self {
        let batcher = Batcher::new(&tokenization, device);

        Self {
            model,
            tokenization,
            batcher,
        }
    }

    /// Classify one raw text
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        infer(&self.model, &self.tokenization, &self.batcher, text)
    }

    /// Load a persisted model from its artifact directory
    pub fn load<C>(dir: &Path, device: B::Device) -> Result<Self>
    where
        C: ModelConfig<Model<B> = M>,
    {
        let artifacts = artifacts::load::<B, C>(dir, &device)?;

        let training = &artifacts.training;
        info!(
            "Model {} was fine-tuned from {} for {} epochs (batch size {}, learning rate {:e})",
            training.model_name,
            training.checkpoint,
            training.num_epochs,
            training.batch_size,
            training.learning_rate
        );

        let tokenization = Tokenization::new(artifacts.tokenizer, &artifacts.config)?;

        Ok(Self::new(artifacts.model, tokenization, device))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        pipelines::text_classification::Training,
        testing::{temp_dir, word_tokenizer, TestBackend, TinyClassifier, TinyConfig, TEST_DEVICE},
    };

    use super::*;

    fn detector() -> Detector<TestBackend, TinyClassifier<TestBackend>> {
        let config = TinyConfig::new();
        let tokenization = Tokenization::new(word_tokenizer(), &config).unwrap();

        Detector::new(config.init(&TEST_DEVICE), tokenization, TEST_DEVICE)
    }

    #[test]
    fn predicts_a_binary_label() {
        let detector = detector();

        for text in [
            "Scientists confirm water is wet",
            "aliens built the pyramids",
            "completely unknown words here",
        ] {
            let prediction = detector.predict(text).unwrap();

            assert!(Label::ALL.contains(&prediction.label));
            assert_eq!(prediction.logits.len(), 2);
        }
    }

    #[test]
    fn prediction_is_the_argmax_of_the_logits() {
        let prediction = detector().predict("the moon is made of cheese").unwrap();

        let expected = if prediction.logits[1] > prediction.logits[0] {
            Label::Real
        } else {
            Label::Fake
        };
        assert_eq!(prediction.label, expected);
    }

    #[test]
    fn rejects_empty_text() {
        let detector = detector();

        for text in ["", "   ", "\n\t"] {
            let error = detector.predict(text).unwrap_err();
            assert!(error.is_input_validation());
        }
    }

    #[test]
    fn loaded_detectors_predict_like_the_saved_model() {
        let dir = temp_dir("detector_load");
        let config = TinyConfig::new();
        let model: TinyClassifier<TestBackend> = config.init(&TEST_DEVICE);
        let tokenization = Tokenization::new(word_tokenizer(), &config).unwrap();

        artifacts::save::<TestBackend, _>(
            &dir,
            &config,
            model.clone(),
            tokenization.tokenizer(),
            &Training::new(),
        )
        .unwrap();

        let saved = Detector::new(model, tokenization, TEST_DEVICE);
        let loaded =
            Detector::<TestBackend, TinyClassifier<TestBackend>>::load::<TinyConfig>(&dir, TEST_DEVICE)
                .unwrap();

        // Weights are stored at half precision
        let text = "scientists confirm water is wet";
        let saved = saved.predict(text).unwrap().logits;
        let loaded = loaded.predict(text).unwrap().logits;
        for (a, b) in saved.iter().zip(&loaded) {
            assert!((a - b).abs() < 1e-2, "{a} != {b}");
        }

        std::fs::remove_dir_all(dir).ok();
    }
}
