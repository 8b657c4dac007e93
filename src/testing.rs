//! Deterministic stand-ins for the pretrained providers

use std::{collections::HashMap, path::PathBuf};

use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::Module,
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    tensor::{backend::Backend, Tensor},
};
use tokenizers::{models::wordlevel::WordLevel, pre_tokenizers::whitespace::Whitespace, Tokenizer};

use crate::pipelines::text_classification::{batcher::Infer, Classifier, ModelConfig};

pub type TestBackend = NdArray<f32>;
pub type TestAutodiffBackend = Autodiff<TestBackend>;

pub const TEST_DEVICE: NdArrayDevice = NdArrayDevice::Cpu;

const VOCAB: [&str; 15] = [
    "[PAD]",
    "[UNK]",
    "scientists",
    "confirm",
    "water",
    "is",
    "wet",
    "aliens",
    "built",
    "the",
    "pyramids",
    "moon",
    "made",
    "of",
    "cheese",
];

/// A word-level tokenizer over a small, fixed vocabulary
pub fn word_tokenizer() -> Tokenizer {
    let vocab: HashMap<String, u32> = VOCAB
        .iter()
        .enumerate()
        .map(|(id, word)| (word.to_string(), id as u32))
        .collect();

    let model = WordLevel::builder()
        .vocab(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .unwrap();

    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Whitespace::default());

    tokenizer
}

/// A fresh scratch directory under the system temp dir
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fake_news_detector_{}_{}",
        name,
        std::process::id()
    ));

    std::fs::remove_dir_all(&dir).ok();

    dir
}

/// Mean of the token embeddings followed by a linear head
#[derive(Module, Debug)]
pub struct TinyClassifier<B: Backend> {
    pub(crate) embedding: Embedding<B>,
    pub(crate) output: Linear<B>,
}

impl<B: Backend> Classifier<B> for TinyClassifier<B> {
    fn logits(&self, input: Infer<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let embedded = self.embedding.forward(input.tokens);
        let [_, _, d_model] = embedded.dims();

        let pooled = embedded.mean_dim(1).reshape([batch_size, d_model]);

        self.output.forward(pooled)
    }
}

#[derive(burn::config::Config, Debug)]
pub struct TinyConfig {
    #[config(default = 32)]
    pub vocab_size: usize,

    #[config(default = 4)]
    pub d_model: usize,

    #[config(default = 0)]
    pub pad_token_id: usize,

    #[config(default = 8)]
    pub max_seq_length: usize,

    #[config(default = 2)]
    pub n_classes: usize,
}

impl ModelConfig for TinyConfig {
    type Model<B: Backend> = TinyClassifier<B>;

    fn init<B: Backend>(&self, device: &B::Device) -> Self::Model<B> {
        TinyClassifier {
            embedding: EmbeddingConfig::new(self.vocab_size, self.d_model).init(device),
            output: LinearConfig::new(self.d_model, self.n_classes).init(device),
        }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn pad_token_id(&self) -> usize {
        self.pad_token_id
    }

    fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }
}
