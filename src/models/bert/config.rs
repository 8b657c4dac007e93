//! Adapt BERT for sequence classification to the fake news detector

use std::{collections::BTreeMap, path::Path};

use bert_burn::model::BertModelConfig;
use burn::{config::Config as _, nn::LinearConfig, tensor::backend::Backend};

use crate::pipelines::text_classification::{self, Error, Label, Result};

use super::Model;

/// Longest input accepted when the checkpoint does not say otherwise
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// The Model Configuration
#[derive(burn::config::Config, Debug)]
pub struct Config {
    // -- Fields copied from BertModelConfig because #[serde(flatten)] is not supported yet
    /// Number of attention heads in the multi-head attention
    pub num_attention_heads: usize,
    /// Number of transformer encoder layers/blocks
    pub num_hidden_layers: usize,
    /// Layer normalization epsilon
    pub layer_norm_eps: f64,
    /// Size of bert embedding (e.g., 768 for roberta-base)
    pub hidden_size: usize,
    /// Size of the intermediate position wise feedforward layer
    pub intermediate_size: usize,
    /// Size of the vocabulary
    pub vocab_size: usize,
    /// Max position embeddings, in RoBERTa equal to max_seq_len + 2 (514), for BERT equal to max_seq_len(512)
    pub max_position_embeddings: usize,
    /// Identifier for sentence type in input (e.g., 0 for single sentence, 1 for pair)
    pub type_vocab_size: usize,
    /// Dropout value across layers, typically 0.1
    pub hidden_dropout_prob: f64,
    /// BERT model name (bert, roberta)
    pub model_type: String,
    /// Index of the padding token
    pub pad_token_id: usize,
    /// Maximum sequence length for the tokenizer
    pub max_seq_len: Option<usize>,
    /// Whether to add a pooling layer to the model
    pub with_pooling_layer: Option<bool>,
    // -- End fields copied from BertModelConfig
    /// A map from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,
}

impl Config {
    /// Build the classification config on top of a base BERT config
    pub fn new_for_detection(model: BertModelConfig) -> Self {
        let id2label = Label::ALL
            .iter()
            .map(|label| (label.id(), label.as_str().to_string()))
            .collect();

        Config::new(
            model.num_attention_heads,
            model.num_hidden_layers,
            model.layer_norm_eps,
            model.hidden_size,
            model.intermediate_size,
            model.vocab_size,
            model.max_position_embeddings,
            model.type_vocab_size,
            model.hidden_dropout_prob,
            model.model_type,
            model.pad_token_id,
            id2label,
        )
        .with_max_seq_len(model.max_seq_len)
        .with_with_pooling_layer(model.with_pooling_layer)
    }

    /// Load the Hugging Face config of a pretrained checkpoint
    pub fn load_pretrained(config_file: &Path, hidden_dropout_prob: f64) -> Result<Self> {
        let mut bert_config = BertModelConfig::load(config_file)
            .map_err(|e| Error::resource(config_file, e))?;

        // Enable the pooling layer for sequence classification
        bert_config.with_pooling_layer = Some(true);
        bert_config.hidden_dropout_prob = hidden_dropout_prob;

        if bert_config.max_seq_len.is_none() {
            bert_config.max_seq_len = Some(DEFAULT_MAX_SEQ_LEN);
        }

        Ok(Config::new_for_detection(bert_config))
    }

    /// Get the Bert model configuration
    pub fn get_bert_config(&self) -> BertModelConfig {
        BertModelConfig::new(
            self.num_attention_heads,
            self.num_hidden_layers,
            self.layer_norm_eps,
            self.hidden_size,
            self.intermediate_size,
            self.vocab_size,
            self.max_position_embeddings,
            self.type_vocab_size,
            self.hidden_dropout_prob,
            self.model_type.clone(),
            self.pad_token_id,
        )
        .with_max_seq_len(self.max_seq_len)
        .with_with_pooling_layer(self.with_pooling_layer)
    }

    /// Initialize the model
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let model = self.get_bert_config().init(device);

        let n_classes = self.id2label.len();

        let output = LinearConfig::new(self.hidden_size, n_classes).init(device);

        Model {
            model,
            output,
            n_classes,
        }
    }
}

impl text_classification::ModelConfig for Config {
    type Model<B: Backend> = Model<B>;

    fn init<B: Backend>(&self, device: &B::Device) -> Self::Model<B> {
        Config::init(self, device)
    }

    fn n_classes(&self) -> usize {
        self.id2label.len()
    }

    fn pad_token_id(&self) -> usize {
        self.pad_token_id
    }

    fn max_seq_length(&self) -> usize {
        self.max_seq_len.unwrap_or(DEFAULT_MAX_SEQ_LEN)
    }
}
