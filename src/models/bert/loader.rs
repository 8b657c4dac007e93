use std::{collections::HashMap, path::Path};

use bert_burn::{
    loader::{
        load_embeddings_from_safetensors, load_encoder_from_safetensors,
        load_pooler_from_safetensors,
    },
    model::BertModelRecord,
};
use burn::{
    module::{ConstantRecord, Module},
    nn::{LinearConfig, LinearRecord},
    tensor::backend::Backend,
};
use candle_core::{safetensors, Device};
use log::{debug, info};
use tokenizers::Tokenizer;

use crate::{
    models::Checkpoint,
    pipelines::text_classification::{Error, Result},
    utils::hugging_face::download_hf_model,
};

use super::{Config, Model, ModelRecord};

/// A pretrained encoder with a fresh classification head
pub struct Pretrained<B: Backend> {
    /// The model configuration
    pub config: Config,

    /// The model, ready for fine-tuning
    pub model: Model<B>,

    /// The tokenizer of the checkpoint
    pub tokenizer: Tokenizer,
}

/// Download a checkpoint and load its encoder weights under a new 2-way head
pub async fn load_checkpoint<B: Backend>(
    checkpoint: Checkpoint,
    hidden_dropout_prob: f64,
    device: &B::Device,
) -> Result<Pretrained<B>> {
    let files = download_hf_model(checkpoint.name()).await?;

    let config = Config::load_pretrained(&files.config, hidden_dropout_prob)?;
    let model = load_from_safetensors(&files.weights, &config, device)?;

    let tokenizer = Tokenizer::from_file(&files.tokenizer)
        .map_err(|e| Error::resource(&files.tokenizer, e))?;

    info!("Loaded the {} checkpoint", checkpoint);

    Ok(Pretrained {
        config,
        model,
        tokenizer,
    })
}

/// Load encoder weights from a safetensors file, initializing the classification head
pub fn load_from_safetensors<B: Backend>(
    model_file: &Path,
    config: &Config,
    device: &B::Device,
) -> Result<Model<B>> {
    if !model_file.is_file() {
        return Err(Error::resource(model_file, "no such weights file"));
    }

    let n_classes = config.id2label.len();
    if n_classes == 0 {
        return Err(Error::Incompatible(
            "classes are not defined in the model configuration".to_string(),
        ));
    }

    // Initialize the linear output
    let output = LinearConfig::new(config.hidden_size, n_classes).init::<B>(device);

    let record = ModelRecord {
        model: read_bert_record(model_file, &config.model_type, device)?,
        output: LinearRecord {
            weight: output.weight,
            bias: output.bias,
        },
        n_classes: ConstantRecord::new(),
    };

    Ok(config.init(device).load_record(record))
}

/// Map the encoder weights of a Hugging Face checkpoint into a BERT record
fn read_bert_record<B: Backend>(
    model_file: &Path,
    model_type: &str,
    device: &B::Device,
) -> Result<BertModelRecord<B>> {
    let weights = safetensors::load(model_file, &Device::Cpu)
        .map_err(|e| Error::resource(model_file, e))?;

    // Weights are stored in a HashMap<String, Tensor>, each layer prefixed with
    // "encoder.layer.", "embeddings." or "pooler."
    let mut encoder_layers: HashMap<String, candle_core::Tensor> = HashMap::new();
    let mut embeddings_layers: HashMap<String, candle_core::Tensor> = HashMap::new();
    let mut pooler_layers: HashMap<String, candle_core::Tensor> = HashMap::new();

    // Variants such as roberta-base prefix every key with the model type
    let prefix = format!("{}.", model_type);

    for (key, value) in weights {
        let key = key.strip_prefix(&prefix).map(str::to_string).unwrap_or(key);

        if key.starts_with("encoder.layer.") {
            encoder_layers.insert(key, value);
        } else if key.starts_with("embeddings.") {
            embeddings_layers.insert(key, value);
        } else if key.starts_with("pooler.") {
            pooler_layers.insert(key, value);
        }
    }

    if embeddings_layers.is_empty() || encoder_layers.is_empty() {
        return Err(Error::Incompatible(format!(
            "{} holds no {} encoder weights",
            model_file.display(),
            model_type
        )));
    }

    debug!(
        "Read {} embedding, {} encoder and {} pooler tensors",
        embeddings_layers.len(),
        encoder_layers.len(),
        pooler_layers.len()
    );

    // The classification head uses the pooled first token
    let pooler = if pooler_layers.is_empty() {
        None
    } else {
        Some(load_pooler_from_safetensors(pooler_layers, device))
    };

    Ok(BertModelRecord {
        embeddings: load_embeddings_from_safetensors(embeddings_layers, device),
        encoder: load_encoder_from_safetensors(encoder_layers, device),
        pooler,
    })
}
