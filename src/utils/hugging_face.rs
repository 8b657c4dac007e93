use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiRepo};

use crate::pipelines::text_classification::{Error, Result};

/// Files making up a pretrained checkpoint
#[derive(Clone, Debug)]
pub struct ModelFiles {
    /// `config.json`
    pub config: PathBuf,

    /// `model.safetensors`
    pub weights: PathBuf,

    /// `tokenizer.json`
    pub tokenizer: PathBuf,
}

/// Download model config, weights and tokenizer from Hugging Face Hub
/// If file exists in cache, it will not be downloaded again
// NOTE: Modified from the built-in function to work within an already-async context
pub async fn download_hf_model(model_name: &str) -> Result<ModelFiles> {
    let api = Api::new().map_err(|e| Error::resource(model_name, e))?;
    let repo = api.model(model_name.to_string());

    Ok(ModelFiles {
        config: fetch(&repo, model_name, "config.json").await?,
        weights: fetch(&repo, model_name, "model.safetensors").await?,
        tokenizer: fetch(&repo, model_name, "tokenizer.json").await?,
    })
}

/// Download one file of a dataset repository from Hugging Face Hub
pub async fn download_hf_dataset_file(dataset_name: &str, file_name: &str) -> Result<PathBuf> {
    let api = Api::new().map_err(|e| Error::resource(dataset_name, e))?;
    let repo = api.dataset(dataset_name.to_string());

    fetch(&repo, dataset_name, file_name).await
}

async fn fetch(repo: &ApiRepo, repo_name: &str, file_name: &str) -> Result<PathBuf> {
    repo.get(file_name).await.map_err(|e| {
        Error::resource(
            format!("{}/{}", repo_name, file_name),
            format!("failed to download from the Hugging Face Hub: {}", e),
        )
    })
}
