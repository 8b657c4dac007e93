use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use log::info;
use serde::Serialize;

use crate::{
    datasets::{fake_news, load_splits},
    models::bert,
};

use super::{
    artifacts,
    evaluation::{evaluate, Evaluation},
    preprocess::dataloaders,
    train, Result, Settings, Tokenization,
};

/// Metrics of a fine-tuned model on the held-out splits
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Metrics on the validation split
    pub validation: Evaluation,

    /// Metrics on the test split
    pub test: Evaluation,
}

/// Run the train pipeline: load the dataset and the checkpoint, fine-tune, evaluate and save.
pub async fn train_pipeline<B: AutodiffBackend>(settings: &Settings<B>) -> Result<Report> {
    let config = &settings.training;
    config.validate()?;

    info!("Loading the {} dataset", fake_news::HUB_REPO);
    let splits = load_splits::<fake_news::Item, fake_news::Dataset>(&config.data_dir).await?;

    info!("Loading the {} checkpoint", config.checkpoint);
    let pretrained = bert::load_checkpoint::<B>(
        config.checkpoint,
        config.hidden_dropout_prob,
        &settings.device,
    )
    .await?;

    let tokenization = Tokenization::new(pretrained.tokenizer, &pretrained.config)?;
    let loaders = dataloaders(&splits, &tokenization, settings)?;

    let model = train(pretrained.model, loaders.train, loaders.train_batches, config)?;
    let model = model.valid();

    let validation = evaluate("validation", &model, &loaders.valid)?;
    let test = evaluate("test", &model, &loaders.test)?;

    artifacts::save::<B::InnerBackend, bert::Config>(
        &config.artifact_dir(),
        &pretrained.config,
        model,
        tokenization.tokenizer(),
        config,
    )?;

    Ok(Report { validation, test })
}
