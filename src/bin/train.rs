//! Command line tool to fine-tune the fake news detector

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use burn::backend::{Autodiff, LibTorch};
use fake_news_detector::{
    datasets::Dataset,
    models::Checkpoint,
    pipelines::text_classification::{train_pipeline, Settings, Training},
    utils::device::select_device,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [DATASET] [OPTIONS]

Arguments:
  DATASET                The dataset to use (defaults to 'fake_news')

Options:
  -h, --help             Print help
  --config               A YAML file with training hyperparameters
  -c, --checkpoint       The checkpoint to fine-tune (e.g., 'bert-base-uncased')
  -n, --num-epochs       Number of epochs to train for
  -b, --batch-size       Batch size
  -l, --learning-rate    Peak learning rate
  -w, --warmup-steps     Number of warmup steps
  --weight-decay         AdamW weight decay
  --max-grad-norm        Upper bound for the global gradient norm
  -d, --data-dir         The path to the top-level data directory (defaults to 'data')
  -o, --models-dir       The directory models are saved under (defaults to 'models')
  -m, --model-name       The name to save the model as (defaults to 'fake_news_detector')
";

#[derive(Debug)]
struct Args {
    dataset: Option<String>,
    config: Option<PathBuf>,
    checkpoint: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    warmup_steps: Option<usize>,
    weight_decay: Option<f32>,
    max_grad_norm: Option<f64>,
    data_dir: Option<String>,
    models_dir: Option<String>,
    model_name: Option<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str("--config")?,
            checkpoint: pargs.opt_value_from_str(["-c", "--checkpoint"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            learning_rate: pargs.opt_value_from_str(["-l", "--learning-rate"])?,
            warmup_steps: pargs.opt_value_from_str(["-w", "--warmup-steps"])?,
            weight_decay: pargs.opt_value_from_str("--weight-decay")?,
            max_grad_norm: pargs.opt_value_from_str("--max-grad-norm")?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            models_dir: pargs.opt_value_from_str(["-o", "--models-dir"])?,
            model_name: pargs.opt_value_from_str(["-m", "--model-name"])?,
            dataset: pargs.opt_free_from_str()?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    /// Defaults, then the YAML file, then the command line flags
    async fn training(&self) -> anyhow::Result<Training> {
        let mut config = match &self.config {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Unable to read {}", path.display()))?;

                serde_yaml::from_str(&yaml)
                    .with_context(|| format!("Unable to parse {}", path.display()))?
            }
            None => Training::new(),
        };

        if let Some(checkpoint) = &self.checkpoint {
            config.checkpoint = Checkpoint::try_from(checkpoint.as_str())?;
        }

        if let Some(num_epochs) = self.num_epochs {
            config.num_epochs = num_epochs;
        }

        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }

        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }

        if let Some(warmup_steps) = self.warmup_steps {
            config.warmup_steps = warmup_steps;
        }

        if let Some(weight_decay) = self.weight_decay {
            config.weight_decay = weight_decay;
        }

        if let Some(max_grad_norm) = self.max_grad_norm {
            config.max_grad_norm = max_grad_norm;
        }

        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.to_string();
        }

        if let Some(models_dir) = &self.models_dir {
            config.models_dir = models_dir.to_string();
        }

        if let Some(model_name) = &self.model_name {
            config.model_name = model_name.to_string();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let dataset = match &args.dataset {
        Some(dataset) => Dataset::try_from(dataset.as_str())?,
        None => Dataset::default(),
    };

    let training = args.training().await?;
    let artifact_dir = training.artifact_dir();

    let settings = Settings::<Autodiff<LibTorch>>::new(training, select_device());

    let report = match dataset {
        Dataset::FakeNews => train_pipeline(&settings)
            .await
            .context("Training failed")?,
    };

    let metrics_file = artifact_dir.join("metrics.json");
    tokio::fs::write(&metrics_file, serde_json::to_string_pretty(&report)?)
        .await
        .with_context(|| format!("Unable to write {}", metrics_file.display()))?;

    info!("Wrote metrics to {}", metrics_file.display());

    println!(
        "\n=== {} ===\
         \n- Validation F1: {:.4}\
         \n- Test F1: {:.4}\
         \n- Saved to: {}\
         \n================",
        settings.training.model_name,
        report.validation.f1,
        report.test.f1,
        artifact_dir.display()
    );

    Ok(())
}
