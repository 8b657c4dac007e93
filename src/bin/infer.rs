//! Command line tool for inference with a trained detector

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use burn::backend::LibTorch;
use fake_news_detector::{
    datasets::{fake_news, LoadableDataset, Split},
    models::bert,
    pipelines::text_classification::{Detector, Training},
    utils::device::select_device,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [TEXT] [OPTIONS]

Arguments:
  TEXT                   The news text to classify

Options:
  -h, --help             Print help
  -s, --samples          Classify N random records of the test split instead
  -d, --data-dir         The path to the top-level data directory (defaults to 'data')
  -o, --models-dir       The directory models are saved under (defaults to 'models')
  -m, --model-name       The name of the model to load (defaults to 'fake_news_detector')
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The text to classify
    text: Option<String>,

    /// Number of random test records to classify
    samples: Option<usize>,

    /// The top-level data directory
    data_dir: Option<String>,

    /// The directory models are saved under
    models_dir: Option<String>,

    /// The name of the model to load
    model_name: Option<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        samples: pargs.opt_value_from_str(["-s", "--samples"])?,
        data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
        models_dir: pargs.opt_value_from_str(["-o", "--models-dir"])?,
        model_name: pargs.opt_value_from_str(["-m", "--model-name"])?,
        text: pargs.opt_free_from_str()?,
    };

    Ok(args)
}

/// Shorten long articles for display
fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 120;

    if text.chars().count() > MAX_CHARS {
        format!("{}...", text.chars().take(MAX_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let mut config = Training::new();

    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    if let Some(models_dir) = args.models_dir {
        config.models_dir = models_dir;
    }

    if let Some(model_name) = args.model_name {
        config.model_name = model_name;
    }

    let artifact_dir: PathBuf = config.artifact_dir();

    let detector = Detector::<LibTorch, bert::Model<LibTorch>>::load::<bert::Config>(
        &artifact_dir,
        select_device(),
    )
    .with_context(|| format!("Unable to load the model from {}", artifact_dir.display()))?;

    let samples: Vec<(String, Option<String>)> = match (args.text, args.samples) {
        (Some(text), _) => vec![(text, None)],
        (None, Some(n)) => fake_news::Dataset::load(&config.data_dir, Split::Test)
            .await?
            .samples(n)
            .into_iter()
            .map(|item| (item.text, Some(item.label.to_string())))
            .collect(),
        (None, None) => return Err(anyhow!("Provide a TEXT or --samples N, see --help")),
    };

    for (i, (text, expected)) in samples.into_iter().enumerate() {
        let prediction = detector.predict(&text)?;

        // Print sample text and predicted class name
        println!(
            "\n=== Item {i} ===\
             \n- Text: {}\
             \n- Class: {}\
             \n- Logits: {:?}\
             \n- Expected: {}\
             \n================",
            excerpt(&text),
            prediction.label,
            prediction.logits,
            expected.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
