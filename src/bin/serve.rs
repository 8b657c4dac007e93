//! Command line tool to serve a trained detector over HTTP

use std::net::SocketAddr;

use anyhow::{Context, Result};
use burn::backend::LibTorch;
use fake_news_detector::{
    models::bert,
    pipelines::text_classification::{Detector, Training},
    server::{serve, AppState, ServerConfig},
    utils::device::select_device,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: serve [OPTIONS]

Options:
  -h, --help             Print help
  -a, --addr             The address to listen on (defaults to '0.0.0.0:5000')
  -o, --models-dir       The directory models are saved under (defaults to 'models')
  -m, --model-name       The name of the model to serve (defaults to 'fake_news_detector')
";

#[derive(Debug)]
struct Args {
    help: bool,
    addr: Option<SocketAddr>,
    models_dir: Option<String>,
    model_name: Option<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        addr: pargs.opt_value_from_str(["-a", "--addr"])?,
        models_dir: pargs.opt_value_from_str(["-o", "--models-dir"])?,
        model_name: pargs.opt_value_from_str(["-m", "--model-name"])?,
    };

    Ok(args)
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

    if let Some(models_dir) = args.models_dir {
        config.models_dir = models_dir;
    }

    if let Some(model_name) = args.model_name {
        config.model_name = model_name;
    }

    let mut server_config = ServerConfig::default();

    if let Some(addr) = args.addr {
        server_config = server_config.with_address(addr);
    }

    let artifact_dir = config.artifact_dir();

    // Loaded once, shared by every request
    let detector = Detector::<LibTorch, bert::Model<LibTorch>>::load::<bert::Config>(
        &artifact_dir,
        select_device(),
    )
    .with_context(|| format!("Unable to load the model from {}", artifact_dir.display()))?;

    let state = AppState::new(detector, &config.model_name)?;

    serve(server_config, state).await?;

    Ok(())
}
