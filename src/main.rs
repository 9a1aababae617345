//! Entry point for the burnout prediction HTTP service.

use std::path::{Path, PathBuf};

use tracing::info;

use burnwatch::config::{AppConfig, CONFIG_FILE_NAME, ConfigError};
use burnwatch::ml::forest::ForestModel;
use burnwatch::predictor::Predictor;
use burnwatch::{logging, server};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Errors that abort startup. There is no serving without a model, so every
/// variant is fatal.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot load model {path}: {message}")]
    Model { path: PathBuf, message: String },
    #[error("Cannot bind {addr}: {message}")]
    Bind { addr: String, message: String },
}

fn run() -> Result<(), StartupError> {
    logging::init();
    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?;

    let model =
        ForestModel::load_json(&config.serve.model_path).map_err(|message| StartupError::Model {
            path: config.serve.model_path.clone(),
            message,
        })?;
    info!(
        trees = model.trees.len(),
        classes = model.classes.len(),
        "Loaded model from {}",
        config.serve.model_path.display()
    );

    let predictor = Predictor::new(model);
    let server = server::bind(&config.serve.bind).map_err(|message| StartupError::Bind {
        addr: config.serve.bind.clone(),
        message,
    })?;
    info!("Listening on http://{}", config.serve.bind);
    server::serve(&server, &predictor);
    Ok(())
}
