//! Trains the burnout risk classifier on synthetic data and exports it.

use std::path::PathBuf;

use tracing::info;

use burnwatch::config::{AppConfig, CONFIG_FILE_NAME, TrainSettings};
use burnwatch::logging;
use burnwatch::ml::forest::{ForestModel, TrainDataset, TrainOptions, train_forest};
use burnwatch::ml::metrics::{ConfusionMatrix, PerClassStats, precision_recall_by_class};
use burnwatch::synth::{generate_dataset, split_train_test};

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = config_path_from_args(&args)?;
    let config = AppConfig::load_or_default(&config_path).map_err(|err| err.to_string())?;
    let options = parse_args(&args, config.train)?;

    info!(
        samples = options.samples,
        seed = options.seed,
        "Generating synthetic dataset"
    );
    let dataset = generate_dataset(options.samples, options.seed);
    let (train, test) = split_train_test(&dataset, options.test_fraction, options.seed);

    let train_options = TrainOptions {
        trees: options.trees,
        max_depth: options.max_depth,
        seed: options.seed,
        ..TrainOptions::default()
    };
    info!(
        train = train.x.len(),
        test = test.x.len(),
        trees = train_options.trees,
        "Fitting forest"
    );
    let model = train_forest(&train, &train_options)?;
    model.save_json(&options.model_out)?;

    let (cm, per_class) = evaluate(&model, &test);
    println!("test accuracy: {:.4}", cm.accuracy());
    for (idx, stats) in per_class.iter().enumerate() {
        println!(
            "class {:>2} {:<8}  precision={:.3}  recall={:.3}  support={}",
            idx, model.classes[idx], stats.precision, stats.recall, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes() {
        let mut row = String::new();
        for pred in 0..cm.n_classes() {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }
    println!("model saved to {}", options.model_out.display());

    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    samples: usize,
    seed: u64,
    test_fraction: f64,
    trees: usize,
    max_depth: usize,
    model_out: PathBuf,
}

/// Resolve `--config` before the full parse so file values become the
/// defaults the remaining flags override.
fn config_path_from_args(args: &[String]) -> Result<PathBuf, String> {
    let mut idx = 0usize;
    while idx < args.len() {
        if args[idx] == "--config" {
            idx += 1;
            let value = args
                .get(idx)
                .ok_or_else(|| "--config requires a value".to_string())?;
            return Ok(PathBuf::from(value));
        }
        idx += 1;
    }
    Ok(PathBuf::from(CONFIG_FILE_NAME))
}

fn parse_args(args: &[String], defaults: TrainSettings) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        samples: defaults.samples,
        seed: defaults.seed,
        test_fraction: defaults.test_fraction,
        trees: defaults.trees,
        max_depth: defaults.max_depth,
        model_out: defaults.model_out,
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                // Consumed by config_path_from_args.
                idx += 1;
            }
            "--samples" => {
                idx += 1;
                options.samples = parse_value::<usize>(args, idx, "--samples")?;
            }
            "--seed" => {
                idx += 1;
                options.seed = parse_value::<u64>(args, idx, "--seed")?;
            }
            "--test-fraction" => {
                idx += 1;
                options.test_fraction = parse_value::<f64>(args, idx, "--test-fraction")?;
            }
            "--trees" => {
                idx += 1;
                options.trees = parse_value::<usize>(args, idx, "--trees")?;
            }
            "--max-depth" => {
                idx += 1;
                options.max_depth = parse_value::<usize>(args, idx, "--max-depth")?;
            }
            "--out" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                options.model_out = PathBuf::from(value);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    if !(0.0..1.0).contains(&options.test_fraction) {
        return Err(format!(
            "Invalid --test-fraction value: {}",
            options.test_fraction
        ));
    }
    Ok(options)
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    idx: usize,
    flag: &str,
) -> Result<T, String> {
    let value = args
        .get(idx)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn help_text() -> String {
    [
        "burnwatch-train",
        "",
        "Generates a synthetic burnout dataset, fits a random forest, and",
        "writes the model artifact consumed by the serving binary.",
        "",
        "Usage:",
        "  burnwatch-train [options]",
        "",
        "Options:",
        "  --out <file>           Output model path (default: model.json).",
        "  --samples <n>          Synthetic records to generate (default: 2000).",
        "  --seed <u64>           Seed for sampling, splitting, and fitting (default: 42).",
        "  --test-fraction <f64>  Held-out fraction for evaluation (default: 0.2).",
        "  --trees <n>            Trees in the forest (default: 100).",
        "  --max-depth <n>        Maximum tree depth (default: 12).",
        "  --config <file>        Config file supplying defaults (default: burnwatch.toml).",
    ]
    .join("\n")
}

fn evaluate(model: &ForestModel, dataset: &TrainDataset) -> (ConfusionMatrix, Vec<PerClassStats>) {
    let mut cm = ConfusionMatrix::new(model.classes.len());
    for (row, &truth) in dataset.x.iter().zip(dataset.y.iter()) {
        cm.record(truth, model.predict_class_index(row));
    }
    let per_class = precision_recall_by_class(&cm);
    (cm, per_class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_defaults() {
        let args: Vec<String> = ["--samples", "100", "--seed", "7", "--out", "m.json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = parse_args(&args, TrainSettings::default()).unwrap();
        assert_eq!(options.samples, 100);
        assert_eq!(options.seed, 7);
        assert_eq!(options.model_out, PathBuf::from("m.json"));
        assert_eq!(options.trees, 100);
    }

    #[test]
    fn bad_values_are_reported_with_their_flag() {
        let args: Vec<String> = ["--trees", "many"].iter().map(|s| s.to_string()).collect();
        let err = parse_args(&args, TrainSettings::default()).unwrap_err();
        assert!(err.contains("--trees"));
    }

    #[test]
    fn config_flag_is_resolved_before_parsing() {
        let args: Vec<String> = ["--config", "custom.toml"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            config_path_from_args(&args).unwrap(),
            PathBuf::from("custom.toml")
        );
        assert_eq!(
            config_path_from_args(&[]).unwrap(),
            PathBuf::from(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn out_of_range_test_fraction_is_rejected() {
        let args: Vec<String> = ["--test-fraction", "1.5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(parse_args(&args, TrainSettings::default()).is_err());
    }
}
