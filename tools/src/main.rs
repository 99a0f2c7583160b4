//! etl-runner: headless batch runner for the order-events transform.
//!
//! Usage:
//!   etl-runner <events_csv> <product_dim_csv> <country_dim_csv> <output_csv>
//!   etl-runner events.csv products.csv countries.csv out.csv --config cfg.json
//!   etl-runner events.csv products.csv countries.csv out.csv --summary-json run.json

use anyhow::Result;
use etl_core::{
    config::PipelineConfig,
    engine::{TransformEngine, TransformPaths},
};
use std::{env, path::PathBuf, time::Instant};

const USAGE: &str = "Usage: etl-runner <events_csv> <product_dim_csv> <country_dim_csv> <output_csv> \
                     [--config <path>] [--summary-json <path>]";

struct RunnerArgs {
    paths: TransformPaths,
    config: Option<PathBuf>,
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let runner_args = match parse_args(&args) {
        Some(parsed) => parsed,
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let config = match &runner_args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let started = Instant::now();
    let engine = TransformEngine::new(config);
    let summary = engine.run_files(&runner_args.paths)?;
    log::info!("transform finished in {} ms", started.elapsed().as_millis());

    if let Some(path) = &runner_args.summary_json {
        summary.write_json(path)?;
    }

    println!(
        "rust transform completed | raw_rows={} filtered_rows={} dedup_rows={} aggregate_rows={} output={}",
        summary.raw_rows,
        summary.filtered_rows,
        summary.dedup_rows,
        summary.aggregate_rows,
        runner_args.paths.output.display()
    );

    Ok(())
}

/// Four positionals plus optional flags, in any position.
fn parse_args(args: &[String]) -> Option<RunnerArgs> {
    let mut positionals: Vec<&str> = Vec::new();
    let mut config = None;
    let mut summary_json = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(iter.next()?)),
            "--summary-json" => summary_json = Some(PathBuf::from(iter.next()?)),
            "-h" | "--help" => return None,
            other => positionals.push(other),
        }
    }

    let [events, products, countries, output] = positionals.as_slice() else {
        return None;
    };

    Some(RunnerArgs {
        paths: TransformPaths {
            events: PathBuf::from(*events),
            products: PathBuf::from(*products),
            countries: PathBuf::from(*countries),
            output: PathBuf::from(*output),
        },
        config,
        summary_json,
    })
}
