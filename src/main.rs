//! Riesgo-Core - Command Line Entry Point

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use riesgo_core::api;
use riesgo_core::api::ranking::DEFAULT_RANKING_LIMIT;
use riesgo_core::constants;
use riesgo_core::{ArtifactStore, BatchInput, Pipeline, RawRecord};

#[derive(Parser)]
#[command(name = "riesgo-core", version, about = "Traffic incident risk scoring")]
struct Cli {
    /// Directory holding the exported model artifacts
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Service availability, loaded models and scoring telemetry
    Status,

    /// Score a single incident record
    Predict {
        #[arg(long)]
        comuna: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long)]
        tipo_accidente: String,
        #[arg(long, default_value_t = 0.0)]
        leves: f64,
        /// Incident date, YYYY-MM-DD
        #[arg(long)]
        fecha: String,
        #[arg(long)]
        clase_accid: Option<String>,
    },

    /// Score a JSON batch file: {"accidents": [...]}
    Batch { file: PathBuf },

    /// Score a CSV table with a header row
    Csv { file: PathBuf },

    /// Per-comuna model fairness ranking
    Ranking {
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let model_dir = cli
        .model_dir
        .map(|p| p.display().to_string())
        .unwrap_or_else(constants::get_model_dir);

    let store = Arc::new(ArtifactStore::new());
    if store.load(&model_dir).is_err() {
        log::warn!("continuing without models; scoring commands will fail until artifacts load");
    }
    let pipeline = Pipeline::new(store);

    match cli.command {
        Command::Status => print_json(&api::service_status(&pipeline))?,

        Command::Predict {
            comuna,
            region,
            tipo_accidente,
            leves,
            fecha,
            clase_accid,
        } => {
            let record = RawRecord {
                comuna,
                region,
                tipo_accidente,
                leves,
                fecha,
                clase_accid,
            };
            print_json(&pipeline.predict_single(&record)?)?;
        }

        Command::Batch { file } => {
            let input =
                File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            let batch: BatchInput = serde_json::from_reader(input)
                .with_context(|| format!("parsing {}", file.display()))?;
            print_json(&pipeline.predict_batch(&batch)?)?;
        }

        Command::Csv { file } => {
            let input =
                File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            print_json(&pipeline.predict_table(input)?)?;
        }

        Command::Ranking { limit } => print_json(&api::comuna_ranking(limit))?,
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
