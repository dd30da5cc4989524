use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storehouse::{
    config::Config,
    error::Error,
    model::{
        calendar::CalendarRow,
        ml::{ChurnPrediction, LifetimeValuePrediction, MarketBasketRule, SegmentPrediction},
        report::{IngestReport, RunStatus},
    },
    service::{
        analytics::AnalyticsView,
        calendar::DateDimensionGenerator,
        load::{LoadCoordinator, WarehouseEpoch},
        ml::MlResultIntegrator,
        pipeline::BatchPipeline,
        quality::QualityService,
        retry::RetryContext,
    },
    source::{jsonl, SourceBatch},
    startup,
};

/// Star-schema ETL for e-commerce extracts
#[derive(Parser, Debug)]
#[command(name = "storehouse", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Materialize the configured calendar range
    Calendar,

    /// Run the batch pipeline over a directory of CSV extracts
    Run {
        /// Directory holding the extracts (defaults to SOURCE_DIR)
        #[arg(short, long)]
        source: Option<PathBuf>,
    },

    /// Ingest a JSON-lines file of model predictions
    Ingest {
        kind: PredictionKind,

        file: PathBuf,

        /// Version tag stored with every ingested row
        #[arg(short = 'm', long)]
        model_version: String,
    },

    /// Print the analytics projections
    Analytics {
        /// Number of customers and products to print
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Print the data quality report
    Quality,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PredictionKind {
    Segmentation,
    Churn,
    LifetimeValue,
    BasketRules,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storehouse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Commands, config: &Config) -> Result<ExitCode, Error> {
    let db = startup::connect_to_database(config).await?;
    let epoch = WarehouseEpoch::new();

    match command {
        Commands::Migrate => {}
        Commands::Calendar => {
            let range = &config.warehouse.calendar;
            let rows: Vec<CalendarRow> = DateDimensionGenerator::new(range.seasons)
                .generate_range(range.start, range.end)
                .collect();

            let summary = LoadCoordinator::new(
                &db,
                RetryContext::from_config(&config.warehouse.load_retry),
                epoch,
            )
            .load_calendar(rows)
            .await?;
            print_json(&summary)?;
        }
        Commands::Run { source } => {
            let source = source.unwrap_or_else(|| config.source_dir.clone());
            tracing::info!("Reading extracts from {}", source.display());
            let batch = SourceBatch::from_dir(&source)?;

            let report = BatchPipeline::new(&db, &config.warehouse, epoch)
                .run(&batch)
                .await;
            print_json(&report)?;

            if report.status == RunStatus::Aborted {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Ingest {
            kind,
            file,
            model_version,
        } => {
            let integrator = MlResultIntegrator::new(&db).with_epoch(epoch);
            let report: IngestReport = match kind {
                PredictionKind::Segmentation => {
                    let rows: Vec<SegmentPrediction> = jsonl::read_lines(&file)?;
                    integrator
                        .ingest_segmentation_batch(&rows, &model_version)
                        .await?
                }
                PredictionKind::Churn => {
                    let rows: Vec<ChurnPrediction> = jsonl::read_lines(&file)?;
                    integrator.ingest_churn_batch(&rows, &model_version).await?
                }
                PredictionKind::LifetimeValue => {
                    let rows: Vec<LifetimeValuePrediction> = jsonl::read_lines(&file)?;
                    integrator
                        .ingest_lifetime_value_batch(&rows, &model_version)
                        .await?
                }
                PredictionKind::BasketRules => {
                    let rows: Vec<MarketBasketRule> = jsonl::read_lines(&file)?;
                    integrator
                        .ingest_market_basket_rule_batch(&rows, &model_version)
                        .await?
                }
            };
            print_json(&report)?;
        }
        Commands::Analytics { top } => {
            let view = AnalyticsView::new(&db, epoch);
            let snapshot = view.snapshot().await?;

            print_json(&serde_json::json!({
                "customers": snapshot.customers.iter().take(top).collect::<Vec<_>>(),
                "products": snapshot.products.iter().take(top).collect::<Vec<_>>(),
                "daily": snapshot.daily,
            }))?;
        }
        Commands::Quality => {
            let report = QualityService::new(&db).run_checks().await?;
            print_json(&report)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
