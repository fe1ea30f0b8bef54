use analytics::{align, validate_batch};
use anyhow::Context;
use api_client::{HttpSimulationClient, MarketDataClient};
use batch_runner::error::RunnerError;
use batch_runner::{BatchOutcome, BatchSimulationRunner};
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{Settings, init_tracing, load_config, load_scenarios};
use core_types::{NamedSeries, ScenarioMode, ValidatedResult};
use std::path::PathBuf;
use storage::{JsonFileStore, ResultStore};

mod render;

/// Target return used for the Monte-Carlo reference line when none is given.
const DEFAULT_TARGET_RETURN: f64 = 0.1;

/// The main entry point for the simdeck simulation client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&settings.logging)?;

    match cli.command {
        Commands::Run(args) => handle_run(args, &settings).await,
        Commands::Show(args) => handle_show(args, &settings).await,
        Commands::Tickers(args) => handle_tickers(args, &settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Runs batches of backtests and simulations on a remote service and shows
/// the results side by side.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "simdeck.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit every scenario in a batch file and store the results.
    Run(RunArgs),
    /// Show the stored results of the last batch of a mode.
    Show(ShowArgs),
    /// List the symbols the simulation service has market data for.
    Tickers(TickersArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// TOML file with one [[scenario]] table per scenario.
    #[arg(long)]
    scenarios: PathBuf,

    /// Expected mode of the batch (portfolio-backtest, monte-carlo, probability).
    #[arg(long)]
    mode: Option<ScenarioMode>,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[derive(Parser)]
struct ShowArgs {
    /// Which results to show (portfolio-backtest, monte-carlo, probability).
    #[arg(long)]
    mode: ScenarioMode,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Return over the first simulated price that marks the Monte-Carlo target.
    #[arg(long, default_value_t = DEFAULT_TARGET_RETURN)]
    target_return: f64,
}

#[derive(Parser)]
struct TickersArgs {
    /// Only list pairs quoted in this currency (e.g. "USDT").
    #[arg(long)]
    quote: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

async fn handle_run(args: RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let batch = load_scenarios(&args.scenarios)
        .with_context(|| format!("invalid scenario file {}", args.scenarios.display()))?;
    if let Some(expected) = args.mode {
        if expected != batch.mode {
            anyhow::bail!(
                "{} contains {} scenarios, not {}",
                args.scenarios.display(),
                batch.mode,
                expected
            );
        }
    }
    let mode = batch.mode;

    println!(
        "Running {} {} scenario(s) against {}",
        batch.scenarios.len(),
        mode,
        settings.api.base_url
    );

    let client = HttpSimulationClient::new(&settings.api)?;
    let mut runner = BatchSimulationRunner::new();
    if !args.no_progress {
        runner = runner.with_progress_bar()?;
    }

    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling batch.");
            cancel.cancel();
        }
    });

    let outcome = runner.run(batch.scenarios, &client).await;

    for line in batch_report(&outcome)? {
        eprintln!("{line}");
    }

    let store = JsonFileStore::new(&settings.storage.directory);
    let discarded = store_results(&store, mode, &outcome)
        .await
        .context("failed to store results")?;
    if discarded > 0 {
        eprintln!("  {discarded} result(s) were malformed and discarded.");
    }

    println!(
        "Batch {}: {} succeeded, {} failed. View with `simdeck show --mode {}`.",
        outcome.batch_id,
        outcome.success_count(),
        outcome.failure_count(),
        mode
    );
    Ok(())
}

/// Lines describing a settled batch, or the single batch-level error when
/// nothing succeeded. Per-item reasons are only listed next to at least one
/// success.
fn batch_report(outcome: &BatchOutcome) -> Result<Vec<String>, RunnerError> {
    outcome.ensure_any_success()?;

    let mut lines: Vec<String> = outcome
        .failures()
        .map(|(config, reason)| format!("  {} failed: {}", config.label, reason))
        .collect();
    if outcome.cancelled {
        lines.push(format!(
            "Batch cancelled after {} of {} scenario(s).",
            outcome.items.len(),
            outcome.submitted
        ));
    }
    Ok(lines)
}

/// Validates the successful payloads of `outcome` and replaces the stored
/// results of `mode` with them. Returns how many payloads were discarded.
async fn store_results(
    store: &dyn ResultStore,
    mode: ScenarioMode,
    outcome: &BatchOutcome,
) -> anyhow::Result<usize> {
    let records = outcome.records();
    let validated = validate_batch(mode, &records);

    let stored = validated
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    store.write(mode.storage_key(), &stored).await?;

    Ok(records.len() - validated.len())
}

// ==============================================================================
// Show Command Logic
// ==============================================================================

async fn handle_show(args: ShowArgs, settings: &Settings) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&settings.storage.directory);
    let results = load_results(&store, args.mode).await;
    if results.is_empty() {
        println!(
            "No {} results found. Run a batch first with `simdeck run --mode {} --scenarios <file>`.",
            args.mode, args.mode
        );
        return Ok(());
    }

    match args.mode {
        ScenarioMode::MonteCarlo => show_distributions(&results, &args, settings),
        ScenarioMode::PortfolioBacktest | ScenarioMode::Probability => {
            show_series(&results, args.format, settings)
        }
    }
}

/// Reads back and re-validates the stored results of `mode`. Anything that
/// cannot be read is treated as no results.
async fn load_results(store: &dyn ResultStore, mode: ScenarioMode) -> Vec<ValidatedResult> {
    match store.read(mode.storage_key()).await {
        Ok(Some(raws)) => validate_batch(mode, &raws),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(%mode, error = %e, "Ignoring unreadable stored results.");
            Vec::new()
        }
    }
}

fn show_series(
    results: &[ValidatedResult],
    format: OutputFormat,
    settings: &Settings,
) -> anyhow::Result<()> {
    let series: Vec<NamedSeries> = results
        .iter()
        .filter_map(ValidatedResult::named_series)
        .collect();
    let rows = align(&series, settings.charts.precision);

    match format {
        OutputFormat::Json => {
            let view = render::SeriesView::new(results, &series, &rows);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Table => {
            println!("{}", render::cards_table(results));
            println!(
                "{}",
                render::aligned_table(&series, &rows, settings.charts.precision as usize)
            );
        }
    }
    Ok(())
}

fn show_distributions(
    results: &[ValidatedResult],
    args: &ShowArgs,
    settings: &Settings,
) -> anyhow::Result<()> {
    let views: Vec<render::DistributionView> = results
        .iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            ValidatedResult::MonteCarlo(record) => Some(render::DistributionView::new(
                index,
                record,
                args.target_return,
                settings.charts.histogram_buckets,
                settings.charts.label_precision,
            )),
            _ => None,
        })
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        OutputFormat::Table => {
            println!("{}", render::cards_table(results));
            for view in &views {
                println!("{}", view.title());
                println!("{}", render::histogram_table(view));
            }
        }
    }
    Ok(())
}

// ==============================================================================
// Tickers Command Logic
// ==============================================================================

async fn handle_tickers(args: TickersArgs, settings: &Settings) -> anyhow::Result<()> {
    let client = HttpSimulationClient::new(&settings.api)?;
    let tickers = client
        .list_tickers(args.quote.as_deref())
        .await
        .context("failed to fetch the ticker list")?;

    if tickers.is_empty() {
        println!("The service has no tickers to offer.");
        return Ok(());
    }
    println!("{}", render::tickers_table(&tickers));
    println!("{} symbol(s)", tickers.len());
    Ok(())
}
