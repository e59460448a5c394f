//! Spreadlab CLI — cross-exchange premium backtesting commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config and write artifacts
//! - `recommend` — single-date trade recommendation with projection
//! - `sweep` — grid-search strategy parameters over the same data
//! - `synth` — generate a reproducible synthetic price CSV

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use spreadlab_runner::config::BacktestConfig;
use spreadlab_runner::data_loader::{load_prices_csv, LoadedTable};
use spreadlab_runner::metrics::benchmark_return;
use spreadlab_runner::recommend::{recommend, Recommendation, RecommendOutcome};
use spreadlab_runner::runner::{run_backtest, BacktestOutcome};
use spreadlab_runner::sweep::{run_sweep, ParamGrid};
use spreadlab_runner::synthetic::synthetic_table;
use spreadlab_runner::{export, BacktestResult};

#[derive(Parser)]
#[command(
    name = "spreadlab",
    about = "Spreadlab CLI — cross-exchange premium mean-reversion backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Recommend a trade for one date, with a forward projection.
    Recommend {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Target date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Capital to size the projected profit with. Defaults to the
        /// configured initial capital.
        #[arg(long)]
        capital: Option<f64>,
    },
    /// Grid-search strategy parameters over the configured data.
    Sweep {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Show only the top N rows.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Generate a reproducible synthetic price CSV.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        /// Number of daily rows.
        #[arg(long, default_value_t = 365)]
        days: usize,

        /// RNG seed; the same seed always produces the same file.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config, output_dir } => cmd_run(&config, &output_dir),
        Commands::Recommend {
            config,
            date,
            capital,
        } => cmd_recommend(&config, &date, capital),
        Commands::Sweep { config, top } => cmd_sweep(&config, top),
        Commands::Synth { out, days, seed } => cmd_synth(&out, days, seed),
    }
}

fn load(config_path: &PathBuf) -> Result<(BacktestConfig, LoadedTable)> {
    let config = BacktestConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let data = load_prices_csv(&config.data.prices)
        .with_context(|| format!("loading prices {}", config.data.prices.display()))?;
    Ok((config, data))
}

fn cmd_run(config_path: &PathBuf, output_dir: &PathBuf) -> Result<()> {
    let (config, data) = load(config_path)?;
    match run_backtest(&config, &data)? {
        BacktestOutcome::InsufficientData { rows, required } => {
            // A data condition, not a failure: explain and exit cleanly
            println!(
                "Not enough data: {rows} rows loaded, {required} needed for a \
                 {}-day rolling window.",
                config.strategy.rolling_window
            );
        }
        BacktestOutcome::Completed(result) => {
            print_summary(&result);
            let paths = export::save_artifacts(output_dir, &result)?;
            println!("\nArtifacts:");
            for path in paths {
                println!("  {}", path.display());
            }
        }
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!("Run {} ({} pairs)", &result.run_id[..12], result.pair_ids.len());
    if result.has_synthetic {
        println!("  [synthetic data]");
    }
    println!("  trades             {}", m.total_trades);
    println!("  final return       {:+.2}%", m.final_return * 100.0);
    println!("  annualized return  {:+.2}%", m.annualized_return * 100.0);
    println!("  win rate           {:.1}%", m.win_rate * 100.0);
    println!("  sharpe             {:.2}", m.sharpe);
    println!("  max drawdown       {:.2}%", m.max_drawdown * 100.0);
    println!("  avg holding        {:.1} days", m.avg_holding_days);
    println!("  benchmark return   {:+.2}%", m.benchmark_return * 100.0);
    println!("  excess return      {:+.2}%", m.excess_return * 100.0);
    if let Some(open) = &result.open_position {
        println!(
            "  open position      {} {} since {} ({} days)",
            open.position.pair_id,
            open.position.direction.as_str(),
            open.position.entry_date,
            open.holding_days
        );
    }
}

fn cmd_recommend(config_path: &PathBuf, date: &str, capital: Option<f64>) -> Result<()> {
    let (config, data) = load(config_path)?;
    let target = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
    let capital = capital.unwrap_or(config.strategy.initial_capital);

    match recommend(&config, &data, target, capital)? {
        RecommendOutcome::InsufficientData { rows, required } => {
            println!("Not enough data: {rows} rows loaded, {required} needed.");
        }
        RecommendOutcome::Report(report) => {
            if report.day_distance != 0 {
                println!(
                    "No data for {}; using nearest date {} ({} days away).",
                    report.requested_date,
                    report.resolved_date,
                    report.day_distance.abs()
                );
            }
            match &report.recommendation {
                Recommendation::Trade { idea, alternatives } => {
                    println!(
                        "{}: {} {} (z = {:+.2}, premium = {:+.2}%)",
                        report.resolved_date,
                        idea.direction.as_str(),
                        idea.pair_id,
                        idea.z_score,
                        idea.premium * 100.0
                    );
                    println!(
                        "  projected: {:+.2}% over {} days ({}), profit {:+.0}",
                        idea.expected_return * 100.0,
                        idea.expected_holding_days,
                        idea.expected_exit_reason
                            .map(|r| r.as_str())
                            .unwrap_or("still open at window end"),
                        idea.expected_profit
                    );
                    for alt in alternatives {
                        println!(
                            "  alternative: {} {} (z = {:+.2})",
                            alt.direction.as_str(),
                            alt.pair_id,
                            alt.z_score
                        );
                    }
                }
                Recommendation::NoQualifyingPair { suggestion, ranked } => {
                    println!(
                        "{}: no pair clears entry_z = {:.2}.",
                        report.resolved_date, config.strategy.entry_z
                    );
                    if let Some(best) = suggestion {
                        println!(
                            "  closest: {} {} (z = {:+.2}, premium = {:+.2}%)",
                            best.direction.as_str(),
                            best.pair_id,
                            best.z_score,
                            best.premium * 100.0
                        );
                    }
                    for candidate in ranked {
                        println!(
                            "    {}  z = {:+.2}",
                            candidate.pair_id, candidate.z_score
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_sweep(config_path: &PathBuf, top: usize) -> Result<()> {
    let (config, data) = load(config_path)?;
    let pairs = config.resolve_pairs();
    let benchmark = benchmark_return(&data.table, &config.data.benchmark_column);

    let entries = run_sweep(
        &ParamGrid::standard(),
        &config.strategy,
        &pairs,
        &data,
        benchmark,
    )?;
    if entries.is_empty() {
        println!("No sweep cell had enough data.");
        return Ok(());
    }

    println!(
        "{:<8} {:<7} {:<7} {:<9} {:>9} {:>8} {:>7}",
        "entry_z", "exit_z", "window", "stop", "return", "sharpe", "trades"
    );
    for entry in entries.iter().take(top) {
        println!(
            "{:<8.2} {:<7.2} {:<7} {:<9.3} {:>8.2}% {:>8.2} {:>7}",
            entry.params.entry_z,
            entry.params.exit_z,
            entry.params.rolling_window,
            entry.params.stop_loss,
            entry.metrics.final_return * 100.0,
            entry.metrics.sharpe,
            entry.metrics.total_trades
        );
    }
    Ok(())
}

fn cmd_synth(out: &PathBuf, days: usize, seed: u64) -> Result<()> {
    let table = synthetic_table(days, seed);
    let mut csv = String::from("date");
    let columns: Vec<String> = table.column_names().map(str::to_string).collect();
    for name in &columns {
        csv.push(',');
        csv.push_str(name);
    }
    csv.push('\n');
    for i in 0..table.len() {
        csv.push_str(&table.date_at(i).to_string());
        for name in &columns {
            csv.push(',');
            match table.price(name, i) {
                Some(price) => csv.push_str(&format!("{price:.2}")),
                None => {}
            }
        }
        csv.push('\n');
    }
    std::fs::write(out, csv).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {days} days × {} venues to {}", columns.len(), out.display());
    Ok(())
}
