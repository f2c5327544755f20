use analytics::{
    AssetSnapshot, CachedEngine, MaKind, MetricReport, MetricsEngine, Snapshot, Summarizer, flatten,
};
use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use core_types::{Asset, RawObservation};
use series_store::SeriesStore;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the market health engine.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional config overrides.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Descriptive market-health metrics for BTC and ETH daily series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every metric and print the point-in-time snapshot.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// JSON array of BTC observations: [{"date": "YYYY-MM-DD", "close": .., "volume": ..}].
    #[arg(long)]
    btc: PathBuf,

    /// JSON array of ETH observations, same format as --btc.
    #[arg(long)]
    eth: PathBuf,

    /// Configuration file. Defaults to ./config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Summarize at this date instead of the latest aligned date (format: YYYY-MM-DD).
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Write the flat (date, asset) metric table to this JSON file.
    #[arg(long)]
    export: Option<PathBuf>,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Loads both series, runs the engine and prints the results.
fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    let store = SeriesStore::new();
    for (asset, path) in [(Asset::Btc, &args.btc), (Asset::Eth, &args.eth)] {
        let records = read_observations(path)?;
        let report = store.ingest(asset, records);
        if report.accepted == 0 {
            bail!("No valid {} observations in {}", asset, path.display());
        }
        if !report.is_clean() {
            tracing::warn!(
                %asset,
                rejected = report.rejected.len(),
                path = %path.display(),
                "Some observations were skipped."
            );
        }
    }

    let engine = CachedEngine::new(MetricsEngine::new(config.windows.clone()));
    let report = engine.run(&store.snapshot());

    let summarizer = match args.reference_date {
        Some(date) => Summarizer::at(&report, date),
        None => Summarizer::new(&report)?,
    };
    let snapshot = summarizer.snapshot(&config.summary.lookbacks_days);

    println!("{}", snapshot_table(&snapshot));
    println!("{}", recent_table(&report, &config));

    if let Some(path) = &args.export {
        let rows = flatten(&report);
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &rows).context("Failed to write export")?;
        tracing::info!(rows = rows.len(), path = %path.display(), "Export written.");
    }

    Ok(())
}

fn read_observations(path: &Path) -> anyhow::Result<Vec<RawObservation>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse observations in {}", path.display()))
}

// ==============================================================================
// Presentation
// ==============================================================================

fn snapshot_table(snapshot: &Snapshot) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        format!("Snapshot @ {}", snapshot.reference_date),
        "BTC".to_string(),
        "ETH".to_string(),
    ]);

    add_row(&mut table, "Close", per_asset(snapshot, |s| {
        fmt_opt(s.close, |v| format!("${v:.0}"))
    }));
    add_row(&mut table, "Drawdown from peak", per_asset(snapshot, |s| {
        fmt_opt(s.drawdown_pct, |v| format!("{v:.1}%"))
    }));
    add_row(&mut table, "Volatility (ann.)", per_asset(snapshot, |s| {
        fmt_opt(s.volatility, |v| format!("{:.1}%", v * 100.0))
    }));
    add_row(&mut table, "Volume trend", per_asset(snapshot, |s| {
        fmt_opt(s.volume_trend_pct, |v| format!("{v:+.1}%"))
    }));

    // Every asset carries the same (ma, lookback) entries in the same order.
    if let Some(first) = snapshot.assets.first() {
        for (index, entry) in first.days_above_ma.iter().enumerate() {
            let ma = match entry.ma {
                MaKind::Short => "short",
                MaKind::Long => "long",
            };
            let label = format!("Days above {ma} MA (last {}d)", entry.lookback_days);
            add_row(&mut table, &label, per_asset(snapshot, |s| {
                fmt_opt(s.days_above_ma.get(index).and_then(|d| d.pct), |v| {
                    format!("{v:.0}%")
                })
            }));
        }
    }

    add_row(
        &mut table,
        "BTC/ETH correlation",
        vec![fmt_opt(snapshot.correlation, |v| format!("{v:.3}")), String::new()],
    );
    table
}

fn per_asset(snapshot: &Snapshot, f: impl Fn(&AssetSnapshot) -> String) -> Vec<String> {
    Asset::ALL
        .iter()
        .map(|asset| snapshot.asset(*asset).map_or_else(|| "-".to_string(), &f))
        .collect()
}

fn add_row(table: &mut Table, label: &str, values: Vec<String>) {
    let mut row = vec![label.to_string()];
    row.extend(values);
    table.add_row(row);
}

fn recent_table(report: &MetricReport, config: &Config) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Asset", "Close", "MA long", "Vol (ann.)", "Drawdown", "Volume MA", "Corr",
    ]);

    let mut rows: Vec<_> = Asset::ALL
        .iter()
        .flat_map(|asset| report.tail(*asset, config.summary.recent_rows))
        .collect();
    rows.sort_by_key(|row| (row.date, row.asset));

    for row in rows {
        table.add_row(vec![
            row.date.to_string(),
            row.asset.to_string(),
            format!("${:.0}", row.close),
            fmt_opt(row.ma_long, |v| format!("${v:.0}")),
            fmt_opt(row.volatility, |v| format!("{:.1}%", v * 100.0)),
            format!("{:.1}%", row.drawdown_pct),
            fmt_opt(row.volume_ma_short, |v| format!("{v:.0}")),
            fmt_opt(
                report.correlation_at(row.date).and_then(|c| c.corr),
                |v| format!("{v:.3}"),
            ),
        ]);
    }
    table
}

/// Absent values render as a dash, never as zero.
fn fmt_opt(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "-".to_string(), f)
}
