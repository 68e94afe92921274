//! Ratecache CLI
//!
//! Exchange rates for a calendar date, resolved through the local cache.

mod config;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ratecache_client::CbrClient;
use ratecache_hex::RateResolver;
use ratecache_repo::build_store;
use ratecache_types::{
    CancellationToken, Clock, DomainError, RateSource, RateStore, RatesResult, convert,
    ensure_selectable,
};

use config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "ratecache")]
#[command(author, version, about = "Exchange rates by date, cached locally", long_about = None)]
struct Cli {
    /// SQLite database URL (overrides RATES_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Base URL of the rate archive (overrides RATES_SOURCE_URL)
    #[arg(long)]
    source_url: Option<String>,

    /// How many dates to try, starting at the requested one
    #[arg(long)]
    lookback: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every rate for a date
    Rates {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert an amount between two currencies
    Convert {
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "RUB")]
        from: String,
        #[arg(long, default_value = "USD")]
        to: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,ratecache_hex=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Cancels `cancel` on Ctrl+C.
fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, canceling");
            cancel.cancel();
        }
    });
}

fn print_rates(result: &RatesResult, lookback: u32) {
    if result.is_empty() {
        println!(
            "No rates for {} or the {} days before it",
            result.requested_date,
            lookback.saturating_sub(1)
        );
        return;
    }

    if result.is_fallback() {
        println!(
            "Rates of {} (requested {})",
            result.actual_date, result.requested_date
        );
    } else {
        println!("Rates of {}", result.actual_date);
    }

    for record in &result.records {
        println!(
            "{:<4} {:>6} {:>14}  {}",
            record.currency_code, record.nominal, record.value, record.name
        );
    }
}

async fn run_convert<S: RateSource, St: RateStore>(
    resolver: &RateResolver<S, St>,
    date: NaiveDate,
    amount: Decimal,
    from: &str,
    to: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = resolver.resolve(date, cancel).await?;
    if result.is_empty() {
        anyhow::bail!("No rates available for {}", date);
    }
    let result = result.with_base();

    let from_rate = result
        .find(from)
        .ok_or_else(|| DomainError::UnknownCurrency(from.to_string()))?;
    let to_rate = result
        .find(to)
        .ok_or_else(|| DomainError::UnknownCurrency(to.to_string()))?;
    let converted = convert(amount, from_rate, to_rate)
        .ok_or_else(|| DomainError::UndefinedRate(to.to_string()))?;

    println!(
        "{} {} = {} {} (rates of {})",
        amount, from_rate.currency_code, converted, to_rate.currency_code, result.actual_date
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(url) = cli.source_url {
        config.source_url = url;
    }
    if let Some(lookback) = cli.lookback {
        if lookback == 0 {
            anyhow::bail!("--lookback must be at least 1");
        }
        config.max_lookback = lookback;
    }

    init_tracing(config.log_format);
    tracing::debug!(?config, "Loaded configuration");

    let clock = config.clock();
    let client = CbrClient::with_timeout(&config.source_url, config.request_timeout)?;
    let store = build_store(&config.database_url).await?;
    let resolver = RateResolver::with_lookback(client, store, config.max_lookback);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match cli.command {
        Commands::Rates { date, json } => {
            let date = ensure_selectable(date.unwrap_or_else(|| clock.today()), &clock)?;
            let result = resolver.resolve(date, &cancel).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_rates(&result, config.max_lookback);
            }
        }

        Commands::Convert {
            amount,
            from,
            to,
            date,
        } => {
            let date = ensure_selectable(date.unwrap_or_else(|| clock.today()), &clock)?;
            run_convert(&resolver, date, amount, &from, &to, &cancel).await?;
        }
    }

    Ok(())
}
