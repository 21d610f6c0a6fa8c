//! FX Rates CLI
//!
//! One-off ingestion and queries against a rate store.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use fxrates_repo::build_repo;
use fxrates_sdmx::{ClientConfig, DEFAULT_BASE_URL, SdmxClient, parse_header};
use fxrates_service::RateService;
use fxrates_types::{ExchangeRateRequest, RateSeriesQuery};

#[derive(Parser)]
#[command(name = "fxrates")]
#[command(author, version, about = "Exchange-rate ingestion CLI", long_about = None)]
struct Cli {
    /// Rate store URL (postgres://, sqlite:// or memory://)
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct UpstreamArgs {
    /// SDMX dataflow base URL
    #[arg(long, env = "FXRATES_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base_url: String,

    /// Fetch deadline in seconds
    #[arg(long, env = "FXRATES_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Skip TLS certificate validation
    #[arg(long, env = "FXRATES_ACCEPT_INVALID_CERTS")]
    accept_invalid_certs: bool,

    /// Static header sent with every request, as `Name: value`
    #[arg(long, env = "FXRATES_AUTH_HEADER")]
    auth_header: Option<String>,
}

#[derive(Args)]
struct PairArgs {
    /// Base currency (e.g. USD)
    #[arg(long, default_value = "USD")]
    base: String,
    /// Target currency (e.g. EUR)
    #[arg(long, default_value = "EUR")]
    target: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the period from the upstream and store it
    Ingest {
        #[command(flatten)]
        pair: PairArgs,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
    /// Print the stored series for the period
    Query {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Print the stored rate for a single day
    Rate {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        date: NaiveDate,
    },
}

impl UpstreamArgs {
    fn client_config(&self) -> Result<ClientConfig> {
        let static_header = self
            .auth_header
            .as_deref()
            .map(|raw| {
                parse_header(raw).ok_or_else(|| {
                    anyhow::anyhow!("Invalid header {:?}, expected `Name: value`", raw)
                })
            })
            .transpose()?;

        Ok(ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
            static_header,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let repo = build_repo(&cli.database_url).await?;
    let client = SdmxClient::new(cli.upstream.client_config()?)?;
    let service = RateService::new(client, repo);

    match cli.command {
        Commands::Ingest { pair, from, to } => {
            let request = ExchangeRateRequest::new(pair.base, pair.target, from, to)?;
            let summary = service.ingest(&request).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Query { pair, from, to } => {
            let series = service
                .rate_series(&RateSeriesQuery {
                    base_currency: pair.base,
                    target_currency: pair.target,
                    date_from: from,
                    date_to: to,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }

        Commands::Rate { pair, date } => {
            let rate = service.rate_on(&pair.base, &pair.target, date).await?;
            let out = serde_json::json!({
                "date": date,
                "base_currency": pair.base.to_uppercase(),
                "target_currency": pair.target.to_uppercase(),
                "rate": rate,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            if rate.is_none() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
