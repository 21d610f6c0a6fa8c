//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use fxrates_sdmx::{ClientConfig, DEFAULT_BASE_URL, parse_header};

/// Deployment environment, selects the log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl AppEnv {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => anyhow::bail!("APP_ENV must be one of local, dev, prod (got {:?})", other),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub database_url: String,
    pub client: ClientConfig,
    pub base_currency: String,
    pub target_currency: String,
    pub lookback_days: u32,
    pub interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let app_env = AppEnv::parse(&var("APP_ENV", "local"))?;

        let timeout_secs: u64 = var("FXRATES_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| anyhow::anyhow!("FXRATES_TIMEOUT_SECS: {}", e))?;
        let accept_invalid_certs: bool = var("FXRATES_ACCEPT_INVALID_CERTS", "false")
            .parse()
            .map_err(|e| anyhow::anyhow!("FXRATES_ACCEPT_INVALID_CERTS: {}", e))?;
        let static_header = lookup("FXRATES_AUTH_HEADER")
            .map(|raw| {
                parse_header(&raw).ok_or_else(|| {
                    anyhow::anyhow!("FXRATES_AUTH_HEADER must look like `Name: value`")
                })
            })
            .transpose()?;

        let lookback_days: u32 = var("FXRATES_LOOKBACK_DAYS", "7")
            .parse()
            .map_err(|e| anyhow::anyhow!("FXRATES_LOOKBACK_DAYS: {}", e))?;
        let interval_secs: u64 = var("FXRATES_INTERVAL_SECS", "3600")
            .parse()
            .map_err(|e| anyhow::anyhow!("FXRATES_INTERVAL_SECS: {}", e))?;
        if interval_secs == 0 {
            anyhow::bail!("FXRATES_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            app_env,
            database_url,
            client: ClientConfig {
                base_url: var("FXRATES_API_BASE_URL", DEFAULT_BASE_URL),
                timeout: Duration::from_secs(timeout_secs),
                accept_invalid_certs,
                static_header,
            },
            base_currency: var("FXRATES_BASE_CURRENCY", "USD"),
            target_currency: var("FXRATES_TARGET_CURRENCY", "EUR"),
            lookback_days,
            interval: Duration::from_secs(interval_secs),
        })
    }
}
