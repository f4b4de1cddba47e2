use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::{Error, Result};

/// All configuration loaded from environment variables at startup.
/// Every variable has a default except the Telegram pair, which is optional.
#[derive(Debug, Clone)]
pub struct Config {
    // Market data
    pub binance_base_url: String,
    pub kline_interval: String,
    pub kline_limit: u16,
    pub http_timeout: Duration,

    // Scanning
    pub scan_interval: Duration,
    pub scan_concurrency: usize,
    pub history_capacity: usize,
    pub rules_config_path: String,

    // Telegram
    pub telegram_token: Option<String>,
    pub telegram_chat_ids: Vec<i64>,
    pub alert_target_pct: f64,
    pub alert_stop_loss_pct: f64,

    // Dashboard
    pub dashboard_port: u16,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Fails on any value that does not parse.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_chat_ids = match lookup("TELEGRAM_CHAT_IDS") {
            Some(raw) => parse_chat_ids(&raw)?,
            None => Vec::new(),
        };

        let kline_limit: u16 = parse_or(&lookup, "KLINE_LIMIT", 100)?;
        // Binance futures caps a kline request at 1500 rows.
        if kline_limit == 0 || kline_limit > 1500 {
            return Err(Error::Config(format!(
                "KLINE_LIMIT must be within 1..=1500, got {kline_limit}"
            )));
        }

        let scan_minutes: u64 = parse_or(&lookup, "SCAN_INTERVAL_MINUTES", 15)?;
        if scan_minutes == 0 {
            return Err(Error::Config("SCAN_INTERVAL_MINUTES must be positive".into()));
        }
        let scan_secs = scan_minutes.checked_mul(60).ok_or_else(|| {
            Error::Config(format!("SCAN_INTERVAL_MINUTES={scan_minutes} is too large"))
        })?;

        let telegram_token = lookup("TELEGRAM_TOKEN").filter(|t| !t.trim().is_empty());
        if telegram_token.is_some() != !telegram_chat_ids.is_empty() {
            warn!("Only one of TELEGRAM_TOKEN / TELEGRAM_CHAT_IDS is set — Telegram stays disabled");
        }

        Ok(Config {
            binance_base_url: lookup("BINANCE_BASE_URL")
                .unwrap_or_else(|| "https://fapi.binance.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            kline_interval: lookup("KLINE_INTERVAL").unwrap_or_else(|| "15m".to_string()),
            kline_limit,
            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 10)?),
            scan_interval: Duration::from_secs(scan_secs),
            scan_concurrency: parse_or::<usize, _>(&lookup, "SCAN_CONCURRENCY", 8)?.max(1),
            history_capacity: parse_or::<usize, _>(&lookup, "HISTORY_CAPACITY", 100)?.max(1),
            rules_config_path: lookup("RULES_CONFIG_PATH")
                .unwrap_or_else(|| "config/rules.toml".to_string()),
            telegram_token,
            telegram_chat_ids,
            alert_target_pct: parse_or(&lookup, "ALERT_TARGET_PCT", 0.02)?,
            alert_stop_loss_pct: parse_or(&lookup, "ALERT_STOP_LOSS_PCT", 0.01)?,
            dashboard_port: parse_or(&lookup, "DASHBOARD_PORT", 5010)?,
        })
    }

    /// Telegram delivery is enabled only when both a token and at least one chat are set.
    pub fn telegram_enabled(&self) -> bool {
        self.telegram_token.is_some() && !self.telegram_chat_ids.is_empty()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{key}='{raw}' is invalid: {e}"))),
        None => Ok(default),
    }
}

fn parse_chat_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                Error::Config(format!("TELEGRAM_CHAT_IDS contains non-numeric ID: '{s}'"))
            })
        })
        .collect()
}
