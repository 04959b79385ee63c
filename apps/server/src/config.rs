use anyhow::{bail, Context};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tradelens_core::quotes::{DEFAULT_FETCH_TIMEOUT, DEFAULT_HISTORY_DAYS};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub equity_tradebook_dir: Option<PathBuf>,
    pub mutual_funds_tradebook_dir: Option<PathBuf>,
    /// Root of the price history cache; books live under `EQ/` and `MF/`.
    pub data_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub history_days: i64,
    pub equity_symbol_suffix: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("TL_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8088".to_string())
            .parse()
            .context("Invalid TL_LISTEN_ADDR")?;
        let equity_tradebook_dir = env_path("TL_EQUITY_TRADEBOOK_DIR");
        let mutual_funds_tradebook_dir = env_path("TL_MF_TRADEBOOK_DIR");
        if equity_tradebook_dir.is_none() && mutual_funds_tradebook_dir.is_none() {
            bail!("At least one of TL_EQUITY_TRADEBOOK_DIR or TL_MF_TRADEBOOK_DIR must be set");
        }
        let data_dir = env_path("TL_DATA_DIR").unwrap_or_else(|| PathBuf::from("./data/trends"));
        let fetch_timeout_secs: u64 = std::env::var("TL_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT.as_secs());
        let history_days: i64 = std::env::var("TL_HISTORY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_DAYS);
        let equity_symbol_suffix =
            std::env::var("TL_EQUITY_SYMBOL_SUFFIX").unwrap_or_else(|_| ".NS".into());
        let cors_allow = std::env::var("TL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("TL_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".into())
            .parse()
            .unwrap_or(120_000);
        Ok(Self {
            listen_addr,
            equity_tradebook_dir,
            mutual_funds_tradebook_dir,
            data_dir,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            history_days,
            equity_symbol_suffix,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
