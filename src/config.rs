// Runtime configuration, read from the environment (and `.env` if present)

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "budget.db";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Config {
    /// LEDGER_DB_PATH
    pub db_path: PathBuf,
    /// LEDGER_LISTEN_ADDR
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Only LEDGER_DB_PATH; the CLI never binds a socket
    pub fn db_path_from_env() -> PathBuf {
        dotenvy::dotenv().ok();
        Self::db_path_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn db_path_from_lookup<F>(lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        non_empty(&lookup, "LEDGER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(&lookup, key);
        let db_path = Self::db_path_from_lookup(&lookup);

        let raw_addr = get("LEDGER_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .with_context(|| format!("Invalid LEDGER_LISTEN_ADDR: {}", raw_addr))?;

        Ok(Config {
            db_path,
            listen_addr,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}
