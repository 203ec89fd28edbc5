use crate::models::PartnerConfig;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    /// Where the ledger snapshot is written after every committed mutation.
    pub snapshot_path: PathBuf,
    /// Partner configuration used when no snapshot exists yet.
    pub seed_partners: Option<PartnerConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("BOOKKEEPING_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("BOOKKEEPING_SERVICE_PORT")
            .unwrap_or_else(|_| "3010".to_string())
            .parse()
            .context("BOOKKEEPING_SERVICE_PORT must be a port number")?;

        let snapshot_path = env::var("BOOKKEEPING_SNAPSHOT_PATH")
            .unwrap_or_else(|_| "data/ledger.json".to_string())
            .into();

        let seed_partners = match env::var("BOOKKEEPING_SEED_PARTNERS") {
            Ok(raw) => Some(
                serde_json::from_str(&raw)
                    .context("BOOKKEEPING_SEED_PARTNERS must be a JSON partner map")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            storage: StorageConfig {
                snapshot_path,
                seed_partners,
            },
            service_name: "bookkeeping-service".to_string(),
        })
    }
}
