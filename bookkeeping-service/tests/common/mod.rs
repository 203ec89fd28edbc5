use std::path::PathBuf;
use std::str::FromStr;

use bookkeeping_service::config::{Config, ServerConfig, StorageConfig};
use bookkeeping_service::Application;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    _snapshot_dir: Option<TempDir>,
}

impl TestApp {
    /// Spawn an app with its own throwaway snapshot directory.
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create snapshot dir");
        let path = dir.path().join("ledger.json");
        let mut app = Self::spawn_at(path).await;
        app._snapshot_dir = Some(dir);
        app
    }

    /// Spawn an app against an existing snapshot path (restart scenarios).
    pub async fn spawn_at(snapshot_path: PathBuf) -> Self {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            storage: StorageConfig {
                snapshot_path,
                seed_partners: None,
            },
            service_name: "bookkeeping-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            _snapshot_dir: None,
        }
    }

    pub async fn put_config(&self, config: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}/api/config", self.address))
            .json(config)
            .send()
            .await
            .expect("Failed to send config request")
    }

    pub async fn record_payment(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/payments", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to send payment request")
    }

    pub async fn record_extra(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/payments/extra", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to send extra payment request")
    }

    pub async fn edit_payment(&self, id: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}/api/payments/{}", self.address, id))
            .json(body)
            .send()
            .await
            .expect("Failed to send edit request")
    }

    pub async fn delete_payment(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/payments/{}", self.address, id))
            .send()
            .await
            .expect("Failed to send delete request")
    }

    pub async fn state(&self) -> Value {
        self.client
            .get(format!("{}/api/state", self.address))
            .send()
            .await
            .expect("Failed to fetch state")
            .json()
            .await
            .expect("State was not JSON")
    }

    pub async fn history(&self, limit: Option<usize>) -> Value {
        let url = match limit {
            Some(n) => format!("{}/api/history?limit={}", self.address, n),
            None => format!("{}/api/history", self.address),
        };
        self.client
            .get(url)
            .send()
            .await
            .expect("Failed to fetch history")
            .json()
            .await
            .expect("History was not JSON")
    }

    pub async fn breakdown(&self, month: u32, year: i32) -> reqwest::Response {
        self.client
            .get(format!(
                "{}/api/breakdown?month={}&year={}",
                self.address, month, year
            ))
            .send()
            .await
            .expect("Failed to fetch breakdown")
    }

    pub async fn reset(&self) -> reqwest::Response {
        self.client
            .post(format!("{}/api/reset", self.address))
            .send()
            .await
            .expect("Failed to send reset request")
    }
}

/// The worked three-partner example: debts 66250/66250/17500 (total
/// 150000), shares 0.30/0.30/0.40.
pub fn partnership() -> Value {
    json!({
        "bhargav": { "display_name": "Bhargav", "initial_debt": "66250", "share": "0.30" },
        "sagar": { "display_name": "Sagar", "initial_debt": "66250", "share": "0.30" },
        "bharat": { "display_name": "Bharat", "initial_debt": "17500", "share": "0.40" },
    })
}

/// Parse a Decimal out of its JSON string representation.
pub fn dec_field(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("expected a decimal string"))
        .expect("invalid decimal string")
}

pub fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < Decimal::new(1, 6),
        "expected {expected}, got {actual}"
    );
}
