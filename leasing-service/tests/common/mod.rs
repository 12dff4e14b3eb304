//! Test helper module for leasing-service integration tests.
//!
//! Spawns the service on a random port with a temporary unit catalog.

#![allow(dead_code)]

use leasing_service::config::{EngineConfig, LeasingConfig};
use leasing_service::services::init_metrics;
use leasing_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use tempfile::NamedTempFile;

pub const TEST_UNIT_MONTHLY: &str = "UNIT-101";
pub const TEST_UNIT_YEARLY: &str = "UNIT-202";

/// Catalog contents: one unit priced monthly, one priced yearly over 4 installments.
pub fn test_catalog() -> Value {
    json!([
        { "unitId": TEST_UNIT_MONTHLY, "monthlyRent": "1500.00" },
        { "unitId": TEST_UNIT_YEARLY, "yearlyRent": "12000.00", "installmentCount": 4 }
    ])
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    _catalog: Option<NamedTempFile>,
}

impl TestApp {
    /// Spawn with the default test catalog.
    pub async fn spawn() -> Self {
        let mut file = NamedTempFile::new().expect("Failed to create catalog file");
        write!(file, "{}", test_catalog()).expect("Failed to write catalog file");
        let path = file.path().to_path_buf();
        Self::spawn_with(
            EngineConfig {
                unit_catalog_path: Some(path),
                ..EngineConfig::default()
            },
            Some(file),
        )
        .await
    }

    /// Spawn with a custom engine configuration.
    pub async fn spawn_with(engine: EngineConfig, catalog: Option<NamedTempFile>) -> Self {
        init_metrics();

        let config = LeasingConfig {
            common: CoreConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0, // Random port
            },
            service_name: "leasing-service-test".to_string(),
            service_version: "0.1.0".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            engine,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        Self {
            address,
            port,
            client,
            _catalog: catalog,
        }
    }

    /// POST a JSON body and return status plus parsed body.
    pub async fn post(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// 20 % VAT and an exempt rate.
pub fn test_tax_rates() -> Value {
    json!([
        { "id": "VAT20", "name": "Standard", "ratePercent": "20" },
        { "id": "EXEMPT", "name": "Exempt", "ratePercent": "20", "isExempt": true }
    ])
}

/// Parse a money string from a response body.
pub fn money(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("Invalid decimal string"),
        other => other.to_string().parse().expect("Invalid decimal"),
    }
}
