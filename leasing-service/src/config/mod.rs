//! Configuration module for leasing-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

/// Upper bound on lines in one request document.
pub const DEFAULT_MAX_LINES_PER_DOCUMENT: usize = 500;

#[derive(Debug, Clone)]
pub struct LeasingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// JSON unit catalog used to seed rent; seeding is skipped when unset.
    pub unit_catalog_path: Option<PathBuf>,
    pub max_lines_per_document: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unit_catalog_path: None,
            max_lines_per_document: DEFAULT_MAX_LINES_PER_DOCUMENT,
        }
    }
}

impl LeasingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let max_lines_per_document = match env::var("MAX_LINES_PER_DOCUMENT") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!(
                    "MAX_LINES_PER_DOCUMENT must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_MAX_LINES_PER_DOCUMENT,
        };

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "leasing-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            engine: EngineConfig {
                unit_catalog_path: env::var("UNIT_CATALOG_PATH")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
                max_lines_per_document,
            },
        })
    }
}
