use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level StockFlow configuration, loaded from YAML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StockFlowConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub correlator: CorrelatorConfig,
    #[serde(default)]
    pub cache: CacheTtlConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// One of: pretty, json, compact
    #[serde(default = "default_log_format")]
    pub format: String,
    /// One of: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorrelatorConfig {
    /// Deadline for one correlated data fetch
    #[serde(rename = "fetch_timeout_seconds")]
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
}

impl CorrelatorConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheTtlConfig {
    /// Lifetime of the PROCESSING pre-state
    #[serde(rename = "processing_ttl_seconds")]
    #[serde(default = "default_processing_ttl_seconds")]
    pub processing_ttl_seconds: u64,
    /// Lifetime of terminal statuses and result payloads
    #[serde(rename = "result_ttl_seconds")]
    #[serde(default = "default_result_ttl_seconds")]
    pub result_ttl_seconds: u64,
}

impl CacheTtlConfig {
    pub fn processing_ttl(&self) -> Duration {
        Duration::from_secs(self.processing_ttl_seconds)
    }

    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_seconds)
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            processing_ttl_seconds: default_processing_ttl_seconds(),
            result_ttl_seconds: default_result_ttl_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub sma: SmaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmaConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Window length used when a request omits `period`
    #[serde(rename = "default_period")]
    #[serde(default = "default_sma_period")]
    pub default_period: u64,
}

impl Default for SmaConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            default_period: default_sma_period(),
        }
    }
}
