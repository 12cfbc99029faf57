use crate::*;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("correlator.fetch_timeout_seconds must be a positive integer")]
    ZeroFetchTimeout,

    #[error("cache.{field} must be a positive integer")]
    ZeroTtl { field: String },

    #[error("analysis.sma.default_period must be >= 1")]
    InvalidSmaPeriod,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

pub fn validate_config(config: &StockFlowConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_logging(&config.logging, &mut report);
    validate_timing(config, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }

    let version_ok = Regex::new(r"^\d+\.\d+\.\d+$")
        .map(|re| re.is_match(&service.version))
        .unwrap_or(false);
    if !version_ok {
        report.add_error(ValidationError::InvalidVersionFormat(
            service.version.clone(),
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    let valid_formats = ["pretty", "json", "compact"];
    if !valid_formats.contains(&logging.format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&logging.level.as_str()) {
        report.add_error(ValidationError::InvalidLogLevel(logging.level.clone()));
    }
}

fn validate_timing(config: &StockFlowConfig, report: &mut ValidationReport) {
    if config.correlator.fetch_timeout_seconds == 0 {
        report.add_error(ValidationError::ZeroFetchTimeout);
    }

    if config.cache.processing_ttl_seconds == 0 {
        report.add_error(ValidationError::ZeroTtl {
            field: "processing_ttl_seconds".to_string(),
        });
    }
    if config.cache.result_ttl_seconds == 0 {
        report.add_error(ValidationError::ZeroTtl {
            field: "result_ttl_seconds".to_string(),
        });
    }

    if config.cache.result_ttl_seconds < config.cache.processing_ttl_seconds {
        report.add_warning(
            "cache.result_ttl_seconds",
            "Terminal results expire before the PROCESSING pre-state; pollers may observe a stale PROCESSING after completion",
        );
    }

    if config.analysis.sma.default_period == 0 {
        report.add_error(ValidationError::InvalidSmaPeriod);
    }
}
