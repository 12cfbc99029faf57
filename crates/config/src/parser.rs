use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StockFlowConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;

    let config: StockFlowConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> StockFlowConfig {
    StockFlowConfig {
        service: ServiceConfig {
            name: "stockflow".to_string(),
            description: "Correlated stock analysis pipeline".to_string(),
            version: "1.0.0".to_string(),
        },
        logging: LoggingConfig::default(),
        metrics: MetricsConfig::default(),
        correlator: CorrelatorConfig::default(),
        cache: CacheTtlConfig::default(),
        analysis: AnalysisConfig::default(),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(
    config: &StockFlowConfig,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = generate_default_config();
        let report = validate_config(&config);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_minimal_yaml_applies_defaults() {
        let yaml = "service:\n  name: stockflow\n  version: 1.0.0\n";
        let config: StockFlowConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.correlator.fetch_timeout_seconds, 30);
        assert_eq!(config.cache.processing_ttl_seconds, 300);
        assert_eq!(config.cache.result_ttl_seconds, 86400);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.analysis.sma.enabled);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = generate_default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: StockFlowConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.service.name, config.service.name);
        assert_eq!(
            back.correlator.fetch_timeout_seconds,
            config.correlator.fetch_timeout_seconds
        );
    }
}
