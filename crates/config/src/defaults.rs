pub fn default_enabled() -> bool {
    true
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_metrics_port() -> u16 {
    9100
}

pub fn default_fetch_timeout_seconds() -> u64 {
    30
}

pub fn default_processing_ttl_seconds() -> u64 {
    300
}

pub fn default_result_ttl_seconds() -> u64 {
    86400
}

pub fn default_sma_period() -> u64 {
    20
}
