//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PipelineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<ValidationError>),
}

fn join_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config.web.error_page_path, "/error");
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert!(config.web.page_log);
    }

    #[test]
    fn sections_override_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [web]
            base_path = "/app"
            page_log = false
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.web.base_path, "/app");
        assert!(!config.web.page_log);
        assert_eq!(config.web.session_cookie, "sid");
    }

    #[test]
    fn validation_errors_join_into_one_message() {
        let mut config = PipelineConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.web.session_cookie = String::new();
        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("listener.bind_address"));
        assert!(message.contains("web.session_cookie"));
        assert!(message.contains(", "));
    }
}
