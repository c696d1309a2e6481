//! Configuration validation.
//!
//! Semantic checks after serde parsing. Returns every violation, not just
//! the first, so a broken file can be fixed in one pass.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::PipelineConfig;

/// One semantic violation in a parsed configuration.
#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "not a valid socket address",
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if !config.web.error_page_path.starts_with('/') {
        errors.push(ValidationError::new(
            "web.error_page_path",
            "must be a site-relative path",
        ));
    }
    if !config.web.base_path.is_empty() && !config.web.base_path.starts_with('/') {
        errors.push(ValidationError::new(
            "web.base_path",
            "must be empty or start with '/'",
        ));
    }
    if config.web.session_cookie.is_empty() {
        errors.push(ValidationError::new(
            "web.session_cookie",
            "must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut config = PipelineConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.listener.request_timeout_secs = 0;
        config.web.error_page_path = "error".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn base_path_must_be_rooted() {
        let mut config = PipelineConfig::default();
        config.web.base_path = "app".to_string();
        assert!(validate_config(&config).is_err());
        config.web.base_path = "/app".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
