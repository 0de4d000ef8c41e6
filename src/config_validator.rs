use crate::config::Config;
use crate::error::ApiError;
use std::net::SocketAddr;

/// Validates configuration objects for consistency and correctness
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the shared API secret
    pub fn validate_api_key(api_key: &str) -> Result<(), ApiError> {
        if api_key.is_empty() {
            return Err(ApiError::Configuration(
                "API key cannot be empty".to_string(),
            ));
        }

        // Could never be sent through `Authorization: ApiKey <token>`
        if api_key.chars().any(char::is_whitespace) {
            return Err(ApiError::Configuration(
                "API key cannot contain whitespace".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates a bind address
    pub fn validate_bind_address(address: &SocketAddr) -> Result<(), ApiError> {
        if address.port() == 0 {
            return Err(ApiError::Configuration(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the fallback log level
    pub fn validate_log_level(level: &str) -> Result<(), ApiError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ApiError::Configuration(format!(
                "Invalid log level '{}'. Must be one of: {:?}",
                level, valid_levels
            )));
        }

        Ok(())
    }

    /// Validates a complete server configuration
    pub fn validate_config(config: &Config) -> Result<(), ApiError> {
        Self::validate_api_key(&config.api_key)?;
        Self::validate_bind_address(&config.bind_addr)?;
        Self::validate_log_level(&config.log_level)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_api_key() {
        assert!(ConfigValidator::validate_api_key("dev-secret-key").is_ok());
    }

    #[test]
    fn test_invalid_api_key() {
        assert!(ConfigValidator::validate_api_key("").is_err());
        assert!(ConfigValidator::validate_api_key("two words").is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        assert!(ConfigValidator::validate_bind_address(&addr).is_err());
    }

    #[test]
    fn test_log_levels() {
        assert!(ConfigValidator::validate_log_level("debug").is_ok());
        assert!(ConfigValidator::validate_log_level("WARN").is_ok());
        assert!(ConfigValidator::validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate_config(&Config::default()).is_ok());
    }
}
