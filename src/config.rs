// Configuration management

use crate::core::errors::VerifyError;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables
///
/// The store connection string and the provider API key are externally
/// supplied secrets; everything else has a sensible default. All values are
/// validated on load with clear error messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Credential store configuration
    pub mongodb_url: String,

    // Email provider configuration
    pub sendgrid_api_key: String,
    pub sender_email: String,

    // Verification configuration
    pub accepted_domains: Vec<String>,
    pub website_domain: String,
    pub otp_ttl_secs: i64,
    // Echo the issued OTP in the HTTP response in addition to emailing it
    pub return_otp_in_response: bool,

    // CORS configuration (exactly one permitted origin)
    pub allowed_origin: String,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    /// Validates all required fields.
    pub fn from_env() -> Result<Self, VerifyError> {
        // Load .env file if present (development)
        // Skip in test environment to avoid interfering with test environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0"),
            port: Self::parse_env_or("PORT", 8000)?,
            mongodb_url: Self::get_required_env("MONGODB_URL")?,
            sendgrid_api_key: Self::get_required_env("SENDGRID_API_KEY")?,
            sender_email: Self::get_env_or_default("SENDER_EMAIL", "contact@yeklabs.com"),
            accepted_domains: Self::parse_accepted_domains(),
            website_domain: Self::get_env_or_default("WEBSITE_DOMAIN", "https://medipoldao.com"),
            otp_ttl_secs: Self::parse_env_or("OTP_TTL_SECS", 300)?,
            return_otp_in_response: Self::parse_bool_or_default("RETURN_OTP_IN_RESPONSE", true)?,
            allowed_origin: Self::get_env_or_default("ALLOWED_ORIGIN", "http://localhost:3000"),
            request_timeout_secs: Self::parse_env_or("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_env_or("BODY_SIZE_LIMIT_BYTES", 2 * 1024 * 1024)?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info"),
            log_format: Self::get_env_or_default("LOG_FORMAT", "json"),
        };

        // Post-load validation
        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get required environment variable
    fn get_required_env(key: &str) -> Result<String, VerifyError> {
        let value =
            env::var(key).map_err(|_| VerifyError::Configuration(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(VerifyError::Configuration(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Parse the comma-separated list of accepted email domains
    fn parse_accepted_domains() -> Vec<String> {
        match env::var("ACCEPTED_EMAIL_DOMAINS") {
            Ok(value) if !value.is_empty() => value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => vec![
                "@std.medipol.edu.tr".to_string(),
                "@st.medipol.edu.tr".to_string(),
                "@yeklabs.com".to_string(),
            ],
        }
    }

    /// Parse a numeric value from the environment, falling back to `default`
    /// when the variable is unset. Range checks live in [`Config::validate`].
    fn parse_env_or<T>(key: &str, default: T) -> Result<T, VerifyError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(key) {
            Ok(value) => value.parse::<T>().map_err(|e| {
                VerifyError::Configuration(format!("Invalid {} value '{}': {}", key, value, e))
            }),
            _ => Ok(default),
        }
    }

    /// Parse bool from environment variable or return default
    fn parse_bool_or_default(key: &str, default: bool) -> Result<bool, VerifyError> {
        match env::var(key) {
            Ok(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(VerifyError::Configuration(format!(
                    "Invalid {} value '{}': must be true or false",
                    key, value
                ))),
            },
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), VerifyError> {
        if self.port == 0 {
            return Err(VerifyError::Configuration(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        if self.otp_ttl_secs <= 0 {
            return Err(VerifyError::Configuration(
                "OTP_TTL_SECS must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.body_size_limit_bytes == 0 {
            return Err(VerifyError::Configuration(
                "REQUEST_TIMEOUT_SECS and BODY_SIZE_LIMIT_BYTES must be greater than 0"
                    .to_string(),
            ));
        }

        if self.accepted_domains.is_empty() {
            return Err(VerifyError::Configuration(
                "ACCEPTED_EMAIL_DOMAINS must contain at least one domain".to_string(),
            ));
        }

        // Validate URLs
        Self::validate_url(&self.mongodb_url, "MongoDB URL")?;
        Self::validate_url(&self.website_domain, "Website domain")?;
        Self::validate_url(&self.allowed_origin, "Allowed origin")?;

        // Validate log level
        Self::validate_log_level(&self.log_level)?;

        // Validate log format
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate URL format
    fn validate_url(url: &str, description: &str) -> Result<(), VerifyError> {
        url::Url::parse(url).map_err(|e| {
            VerifyError::Configuration(format!("Invalid {} '{}': {}", description, url, e))
        })?;
        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), VerifyError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(VerifyError::Configuration(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), VerifyError> {
        if format != "json" && format != "text" {
            return Err(VerifyError::Configuration(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Create a test configuration for unit tests
    ///
    /// This bypasses environment variable loading for use in tests that
    /// don't need real configuration.
    pub fn test_config() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            mongodb_url: "mongodb://localhost:27017".to_string(),
            sendgrid_api_key: "SG.test-key".to_string(),
            sender_email: "contact@yeklabs.com".to_string(),
            accepted_domains: vec![
                "@std.medipol.edu.tr".to_string(),
                "@st.medipol.edu.tr".to_string(),
                "@yeklabs.com".to_string(),
            ],
            website_domain: "https://medipoldao.com".to_string(),
            otp_ttl_secs: 300,
            return_otp_in_response: true,
            allowed_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            body_size_limit_bytes: 2 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_or_default() {
        env::set_var("TEST_VAR", "test_value");
        assert_eq!(
            Config::get_env_or_default("TEST_VAR", "default"),
            "test_value"
        );
        env::remove_var("TEST_VAR");
    }

    #[test]
    fn test_get_env_or_default_missing() {
        env::remove_var("TEST_VAR_MISSING");
        assert_eq!(
            Config::get_env_or_default("TEST_VAR_MISSING", "default"),
            "default"
        );
    }

    #[test]
    fn test_get_required_env_missing() {
        env::remove_var("TEST_REQUIRED_MISSING");
        assert!(Config::get_required_env("TEST_REQUIRED_MISSING").is_err());
    }

    #[test]
    fn test_parse_env_or_set_and_default() {
        env::set_var("TEST_NUM", "8080");
        assert_eq!(Config::parse_env_or::<u16>("TEST_NUM", 8000).unwrap(), 8080);
        env::remove_var("TEST_NUM");

        env::remove_var("TEST_NUM_MISSING");
        assert_eq!(
            Config::parse_env_or::<u16>("TEST_NUM_MISSING", 8000).unwrap(),
            8000
        );
    }

    #[test]
    fn test_parse_env_or_rejects_out_of_range() {
        env::set_var("TEST_NUM_BIG", "99999");
        assert!(Config::parse_env_or::<u16>("TEST_NUM_BIG", 8000).is_err());
        env::remove_var("TEST_NUM_BIG");
    }

    #[test]
    fn test_validate_rejects_nonpositive_ttl() {
        let mut config = Config::test_config();
        config.otp_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool_or_default() {
        env::remove_var("TEST_BOOL");
        assert!(Config::parse_bool_or_default("TEST_BOOL", true).unwrap());

        env::set_var("TEST_BOOL", "false");
        assert!(!Config::parse_bool_or_default("TEST_BOOL", true).unwrap());

        env::set_var("TEST_BOOL", "maybe");
        assert!(Config::parse_bool_or_default("TEST_BOOL", true).is_err());
        env::remove_var("TEST_BOOL");
    }

    #[test]
    fn test_parse_accepted_domains_default() {
        env::remove_var("ACCEPTED_EMAIL_DOMAINS");
        let domains = Config::parse_accepted_domains();
        assert_eq!(
            domains,
            vec!["@std.medipol.edu.tr", "@st.medipol.edu.tr", "@yeklabs.com"]
        );
    }

    #[test]
    fn test_parse_accepted_domains_from_env() {
        env::set_var("ACCEPTED_EMAIL_DOMAINS", "@example.edu, @other.edu");
        let domains = Config::parse_accepted_domains();
        assert_eq!(domains, vec!["@example.edu", "@other.edu"]);
        env::remove_var("ACCEPTED_EMAIL_DOMAINS");
    }

    #[test]
    fn test_validate_log_level() {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        for level in valid_levels {
            assert!(Config::validate_log_level(level).is_ok());
        }
    }

    #[test]
    fn test_validate_log_level_invalid() {
        assert!(Config::validate_log_level("invalid").is_err());
    }

    #[test]
    fn test_validate_log_format() {
        assert!(Config::validate_log_format("json").is_ok());
        assert!(Config::validate_log_format("text").is_ok());
    }

    #[test]
    fn test_validate_log_format_invalid() {
        assert!(Config::validate_log_format("invalid").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Config::validate_url("mongodb://localhost:27017", "MongoDB URL").is_ok());
        assert!(Config::validate_url("http://localhost:3000", "Allowed origin").is_ok());
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(Config::validate_url("not-a-url", "Test URL").is_err());
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(Config::test_config().validate().is_ok());
    }
}
