//! API configuration

use core_kernel::Timezone;
use serde::{Deserialize, Serialize};

/// API configuration
///
/// Every field can be overridden by a `SAV_`-prefixed environment variable,
/// e.g. `SAV_PORT=9090` or `SAV_BUSINESS_TIMEZONE=Europe/Brussels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// IANA zone used for "today" and calendar months on the dashboard
    pub business_timezone: Timezone,
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/sav".to_string(),
            log_level: "info".to_string(),
            business_timezone: Timezone::default(),
            db_max_connections: 10,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `SAV_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(config::Environment::with_prefix("SAV"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.business_timezone.name(), "Europe/Paris");
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_timezone_round_trips_through_config_source() {
        let config: ApiConfig = config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default()).unwrap())
            .set_override("business_timezone", "America/Montreal")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.business_timezone.name(), "America/Montreal");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let result: Result<ApiConfig, _> = config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default()).unwrap())
            .set_override("business_timezone", "Mars/Olympus")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
