use std::env;

use crate::errors::ConfigError;

/// Prefix applied to every variable read by [`CoreConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "FAULTLINE_";

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Settings shared by every service.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: Option<String>,
    pub environment: Environment,
    pub service_name: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            environment: Environment::default(),
            service_name: "faultline".to_string(),
        }
    }
}

impl CoreConfig {
    /// Loads configuration from `.env` and the `FAULTLINE_` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `BILLING_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let database_url = read_optional(&key("DATABASE_URL"))?;
        let environment = read_optional(&key("ENV"))?
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();
        let service_name =
            read_optional(&key("SERVICE_NAME"))?.unwrap_or_else(|| "faultline".to_string());

        // Production always runs against a database.
        if environment == Environment::Production && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar(key("DATABASE_URL")));
        }

        Ok(Self {
            database_url,
            environment,
            service_name,
        })
    }

    /// Returns the Postgres URL if one is configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Whether the service is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn read_optional(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::InvalidEnvVar {
            key: key.to_string(),
            source: err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_without_variables() {
        let cfg = CoreConfig::from_env_with_prefix("CORE_TEST_EMPTY_").expect("config should load");
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.service_name, "faultline");
        assert!(cfg.database_url().is_none());
    }

    #[test]
    fn reads_prefixed_variables() {
        std::env::set_var("CORE_TEST_SET_ENV", "prod");
        std::env::set_var("CORE_TEST_SET_SERVICE_NAME", "billing");
        std::env::set_var("CORE_TEST_SET_DATABASE_URL", "  postgres://example  ");
        let cfg = CoreConfig::from_env_with_prefix("CORE_TEST_SET_").expect("config should load");
        assert!(cfg.is_production());
        assert_eq!(cfg.service_name, "billing");
        assert_eq!(cfg.database_url(), Some("postgres://example"));
    }

    #[test]
    fn production_requires_database_url() {
        std::env::set_var("CORE_TEST_PROD_ENV", "production");
        let err = CoreConfig::from_env_with_prefix("CORE_TEST_PROD_").unwrap_err();
        match err {
            ConfigError::MissingEnvVar(key) => assert_eq!(key, "CORE_TEST_PROD_DATABASE_URL"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        std::env::set_var("CORE_TEST_BLANK_DATABASE_URL", "   ");
        let cfg = CoreConfig::from_env_with_prefix("CORE_TEST_BLANK_").expect("config should load");
        assert!(cfg.database_url().is_none());
    }
}
