use std::env;
use std::str::FromStr;
use std::time::Duration;

use faultline_core::config::CoreConfig;
use faultline_core::errors::ConfigError;

/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub core: CoreConfig,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            core: CoreConfig::default(),
            cors_allowed_origins: vec!["*".to_string()],
            request_timeout: Duration::from_millis(15_000),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let core = CoreConfig::from_env()?;

        let bind_address = env::var("FAULTLINE_BIND")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let cors_allowed_origins = env::var("FAULTLINE_ALLOWED_ORIGINS")
            .ok()
            .map(|value| split_list(&value))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let request_timeout_ms = parse_env::<u64>("FAULTLINE_REQUEST_TIMEOUT_MS", 15_000)?;

        Ok(Self {
            bind_address,
            core,
            cors_allowed_origins,
            request_timeout: Duration::from_millis(request_timeout_ms.max(100)),
        })
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn core(&self) -> &CoreConfig {
        &self.core
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|segment| {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(default)
            } else {
                T::from_str(trimmed)
                    .map_err(|err| ConfigError::Internal(format!("invalid value for {key}: {err}")))
            }
        }
        Err(env::VarError::NotPresent) => Ok(default),
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
    fn splits_origin_lists() {
        assert_eq!(
            split_list(" https://a.example , ,https://b.example"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn parse_env_falls_back_to_default() {
        let value = parse_env::<u64>("SERVER_TEST_UNSET_TIMEOUT", 42).expect("default");
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        std::env::set_var("SERVER_TEST_GARBAGE_TIMEOUT", "soon");
        let err = parse_env::<u64>("SERVER_TEST_GARBAGE_TIMEOUT", 42).unwrap_err();
        assert!(err.to_string().contains("SERVER_TEST_GARBAGE_TIMEOUT"));
    }

    #[test]
    fn default_config_accepts_any_origin() {
        let config = ServerConfig::default();
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
