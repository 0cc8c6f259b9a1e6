//! Structured errors and the conversions that feed them.
//!
//! Failures are caught at a boundary, normalized into a [`CustomError`] with a
//! kind and whatever module/context metadata is known there, then
//! propagated. The original failure is kept as the cause, so
//! [`CustomError::detailed_message`] and [`CustomError::to_json`] can report
//! the whole chain.

mod chain;
mod custom;
mod kind;

use std::io;

use thiserror::Error;

pub use chain::{
    Cause, ChainedError, ErrorChain, LinkTag, NativeError, MAX_CHAIN_DEPTH, NATIVE_ERROR_NAME,
};
pub use custom::{
    CauseRecord, CustomError, ErrorOptions, ErrorRecord, NormalizeOptions, Thrown,
    UNKNOWN_ERROR_MESSAGE,
};
pub use kind::{CommonErrorKind, ErrorKind, ParseKindError, DEFAULT_ERROR_NAME};

/// Same type under the name used by the error taxonomy.
pub type StructuredError<K = CommonErrorKind> = CustomError<K>;

/// Result type used across the faultline crates.
pub type Result<T, K = CommonErrorKind> = std::result::Result<T, CustomError<K>>;

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {source}")]
    InvalidEnvVar {
        key: String,
        #[source]
        source: std::env::VarError,
    },

    #[error("internal configuration error: {0}")]
    Internal(String),
}

impl From<ConfigError> for CustomError {
    fn from(err: ConfigError) -> Self {
        CustomError::from_std_error(
            &err,
            CommonErrorKind::InternalServerError,
            NormalizeOptions::default().with_module("config"),
        )
    }
}

impl From<sqlx::Error> for CustomError {
    fn from(err: sqlx::Error) -> Self {
        CustomError::from_std_error(
            &err,
            CommonErrorKind::DatabaseError,
            NormalizeOptions::default().with_module("database"),
        )
    }
}

impl From<serde_json::Error> for CustomError {
    fn from(err: serde_json::Error) -> Self {
        CustomError::from_std_error(
            &err,
            CommonErrorKind::ValidationError,
            NormalizeOptions::default(),
        )
    }
}

impl From<io::Error> for CustomError {
    fn from(err: io::Error) -> Self {
        CustomError::from_std_error(
            &err,
            CommonErrorKind::InternalServerError,
            NormalizeOptions::default(),
        )
    }
}
