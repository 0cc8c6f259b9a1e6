use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name given to structured errors whose kind does not override it.
pub const DEFAULT_ERROR_NAME: &str = "CustomError";

/// Discriminant carried by a structured error.
///
/// The baseline set is [`CommonErrorKind`]. Modules with their own failure
/// vocabulary can use plain strings or implement this trait on their own enum.
pub trait ErrorKind: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Wire tag, serialized as `errorType`.
    fn as_str(&self) -> &str;

    /// Display name stamped on errors of this kind.
    fn error_name(&self) -> &str {
        DEFAULT_ERROR_NAME
    }

    /// Whether the failure was caused by the caller rather than the service.
    fn is_client_error(&self) -> bool {
        false
    }
}

/// Error kinds shared by every module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommonErrorKind {
    UnknownError,
    DatabaseError,
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl CommonErrorKind {
    pub const ALL: [CommonErrorKind; 7] = [
        CommonErrorKind::UnknownError,
        CommonErrorKind::DatabaseError,
        CommonErrorKind::ValidationError,
        CommonErrorKind::Unauthorized,
        CommonErrorKind::Forbidden,
        CommonErrorKind::NotFound,
        CommonErrorKind::InternalServerError,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CommonErrorKind::UnknownError => "UNKNOWN_ERROR",
            CommonErrorKind::DatabaseError => "DATABASE_ERROR",
            CommonErrorKind::ValidationError => "VALIDATION_ERROR",
            CommonErrorKind::Unauthorized => "UNAUTHORIZED",
            CommonErrorKind::Forbidden => "FORBIDDEN",
            CommonErrorKind::NotFound => "NOT_FOUND",
            CommonErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorKind for CommonErrorKind {
    fn as_str(&self) -> &str {
        CommonErrorKind::as_str(self)
    }

    fn is_client_error(&self) -> bool {
        matches!(
            self,
            CommonErrorKind::ValidationError
                | CommonErrorKind::Unauthorized
                | CommonErrorKind::Forbidden
                | CommonErrorKind::NotFound
        )
    }
}

impl Default for CommonErrorKind {
    fn default() -> Self {
        CommonErrorKind::UnknownError
    }
}

impl fmt::Display for CommonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tag does not name a [`CommonErrorKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for CommonErrorKind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CommonErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseKindError(value.to_string()))
    }
}

impl ErrorKind for String {
    fn as_str(&self) -> &str {
        self
    }
}

impl ErrorKind for &'static str {
    fn as_str(&self) -> &str {
        self
    }
}
