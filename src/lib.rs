//! Faultline: structured, chainable errors for HTTP services.
//!
//! The workspace is split into two crates:
//!
//! * `faultline-core`: the [`CustomError`] value type, its cause chain,
//!   configuration, logging and the Postgres pool provider
//! * `faultline-server`: the composition root that wires those providers
//!   into an axum router and renders errors as JSON responses

pub use faultline_core::errors::{
    Cause, ChainedError, CommonErrorKind, CustomError, ErrorKind, ErrorOptions, LinkTag,
    NativeError, NormalizeOptions, StructuredError, Thrown, UNKNOWN_ERROR_MESSAGE,
};
pub use faultline_core::{config, db, errors, logging};
pub use faultline_server::{start_server, ServerHandle};
