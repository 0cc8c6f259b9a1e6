//! Core shared library for the faultline services.
//!
//! The centre of the crate is [`errors::CustomError`], a structured error
//! value that records a kind, optional module/context/trace metadata and the
//! chain of causes that led to it. Around it sit the shared configuration
//! loader, the tracing setup and the Postgres pool provider.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;

pub use errors::{
    Cause, ChainedError, CommonErrorKind, CustomError, ErrorKind, ErrorOptions, NativeError,
    NormalizeOptions, Result as CoreResult, StructuredError, Thrown,
};
