use tracing::{error, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::errors::{
    CommonErrorKind, CustomError, ErrorKind, NativeError, NormalizeOptions, Result,
};

/// Initializes the default tracing subscriber used across services.
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    let default_level = level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(atty::is(atty::Stream::Stdout))
        .try_init()
        .map_err(|err| {
            CustomError::from_error(
                NativeError::capture(&*err),
                CommonErrorKind::InternalServerError,
                NormalizeOptions::default().with_module("logging"),
            )
        })?;

    Ok(())
}

/// Emits one structured event describing `err` and its causes.
///
/// Client-side kinds are logged at `warn`, everything else at `error`.
pub fn report_error<K: ErrorKind>(err: &CustomError<K>) {
    let detail = err.detailed_message();
    if err.kind().is_client_error() {
        warn!(
            error_type = err.error_type(),
            module = err.module(),
            trace = err.trace(),
            detail = %detail,
            "{}",
            err.message()
        );
    } else {
        error!(
            error_type = err.error_type(),
            module = err.module(),
            trace = err.trace(),
            stack = err.stack(),
            detail = %detail,
            "{}",
            err.message()
        );
    }
}
