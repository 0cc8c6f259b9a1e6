use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::chain::{Cause, ChainedError, ErrorChain, LinkTag, NativeError};
use super::kind::{CommonErrorKind, ErrorKind};

/// Message used when a caught value carries no usable text.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Optional fields accepted by [`CustomError::new`].
///
/// A bare string converts into options holding only a trace.
#[derive(Debug, Clone, Default)]
pub struct ErrorOptions {
    pub cause: Option<Cause>,
    pub stack: Option<String>,
    pub trace: Option<String>,
    pub module: Option<String>,
    pub context: Option<Map<String, Value>>,
}

impl ErrorOptions {
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl From<&str> for ErrorOptions {
    fn from(trace: &str) -> Self {
        ErrorOptions::default().with_trace(trace)
    }
}

impl From<String> for ErrorOptions {
    fn from(trace: String) -> Self {
        ErrorOptions::default().with_trace(trace)
    }
}

/// Options accepted by [`CustomError::from_error`]. The cause is always the
/// normalized value itself, so it cannot be set here.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub stack: Option<String>,
    pub trace: Option<String>,
    pub module: Option<String>,
    pub context: Option<Map<String, Value>>,
}

impl NormalizeOptions {
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    fn with_cause(self, cause: Cause) -> ErrorOptions {
        ErrorOptions {
            cause: Some(cause),
            stack: self.stack,
            trace: self.trace,
            module: self.module,
            context: self.context,
        }
    }
}

impl From<&str> for NormalizeOptions {
    fn from(trace: &str) -> Self {
        NormalizeOptions::default().with_trace(trace)
    }
}

impl From<String> for NormalizeOptions {
    fn from(trace: String) -> Self {
        NormalizeOptions::default().with_trace(trace)
    }
}

/// Anything a boundary may catch before normalizing it.
#[derive(Debug, Clone)]
pub enum Thrown<K: ErrorKind = CommonErrorKind> {
    Structured(CustomError<K>),
    Native(NativeError),
    Value(Value),
}

impl<K: ErrorKind> From<CustomError<K>> for Thrown<K> {
    fn from(error: CustomError<K>) -> Self {
        Thrown::Structured(error)
    }
}

impl<K: ErrorKind> From<NativeError> for Thrown<K> {
    fn from(error: NativeError) -> Self {
        Thrown::Native(error)
    }
}

impl<K: ErrorKind> From<Value> for Thrown<K> {
    fn from(value: Value) -> Self {
        Thrown::Value(value)
    }
}

impl<K: ErrorKind> From<&str> for Thrown<K> {
    fn from(value: &str) -> Self {
        Thrown::Value(Value::String(value.to_string()))
    }
}

impl<K: ErrorKind> From<String> for Thrown<K> {
    fn from(value: String) -> Self {
        Thrown::Value(Value::String(value))
    }
}

/// Error value with a kind, optional metadata and a chain of causes.
#[derive(Debug, Clone)]
pub struct CustomError<K: ErrorKind = CommonErrorKind> {
    name: String,
    kind: K,
    message: String,
    module: Option<String>,
    context: Option<Map<String, Value>>,
    trace: Option<String>,
    stack: Option<String>,
    cause: Option<Cause>,
}

impl<K: ErrorKind> CustomError<K> {
    /// Builds an error. Without an explicit (non-empty) stack, the caller's
    /// location is recorded instead.
    #[track_caller]
    pub fn new(kind: K, message: impl Into<String>, options: impl Into<ErrorOptions>) -> Self {
        let options = options.into();
        let message = message.into();
        let name = kind.error_name().to_string();

        let stack = match options.stack.filter(|stack| !stack.is_empty()) {
            Some(stack) => stack,
            None => capture_stack(&name, &message),
        };

        Self {
            name,
            kind,
            message,
            module: options.module,
            context: options.context,
            trace: options.trace,
            stack: Some(stack),
            cause: options.cause,
        }
    }

    /// Normalizes a caught value.
    ///
    /// A structured error is returned untouched, keeping its own kind. Native
    /// errors lend their message and stack. Any other value becomes the cause
    /// of a new error whose message is the value when it is a string.
    #[track_caller]
    pub fn from_error(
        error: impl Into<Thrown<K>>,
        kind: K,
        options: impl Into<NormalizeOptions>,
    ) -> Self {
        let options = options.into();
        match error.into() {
            Thrown::Structured(error) => error,
            Thrown::Native(native) => {
                let message = native.message().to_string();
                let stack = native.stack().map(str::to_string).or(options.stack.clone());
                let mut options = options.with_cause(Cause::from(native));
                options.stack = stack;
                CustomError::new(kind, message, options)
            }
            Thrown::Value(value) => {
                let message = match &value {
                    Value::String(text) => text.clone(),
                    _ => UNKNOWN_ERROR_MESSAGE.to_string(),
                };
                CustomError::new(kind, message, options.with_cause(Cause::Value(value)))
            }
        }
    }

    /// Normalizes any std error, snapshotting its source chain.
    #[track_caller]
    pub fn from_std_error<E: StdError + 'static>(
        error: &E,
        kind: K,
        options: impl Into<NormalizeOptions>,
    ) -> Self {
        CustomError::from_error(NativeError::from_std(error), kind, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Wire tag of the kind.
    pub fn error_type(&self) -> &str {
        self.kind.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn context(&self) -> Option<&Map<String, Value>> {
        self.context.as_ref()
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Iterates this error followed by every error-like cause.
    pub fn chain(&self) -> ErrorChain<'_> {
        ErrorChain::new(self)
    }

    pub fn error_chain(&self) -> Vec<&dyn ChainedError> {
        self.chain().collect()
    }

    /// One line per link, causes indented two spaces per level.
    pub fn detailed_message(&self) -> String {
        self.chain()
            .enumerate()
            .map(|(depth, link)| {
                if depth == 0 {
                    format!("{}: {}", link.name(), link.message())
                } else {
                    format!(
                        "{}Caused by: {}: {}",
                        "  ".repeat(depth),
                        link.name(),
                        link.message()
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_record(&self) -> ErrorRecord<'_> {
        let cause = self.cause.as_ref().map(|cause| match cause {
            Cause::Error(link) => CauseRecord::Error {
                name: link.name(),
                message: link.message(),
                stack: link.stack(),
            },
            Cause::Value(value) => CauseRecord::Value(value),
        });

        ErrorRecord {
            name: &self.name,
            message: &self.message,
            error_type: self.kind.as_str(),
            module: self.module.as_deref(),
            context: self.context.as_ref(),
            trace: self.trace.as_deref(),
            stack: self.stack.as_deref(),
            cause,
        }
    }

    /// JSON form used by log shippers and response formatters.
    pub fn to_json(&self) -> Value {
        let cause = match &self.cause {
            Some(Cause::Error(link)) => json!({
                "name": link.name(),
                "message": link.message(),
                "stack": link.stack(),
            }),
            Some(Cause::Value(value)) => value.clone(),
            None => Value::Null,
        };

        json!({
            "name": self.name,
            "message": self.message,
            "errorType": self.kind.as_str(),
            "module": self.module,
            "context": self.context,
            "trace": self.trace,
            "stack": self.stack,
            "cause": cause,
        })
    }

    /// Whether any structured link of the chain carries `kind`.
    pub fn has_error_type(&self, kind: &K) -> bool {
        let wanted = kind.as_str();
        self.chain()
            .filter_map(|link| link.tag().error_type())
            .any(|error_type| error_type == wanted)
    }

    /// Checks this error's own module; causes are not consulted.
    pub fn is_from_module(&self, name: &str) -> bool {
        self.module.as_deref() == Some(name)
    }
}

impl<K: ErrorKind> fmt::Display for CustomError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<K: ErrorKind> StdError for CustomError<K> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .and_then(Cause::as_error)
            .map(ChainedError::as_std_error)
    }
}

impl<K: ErrorKind> ChainedError for CustomError<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    fn caused_by(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    fn tag(&self) -> LinkTag<'_> {
        LinkTag::Structured { error_type: self.kind.as_str() }
    }

    fn as_std_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl<K: ErrorKind> From<CustomError<K>> for Cause {
    fn from(error: CustomError<K>) -> Self {
        Cause::Error(Arc::new(error))
    }
}

impl<K: ErrorKind> Serialize for CustomError<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Borrowed serialization shape of a [`CustomError`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord<'a> {
    pub name: &'a str,
    pub message: &'a str,
    pub error_type: &'a str,
    pub module: Option<&'a str>,
    pub context: Option<&'a Map<String, Value>>,
    pub trace: Option<&'a str>,
    pub stack: Option<&'a str>,
    pub cause: Option<CauseRecord<'a>>,
}

/// Error causes are reduced to one level; raw values pass through.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CauseRecord<'a> {
    Error {
        name: &'a str,
        message: &'a str,
        stack: Option<&'a str>,
    },
    Value(&'a Value),
}

#[track_caller]
fn capture_stack(name: &str, message: &str) -> String {
    let location = Location::caller();
    format!("{name}: {message}\n    at {location}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(message: &str) -> CustomError {
        CustomError::new(CommonErrorKind::NotFound, message, ErrorOptions::default())
    }

    #[test]
    fn name_comes_from_kind() {
        let error = not_found("missing");
        assert_eq!(error.name(), "CustomError");
        assert_eq!(error.error_type(), "NOT_FOUND");
        assert_eq!(error.to_string(), "missing");
    }

    #[test]
    fn string_options_become_trace() {
        let error = CustomError::new(CommonErrorKind::ValidationError, "bad input", "req-42");
        assert_eq!(error.trace(), Some("req-42"));
        assert!(error.module().is_none());
        assert!(error.cause().is_none());
    }

    #[test]
    fn stack_points_at_caller() {
        let error = not_found("missing");
        let stack = error.stack().expect("stack captured");
        assert!(stack.starts_with("CustomError: missing\n    at "));
        assert!(stack.contains("custom.rs"));
    }

    #[test]
    fn explicit_stack_wins_unless_empty() {
        let explicit = CustomError::new(
            CommonErrorKind::UnknownError,
            "boom",
            ErrorOptions::default().with_stack("at somewhere"),
        );
        assert_eq!(explicit.stack(), Some("at somewhere"));

        let empty = CustomError::new(
            CommonErrorKind::UnknownError,
            "boom",
            ErrorOptions::default().with_stack(""),
        );
        assert_ne!(empty.stack(), Some(""));
    }

    #[test]
    fn context_entries_accumulate() {
        let error = CustomError::new(
            CommonErrorKind::ValidationError,
            "bad input",
            ErrorOptions::default()
                .with_context_entry("field", "email")
                .with_context_entry("length", 0),
        );
        let context = error.context().expect("context");
        assert_eq!(context["field"], "email");
        assert_eq!(context["length"], 0);
    }

    #[test]
    fn native_stack_is_reused() {
        let native =
            NativeError::new("socket closed").with_stack("Error: socket closed\n    at io");
        let error = CustomError::from_error(
            native,
            CommonErrorKind::InternalServerError,
            NormalizeOptions::default().with_stack("ignored"),
        );
        assert_eq!(error.stack(), Some("Error: socket closed\n    at io"));
        assert_eq!(error.message(), "socket closed");
    }

    #[test]
    fn option_stack_used_when_native_has_none() {
        let error = CustomError::from_error(
            NativeError::new("socket closed"),
            CommonErrorKind::InternalServerError,
            NormalizeOptions::default().with_stack("custom"),
        );
        assert_eq!(error.stack(), Some("custom"));
    }

    #[test]
    fn string_values_keep_their_text() {
        let error =
            CustomError::from_error("quota exceeded", CommonErrorKind::Forbidden, "trace-1");
        assert_eq!(error.message(), "quota exceeded");
        assert_eq!(
            error.cause().and_then(Cause::as_value),
            Some(&Value::from("quota exceeded"))
        );
        assert_eq!(error.trace(), Some("trace-1"));
        assert_eq!(error.error_chain().len(), 1);
    }

    #[test]
    fn std_errors_are_snapshotted() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = CustomError::from_std_error(
            &io,
            CommonErrorKind::Forbidden,
            NormalizeOptions::default().with_module("files"),
        );
        assert_eq!(error.message(), "denied");
        assert!(error.is_from_module("files"));
        assert_eq!(error.source().map(|source| source.to_string()), Some("denied".into()));
    }

    #[test]
    fn serialize_matches_to_json() {
        let error = CustomError::new(
            CommonErrorKind::InternalServerError,
            "outer",
            ErrorOptions::default()
                .with_cause(NativeError::new("inner"))
                .with_module("billing"),
        );
        let serialized = serde_json::to_value(&error).expect("serialize");
        assert_eq!(serialized, error.to_json());
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let json = not_found("missing").to_json();
        let object = json.as_object().expect("object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["cause", "context", "errorType", "message", "module", "name", "stack", "trace"]
        );
        assert!(json["module"].is_null());
        assert!(json["cause"].is_null());
    }

    #[derive(Debug, Clone, PartialEq)]
    enum AuthKind {
        TokenExpired,
    }

    impl ErrorKind for AuthKind {
        fn as_str(&self) -> &str {
            match self {
                AuthKind::TokenExpired => "TOKEN_EXPIRED",
            }
        }

        fn error_name(&self) -> &str {
            "AuthError"
        }
    }

    #[test]
    fn domain_kinds_name_their_errors() {
        let inner = not_found("session row");
        let error = CustomError::new(
            AuthKind::TokenExpired,
            "token expired",
            ErrorOptions::default().with_cause(inner),
        );
        assert_eq!(
            error.detailed_message(),
            "AuthError: token expired\n  Caused by: CustomError: session row"
        );
        assert!(error.has_error_type(&AuthKind::TokenExpired));
        let tags: Vec<_> = error.chain().filter_map(|link| link.tag().error_type()).collect();
        assert_eq!(tags, ["TOKEN_EXPIRED", "NOT_FOUND"]);
    }

    #[test]
    fn errors_cross_threads() {
        let error = not_found("missing");
        let handle = std::thread::spawn(move || error.detailed_message());
        assert_eq!(handle.join().expect("thread"), "CustomError: missing");
    }
}
