use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

/// Upper bound on the number of links visited when walking a cause chain.
pub const MAX_CHAIN_DEPTH: usize = 64;

/// Display name of native links that carry no more specific identity.
pub const NATIVE_ERROR_NAME: &str = "Error";

/// Capabilities shared by every link of a cause chain.
pub trait ChainedError: StdError + Send + Sync + 'static {
    fn name(&self) -> &str;

    fn message(&self) -> &str;

    fn stack(&self) -> Option<&str>;

    /// Predecessor recorded when this link was built.
    fn caused_by(&self) -> Option<&Cause>;

    fn tag(&self) -> LinkTag<'_>;

    fn as_std_error(&self) -> &(dyn StdError + 'static);
}

/// Discriminates structured links from native ones without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTag<'a> {
    Native,
    Structured { error_type: &'a str },
}

impl<'a> LinkTag<'a> {
    pub fn is_structured(&self) -> bool {
        matches!(self, LinkTag::Structured { .. })
    }

    pub fn error_type(&self) -> Option<&'a str> {
        match self {
            LinkTag::Structured { error_type } => Some(*error_type),
            LinkTag::Native => None,
        }
    }
}

/// What triggered an error: another error, or whatever raw value was caught.
#[derive(Debug, Clone)]
pub enum Cause {
    Error(Arc<dyn ChainedError>),
    Value(Value),
}

impl Cause {
    pub fn as_error(&self) -> Option<&dyn ChainedError> {
        match self {
            Cause::Error(link) => Some(link.as_ref()),
            Cause::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cause::Value(value) => Some(value),
            Cause::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Cause::Error(_))
    }
}

impl From<NativeError> for Cause {
    fn from(error: NativeError) -> Self {
        Cause::Error(Arc::new(error))
    }
}

impl From<Value> for Cause {
    fn from(value: Value) -> Self {
        Cause::Value(value)
    }
}

/// Snapshot of a host-native error: its name, message, stack and source.
#[derive(Debug, Clone)]
pub struct NativeError {
    name: String,
    message: String,
    stack: Option<String>,
    cause: Option<Cause>,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: NATIVE_ERROR_NAME.to_string(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Snapshots `error` and its `source()` chain.
    ///
    /// Sources are only reachable as trait objects, so every link is named
    /// [`NATIVE_ERROR_NAME`].
    pub fn capture(error: &(dyn StdError + 'static)) -> Self {
        let mut links = Vec::new();
        let mut current = Some(error);
        while let Some(link) = current {
            if links.len() == MAX_CHAIN_DEPTH {
                warn!(depth = MAX_CHAIN_DEPTH, "source chain truncated while capturing");
                break;
            }
            links.push(link.to_string());
            current = link.source();
        }

        let mut snapshot: Option<NativeError> = None;
        while let Some(message) = links.pop() {
            let mut link = NativeError::new(message);
            if let Some(inner) = snapshot.take() {
                link = link.with_cause(inner);
            }
            snapshot = Some(link);
        }
        snapshot.unwrap_or_else(|| NativeError::new(error.to_string()))
    }

    /// Like [`NativeError::capture`], naming the outer link after `E`.
    pub fn from_std<E: StdError + 'static>(error: &E) -> Self {
        let name = short_type_name::<E>();
        NativeError::capture(error).with_name(name)
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for NativeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .and_then(Cause::as_error)
            .map(ChainedError::as_std_error)
    }
}

impl ChainedError for NativeError {
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
        LinkTag::Native
    }

    fn as_std_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

/// Walks a cause chain from the outermost link inwards.
///
/// Stops at the first absent or non-error cause, or after
/// [`MAX_CHAIN_DEPTH`] links.
#[derive(Clone)]
pub struct ErrorChain<'a> {
    next: Option<&'a dyn ChainedError>,
    visited: usize,
}

impl<'a> ErrorChain<'a> {
    pub fn new(head: &'a dyn ChainedError) -> Self {
        Self {
            next: Some(head),
            visited: 0,
        }
    }
}

impl<'a> Iterator for ErrorChain<'a> {
    type Item = &'a dyn ChainedError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.visited += 1;

        let successor = current.caused_by().and_then(Cause::as_error);
        if successor.is_some() && self.visited == MAX_CHAIN_DEPTH {
            warn!(depth = MAX_CHAIN_DEPTH, "cause chain truncated");
        } else {
            self.next = successor;
        }

        Some(current)
    }
}

impl fmt::Debug for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChain")
            .field("visited", &self.visited)
            .finish()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
