//! Typed failure taxonomy for the session core.
//!
//! Every failure crossing the session boundary is one of these kinds; no
//! unstructured errors leak past [`crate::core::session::ChatSession`].

use std::error::Error as StdError;
use std::fmt;

use crate::core::session::SessionState;

/// Discriminant carried on the event surface alongside a display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid credentials; retry `initialize` after fixing them.
    Configuration,
    /// Transient remote-config failure; retryable.
    ConfigFetch,
    /// Empty or whitespace-only input; a caller bug, not retried.
    InvalidRequest,
    /// Operation attempted in the wrong state; wait or check state first.
    NotReady,
    /// Backend failure while generating; recorded as an error turn, the
    /// session stays usable.
    Generation,
    /// The session was closed; terminal.
    SessionClosed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::ConfigFetch => "config-fetch",
            ErrorKind::InvalidRequest => "invalid-request",
            ErrorKind::NotReady => "not-ready",
            ErrorKind::Generation => "generation",
            ErrorKind::SessionClosed => "session-closed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to fetch the remote parameter document.
#[derive(Debug)]
pub struct ConfigFetchError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ConfigFetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for ConfigFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ConfigFetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

/// Failure reported by a response generator.
#[derive(Debug)]
pub struct GenerationError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for GenerationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

/// Errors returned by session operations.
#[derive(Debug)]
pub enum SessionError {
    /// The resolved API key was empty or otherwise unusable.
    Configuration(String),
    /// The parameter fetch itself failed.
    ConfigFetch(ConfigFetchError),
    /// The submitted text was empty after trimming.
    InvalidRequest,
    /// The operation requires `Ready`; carries the state that rejected it.
    NotReady(SessionState),
    /// The backend failed to produce a reply.
    Generation(GenerationError),
    /// The session has been closed.
    SessionClosed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Configuration(_) => ErrorKind::Configuration,
            SessionError::ConfigFetch(_) => ErrorKind::ConfigFetch,
            SessionError::InvalidRequest => ErrorKind::InvalidRequest,
            SessionError::NotReady(_) => ErrorKind::NotReady,
            SessionError::Generation(_) => ErrorKind::Generation,
            SessionError::SessionClosed => ErrorKind::SessionClosed,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Configuration(message) => {
                write!(f, "configuration error: {message}")
            }
            SessionError::ConfigFetch(err) => {
                write!(f, "failed to fetch session config: {err}")
            }
            SessionError::InvalidRequest => {
                f.write_str("message text is empty")
            }
            SessionError::NotReady(state) => {
                write!(f, "session is not ready (state: {state})")
            }
            SessionError::Generation(err) => {
                write!(f, "failed to generate a response: {err}")
            }
            SessionError::SessionClosed => f.write_str("session is closed"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::ConfigFetch(err) => Some(err),
            SessionError::Generation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigFetchError> for SessionError {
    fn from(err: ConfigFetchError) -> Self {
        SessionError::ConfigFetch(err)
    }
}

impl From<GenerationError> for SessionError {
    fn from(err: GenerationError) -> Self {
        SessionError::Generation(err)
    }
}
