use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use crate::cli::{DispatchError, RegistryError};

/// Unified error type for the crate.
///
/// Dispatch failures never escape the dispatcher (they are rendered into the
/// returned [`crate::RunResult`]); this type covers registration-time
/// violations, handler bodies, and the binary entry point.
#[derive(Debug)]
pub enum Error {
    Registry(RegistryError),
    Dispatch(DispatchError),
    Internal {
        message: String,
        backtrace: Option<Backtrace>,
    },
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Return the captured backtrace, if any.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Error::Internal { backtrace, .. } => backtrace.as_ref(),
            _ => None,
        }
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    if cfg!(debug_assertions) {
        Some(Backtrace::force_capture())
    } else {
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Registry(err) => write!(f, "registration error: {err}"),
            Error::Dispatch(err) => write!(f, "{err}"),
            Error::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Registry(err) => Some(err),
            Error::Dispatch(err) => Some(err),
            Error::Internal { .. } => None,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(error: RegistryError) -> Self {
        Error::Registry(error)
    }
}

impl From<DispatchError> for Error {
    fn from(error: DispatchError) -> Self {
        Error::Dispatch(error)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::internal(message)
    }
}
