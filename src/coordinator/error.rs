//! Coordinator failures

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What went wrong on the coordinator side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorErrorKind {
    /// Credentials missing, wrong, or not allowed to act on the wallet
    Authentication,
    /// Unknown wallet or resource
    NotFound,
    /// The request was understood but rejected
    Validation,
    /// Too many requests
    RateLimited,
    /// A fee-checked transaction pays too little
    InsufficientFee,
    /// The request never got a usable answer
    Transport,
}

impl fmt::Display for CoordinatorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CoordinatorErrorKind::Authentication => "authentication failed",
            CoordinatorErrorKind::NotFound => "not found",
            CoordinatorErrorKind::Validation => "validation failed",
            CoordinatorErrorKind::RateLimited => "rate limited",
            CoordinatorErrorKind::InsufficientFee => "insufficient fee",
            CoordinatorErrorKind::Transport => "transport failure",
        };
        f.write_str(text)
    }
}

/// A rejection or failure reported for a coordinator request
///
/// The message is whatever the coordinator said and is passed to callers
/// untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct CoordinatorError {
    pub kind: CoordinatorErrorKind,
    pub message: String,
}

impl CoordinatorError {
    pub fn new(kind: CoordinatorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::Authentication, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::Validation, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::RateLimited, message)
    }

    pub fn insufficient_fee(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::InsufficientFee, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorKind::Transport, message)
    }

    /// Classify an HTTP status returned by a coordinator endpoint
    ///
    /// For transport implementations; 5xx and unknown statuses count as
    /// transport failures.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => CoordinatorErrorKind::Authentication,
            404 => CoordinatorErrorKind::NotFound,
            400 | 409 | 422 => CoordinatorErrorKind::Validation,
            429 => CoordinatorErrorKind::RateLimited,
            _ => CoordinatorErrorKind::Transport,
        };
        Self::new(kind, message)
    }

    pub fn is_fee_rejection(&self) -> bool {
        self.kind == CoordinatorErrorKind::InsufficientFee
    }
}
