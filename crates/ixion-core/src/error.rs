//! Failure taxonomy for the retrieval pipeline.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Result alias used across the retrieval pipeline. Expected remote failures
/// travel as [`FetchError`] values; panics are reserved for defects.
pub type FetchResult<T> = Result<T, FetchError>;

const SNIPPET_MAX: usize = 200;

/// Classification of a retrieval failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    UpstreamStatus,
    Malformed,
    Exhausted,
    Cancelled,
    Internal,
}

/// Structured retrieval error used by the retry executor for scheduling
/// decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    /// Connectivity-level failure: timeout, reset, DNS, unreachable source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    /// Remote call completed with a non-success status.
    pub fn upstream_status(status: u16, body: &str) -> Self {
        Self {
            kind: FetchErrorKind::UpstreamStatus,
            message: format!("upstream returned status {status}: {}", snippet(body)),
            retryable: true,
        }
    }

    /// Remote call completed but the payload does not match the expected
    /// shape. Retryable: a garbled body under load may self-correct.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Malformed,
            message: message.into(),
            retryable: true,
        }
    }

    /// Terminal outcome after the retry budget is spent.
    pub fn exhausted(attempts: u32, last: &FetchError) -> Self {
        Self {
            kind: FetchErrorKind::Exhausted,
            message: format!(
                "retry budget exhausted after {attempts} attempts; last error: {}",
                last.message
            ),
            retryable: false,
        }
    }

    /// The caller withdrew the call before it completed.
    pub fn cancelled() -> Self {
        Self {
            kind: FetchErrorKind::Cancelled,
            message: String::from("call cancelled before completion"),
            retryable: false,
        }
    }

    /// Defect-class failure that retrying cannot fix.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::UpstreamStatus => "fetch.upstream_status",
            FetchErrorKind::Malformed => "fetch.malformed",
            FetchErrorKind::Exhausted => "fetch.exhausted",
            FetchErrorKind::Cancelled => "fetch.cancelled",
            FetchErrorKind::Internal => "fetch.internal",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Clip remote payload text for inclusion in diagnostics.
pub(crate) fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= SNIPPET_MAX {
        return trimmed.to_string();
    }
    // Avoid splitting a UTF-8 sequence.
    let mut end = SNIPPET_MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

/// Validation errors raised when constructing domain values and clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("index symbol cannot be empty")]
    EmptySymbol,
    #[error("index symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("index symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("index symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("exposure base URL cannot be empty")]
    EmptyBaseUrl,
    #[error("exposure base URL is not configured; set {var} or provide one explicitly")]
    MissingBaseUrl { var: &'static str },
}
