use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Shown when the provider answered but the payload was not a usable itinerary.
pub const FORMAT_FAILURE_MESSAGE: &str =
    "AI format error: the response was not a valid itinerary.";

/// Shown when the provider could not be reached or refused the request.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't plan the trip right now. Please try again later!";

/// Shown when the caller passes a blank destination or zero days.
pub const INVALID_REQUEST_MESSAGE: &str =
    "Please enter a valid destination and a positive number of days.";

/// Main error type for itinerary generation
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("Response contained no text payload")]
    MissingPayload,

    #[error("Malformed itinerary: {0}")]
    Format(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Which side of the exchange a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Response received but unusable.
    Format,
    /// Network call failed or the provider returned an error.
    Transport,
    /// Rejected before dispatch.
    InvalidRequest,
}

impl FailureKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Format => FORMAT_FAILURE_MESSAGE,
            FailureKind::Transport => TRANSPORT_FAILURE_MESSAGE,
            FailureKind::InvalidRequest => INVALID_REQUEST_MESSAGE,
        }
    }
}

impl PlannerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PlannerError::MissingPayload
            | PlannerError::Format(_)
            | PlannerError::Serialization(_)
            | PlannerError::Blocked(_) => FailureKind::Format,
            PlannerError::Http(_)
            | PlannerError::Timeout(_)
            | PlannerError::Provider { .. }
            | PlannerError::Config(_) => FailureKind::Transport,
            PlannerError::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// Check if a later attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PlannerError::Http(_) | PlannerError::Timeout(_) => true,
            PlannerError::Provider { status, .. } => *status == 429 || *status >= 500,
            PlannerError::MissingPayload
            | PlannerError::Format(_)
            | PlannerError::Serialization(_) => true,
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::InvalidRequest(_) => "INVALID_REQUEST",
            PlannerError::Http(_) => "HTTP_ERROR",
            PlannerError::Timeout(_) => "TIMEOUT_ERROR",
            PlannerError::Provider { .. } => "PROVIDER_ERROR",
            PlannerError::Blocked(_) => "PROMPT_BLOCKED",
            PlannerError::MissingPayload => "MISSING_PAYLOAD",
            PlannerError::Format(_) => "FORMAT_ERROR",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Http(err.to_string())
    }
}

/// Caller-facing failure: fixed text plus the category it came from.
///
/// The text never carries provider or transport detail; that goes to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    kind: FailureKind,
    text: String,
}

impl ErrorMessage {
    pub fn new(kind: FailureKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_format_failure(&self) -> bool {
        self.kind == FailureKind::Format
    }

    pub fn is_transport_failure(&self) -> bool {
        self.kind == FailureKind::Transport
    }
}

impl From<&PlannerError> for ErrorMessage {
    fn from(err: &PlannerError) -> Self {
        let kind = err.kind();
        Self::new(kind, kind.user_message())
    }
}

impl From<PlannerError> for ErrorMessage {
    fn from(err: PlannerError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::error::Error for ErrorMessage {}
