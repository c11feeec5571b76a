use thiserror::Error;

use crate::http_client::HttpError;

/// Parameter validation failures. Raised before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid monthname '{value}' for {endpoint}, expected a lowercase full month name")]
    InvalidMonthName { endpoint: String, value: String },

    #[error("invalid year for {endpoint}: {year} (must be >= {floor} and <= {current})")]
    YearOutOfRange {
        endpoint: String,
        year: i64,
        floor: i64,
        current: i64,
    },

    #[error("invalid month for {endpoint}: {value} (must be >= 1 and <= 12)")]
    MonthOutOfRange { endpoint: String, value: i64 },

    #[error("invalid day for {endpoint}: {value} (must be >= 1 and <= 31)")]
    DayOutOfRange { endpoint: String, value: i64 },

    #[error("{field} '{value}' could not be parsed into a date for {endpoint}, use YYYY-MM-DD")]
    InvalidDate {
        endpoint: String,
        field: String,
        value: String,
    },

    #[error("{field} '{value}' is not a valid number for {endpoint}")]
    NotANumber {
        endpoint: String,
        field: String,
        value: String,
    },

    #[error("{field} '{value}' is not a comma separated list of ids for {endpoint}")]
    InvalidIdList {
        endpoint: String,
        field: String,
        value: String,
    },

    #[error("{endpoint} requires at least one of: {}", .expected.join(", "))]
    MissingParameters {
        endpoint: String,
        expected: Vec<String>,
    },
}

impl ValidationError {
    /// Name of the offending parameter, when the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidMonthName { .. } => Some("monthname"),
            Self::YearOutOfRange { .. } => Some("year"),
            Self::MonthOutOfRange { .. } => Some("month"),
            Self::DayOutOfRange { .. } => Some("day"),
            Self::InvalidDate { field, .. }
            | Self::NotANumber { field, .. }
            | Self::InvalidIdList { field, .. } => Some(field.as_str()),
            Self::MissingParameters { .. } => None,
        }
    }
}

/// Credential problems on privileged calls.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{endpoint} requires an API key")]
    MissingApiKey { endpoint: String },

    #[error("{endpoint} requires an authorized user; call authorize() first")]
    NoAuthorizedUser { endpoint: String },

    #[error("no private salt configured; cannot negotiate an auth key for uid {user_id}")]
    MissingPrivateSalt { user_id: u64 },

    #[error("auth key negotiation failed for uid {user_id}")]
    Negotiation {
        user_id: u64,
        #[source]
        source: Box<PhishnetError>,
    },

    #[error("authority response is missing {field}")]
    MalformedAuthority { field: &'static str },
}

/// Configuration loading and logging setup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {name} is not set")]
    MissingVar { name: &'static str },

    #[error("environment variable {name} has an invalid value: '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Top-level error type for every client operation.
#[derive(Debug, Error)]
pub enum PhishnetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transport error calling {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: HttpError,
    },

    #[error("phish.net API error on {endpoint}: code {code}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Api {
        endpoint: String,
        code: i64,
        message: Option<String>,
    },

    #[error("exceeded maximum retry count calling {endpoint} after {attempts} attempts")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        #[source]
        source: HttpError,
    },

    #[error("unsupported HTTP method '{method}', only GET and POST are supported")]
    UnsupportedMethod { method: String },

    #[error("failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PhishnetError {
    /// True only for transport failures the retry loop is allowed to repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.retryable())
    }
}

pub type Result<T> = std::result::Result<T, PhishnetError>;
