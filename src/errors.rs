// errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    MalformedPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {url} has an unexpected shape: {source}")]
    UnexpectedShape {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Short label for the status line.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "server unreachable",
            FetchError::Status { .. } => "server error",
            FetchError::MalformedPayload { .. } => "malformed response",
            FetchError::UnexpectedShape { .. } => "unexpected response",
            FetchError::InvalidUrl(_) => "invalid URL",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Size cannot be negative: {0}")]
    NegativeSize(f64),

    #[error("Size is not a finite number")]
    NonFiniteSize,
}

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse theme file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid colour '{0}', expected #rrggbb or #aarrggbb")]
    InvalidColor(String),
}
