//! Error types for patients-grid
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

/// Main error type for the crate
#[derive(Debug, Snafu)]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// Configuration could not be resolved
    #[snafu(display("Config error: {message}"))]
    Config { message: String },

    /// IO error (config file access)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// Request never produced a response (DNS, TLS, timeout, body decode)
    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    /// Endpoint answered with a non-2xx status
    #[snafu(display("Server returned {status} for {url}"))]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// A page was requested whose cursor has not been reached yet
    #[snafu(display("Page {page} is out of sequence ({known} pages reachable)"))]
    OutOfSequencePage { page: usize, known: usize },
}

impl Error {
    /// Whether this error came from talking to the list endpoint
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Status { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Http { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
