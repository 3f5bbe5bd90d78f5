/*!
 * Error types for the doclingo pipeline.
 *
 * Each collaborator gets its own error enum so the orchestrator can apply a
 * different policy to each: store errors are logged and swallowed, provider
 * errors fail a single segment, input errors fail a whole document.
 */

use thiserror::Error;

/// Errors surfaced by a language-model completion provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a transport-level reqwest failure
    pub fn from_transport(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(format!("{}: {}", provider, error))
        } else if error.is_decode() {
            Self::ParseError(format!("{}: {}", provider, error))
        } else if error.is_connect() {
            Self::ConnectionError(format!("{}: {}", provider, error))
        } else {
            Self::RequestFailed(format!("{}: {}", provider, error))
        }
    }

    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by a blob store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached at all
    #[error("Blob store unreachable: {0}")]
    Unreachable(String),

    /// The backend refused the operation
    #[error("Permission denied for '{key}': {message}")]
    PermissionDenied {
        /// Key of the rejected operation
        key: String,
        /// Message returned by the backend
        message: String,
    },

    /// The key cannot be mapped onto this backend
    #[error("Invalid blob key '{0}'")]
    InvalidKey(String),

    /// The stored value could not be decoded
    #[error("Corrupt blob at '{key}': {message}")]
    Corrupt {
        /// Key of the unreadable entry
        key: String,
        /// What was wrong with it
        message: String,
    },

    /// Any other backend failure
    #[error("Blob store error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Backend(error.to_string())
    }
}

/// A source document that cannot be handed to the segmenter
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    /// The document id is empty or unusable as a key component
    #[error("Invalid document id '{0}'")]
    InvalidDocumentId(String),

    /// The document body is not UTF-8 text
    #[error("Document '{document_id}' is not valid UTF-8: {message}")]
    NotUtf8 {
        /// Offending document
        document_id: String,
        /// Decoder message
        message: String,
    },
}

/// Errors that can occur while translating a single segment
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered, but with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyTranslation,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the blob store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Unusable source document
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
