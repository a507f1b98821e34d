//! Error types for the Nirvan coach core.

use thiserror::Error;

/// A shared error type for every Nirvan crate.
///
/// Storage failures are usually recovered by the session store and only
/// logged; the variants a caller is expected to branch on are
/// [`NirvanError::ConsentRequired`], [`NirvanError::Network`] and
/// [`NirvanError::MalformedResponse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NirvanError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Key-value store failure that is not a plain IO error (lock, quota)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user-supplied input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The user has not accepted the data-sharing consent yet
    #[error("AI consent not granted. Please accept the privacy policy to continue.")]
    ConsentRequired,

    /// The completion endpoint could not be reached or answered with a failure status
    #[error("Completion API error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The completion endpoint answered with a body we could not use
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NirvanError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_consent_required(&self) -> bool {
        matches!(self, Self::ConsentRequired)
    }

    /// True for failures that came from talking to the completion endpoint.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::MalformedResponse(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Message suitable for showing inline in the conversation.
    ///
    /// Remote failures carry the server-provided text when there was one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { message, .. } if !message.trim().is_empty() => {
                format!("OpenAI API Error: {}", message)
            }
            Self::Network { .. } | Self::MalformedResponse(_) => {
                "I'm having trouble connecting to the server.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for NirvanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NirvanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NirvanError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NirvanError>`.
pub type Result<T> = std::result::Result<T, NirvanError>;
