// ABOUTME: Errors returned by Elastic Beanstalk and bundle storage operations.
// ABOUTME: Classifies provider failures so callers can tell conflicts and throttling apart.

/// Errors from provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The resource being created already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The addressed application, environment, or bucket does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The provider refused the request (validation, permissions, busy environment).
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// Request rate exceeded.
    #[error("throttled: {0}")]
    Throttled(String),

    /// The request never produced a service response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Classify a service error by its code and message.
    pub fn from_service(code: Option<&str>, message: Option<&str>) -> Self {
        let code = code.unwrap_or("Unknown");
        let message = message.unwrap_or_default();
        let lowered = message.to_ascii_lowercase();

        if matches!(code, "Throttling" | "ThrottlingException" | "SlowDown") {
            return ProviderError::Throttled(message.to_string());
        }
        if lowered.contains("already exists") {
            return ProviderError::AlreadyExists(message.to_string());
        }
        if matches!(code, "NoSuchBucket" | "NoSuchKey")
            || lowered.contains("no environment found")
            || lowered.contains("no application found")
        {
            return ProviderError::NotFound(message.to_string());
        }

        ProviderError::Rejected {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// Throttling and transport failures may succeed on a later observation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Throttled(_) | ProviderError::Transport(_)
        )
    }
}
