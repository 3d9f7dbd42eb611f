//! Domain errors - the failure taxonomy shared by every engagement operation

use thiserror::Error;
use validator::ValidationErrors;

/// Engagement errors
///
/// None of these is fatal: callers revert their optimistic state and inform
/// the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No valid session; resolved by signing in, never retried
    #[error("Authentication required")]
    AuthRequired,

    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Server rejected the request with a non-2xx status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Client-side validation failed; nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// A 2xx response body matched none of the accepted shapes
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for engagement operations
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get an error code string for logs and notifications
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::Api { status: 401, .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if retrying later could succeed (polling does, user actions do not)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Short text for a toast
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to continue".to_string(),
            Self::Network(_) => "Network problem, please try again".to_string(),
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::Validation(msg) => msg.clone(),
            _ => "Something went wrong".to_string(),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                })
            })
            .collect();
        Self::Validation(messages.join("; "))
    }
}
