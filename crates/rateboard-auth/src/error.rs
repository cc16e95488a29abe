use rateboard_core::UserRole;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("role \"{0}\" cannot be chosen at sign-up")]
    RoleNotSelfAssignable(UserRole),

    #[error("invalid auth backend URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl AuthError {
    /// True when the backend refused the caller's input or credentials, as
    /// opposed to failing on its own.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            AuthError::Rejected { status, .. } => (400..500).contains(status),
            AuthError::RoleNotSelfAssignable(_) => true,
            AuthError::Http(_) | AuthError::InvalidUrl { .. } => false,
        }
    }
}
