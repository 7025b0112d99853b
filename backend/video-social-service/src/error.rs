/// Error types for video-social-service
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("no such user")]
    NoSuchUser,

    #[error("wrong password")]
    WrongPassword,

    #[error("not authorized")]
    NotAuthorized,

    #[error("no such video")]
    NoSuchVideo,

    #[error("no such comment")]
    NoSuchComment,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable code for callers that render their own messages
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            ServiceError::NoSuchUser => "NO_SUCH_USER",
            ServiceError::WrongPassword => "WRONG_PASSWORD",
            ServiceError::NotAuthorized => "NOT_AUTHORIZED",
            ServiceError::NoSuchVideo => "NO_SUCH_VIDEO",
            ServiceError::NoSuchComment => "NO_SUCH_COMMENT",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }
}

/// Failure reported by a live notification callback.
///
/// Never escapes fan-out: the hub logs it and moves on to the next callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The receiving side is gone; the registration is pruned.
    #[error("callback disconnected")]
    Disconnected,

    #[error("callback rejected notification: {0}")]
    Rejected(String),
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ServiceError::NoSuchUser.to_string(), "no such user");
        assert_eq!(ServiceError::NotAuthorized.to_string(), "not authorized");
        assert_eq!(
            ServiceError::Internal("id space exhausted".into()).to_string(),
            "Internal error: id space exhausted"
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            ServiceError::UserAlreadyExists,
            ServiceError::NoSuchUser,
            ServiceError::WrongPassword,
            ServiceError::NotAuthorized,
            ServiceError::NoSuchVideo,
            ServiceError::NoSuchComment,
            ServiceError::Internal(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(ServiceError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
