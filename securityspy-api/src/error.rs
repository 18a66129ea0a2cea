//! Error types for the SecuritySpy API layer.

/// Errors returned by one-shot SecuritySpy requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the supplied credential
    #[error("invalid credentials for SecuritySpy server")]
    InvalidCredentials,

    /// The request could not be sent or the transport failed mid-flight
    #[error("request error: {0}")]
    Request(String),

    /// The response body could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The server answered, but not with what the operation requires
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Convenience Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "invalid credentials for SecuritySpy server"
        );
        assert_eq!(
            ApiError::Request("connection refused".to_string()).to_string(),
            "request error: connection refused"
        );
        assert_eq!(
            ApiError::UnexpectedResponse("body was not OK".to_string()).to_string(),
            "unexpected response: body was not OK"
        );
    }
}
