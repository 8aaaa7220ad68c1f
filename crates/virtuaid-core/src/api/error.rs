use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("No server response: {0}")]
    NetworkUnreachable(String),

    #[error("Unauthorized - session marker or credentials rejected")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server rejected request with status {status}: {body}")]
    ServerRejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification used by callers that only care why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkUnreachable,
    Unauthorized,
    ServerRejected,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            code => ApiError::ServerRejected {
                status: code,
                body: truncated,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::BadRequest(_)
            | ApiError::ServerRejected { .. }
            | ApiError::InvalidResponse(_) => ErrorKind::ServerRejected,
        }
    }

    /// True for responses that mean the access token is no longer accepted.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized | ApiError::ServerRejected { status: 403, .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, "")
        } else {
            ApiError::NetworkUnreachable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "nope"),
            ApiError::Unauthorized
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "missing"),
            ApiError::BadRequest("missing".to_string())
        );
        assert_eq!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerRejected {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_kind_folds_into_three_classes() {
        assert_eq!(
            ApiError::NetworkUnreachable("refused".into()).kind(),
            ErrorKind::NetworkUnreachable
        );
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            ApiError::BadRequest(String::new()).kind(),
            ErrorKind::ServerRejected
        );
        assert_eq!(
            ApiError::InvalidResponse("no token".into()).kind(),
            ErrorKind::ServerRejected
        );
    }

    #[test]
    fn test_auth_rejection() {
        assert!(ApiError::Unauthorized.is_auth_rejection());
        assert!(ApiError::ServerRejected {
            status: 403,
            body: String::new()
        }
        .is_auth_rejection());
        assert!(!ApiError::ServerRejected {
            status: 500,
            body: String::new()
        }
        .is_auth_rejection());
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(600);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
    }
}
