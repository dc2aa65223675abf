//! Custom error types specific to the `recipehub-client` crate.
//!
//! Every failure the client can surface is a [`ClientError`]. Callers usually
//! only need to distinguish transport problems, API rejections and the two
//! authentication failures that force a logout.

use reqwest::{header::InvalidHeaderValue, StatusCode};
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, TLS, body read...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `data` holds the decoded error body, or an empty object when the body
    /// was missing or not JSON.
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        data: serde_json::Value,
    },

    /// A 401 could not be recovered because the token refresh failed. The
    /// session has been cleared.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// A 401 could not be recovered because the session holds no refresh
    /// token. The session has been cleared and the refresh endpoint was not
    /// called.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The operation needs a logged in user.
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl ClientError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::SessionExpired | ClientError::MissingRefreshToken => {
                Some(StatusCode::UNAUTHORIZED)
            }
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }

    /// True for the failures that cleared the session.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired | ClientError::MissingRefreshToken
        )
    }

    /// True when the backend rejected the request because the resource
    /// already exists (e.g. a taken email or username on registration).
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::CONFLICT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_displays_its_message() {
        let err = ClientError::Api {
            status: StatusCode::BAD_REQUEST,
            message: "name must not be empty".into(),
            data: json!({ "message": "name must not be empty" }),
        };

        assert_eq!(err.to_string(), "name must not be empty");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_session_lost());
    }

    #[test]
    fn auth_failures_report_unauthorized() {
        assert_eq!(
            ClientError::SessionExpired.status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert!(ClientError::SessionExpired.is_session_lost());
        assert!(ClientError::MissingRefreshToken.is_session_lost());
        assert!(!ClientError::NotAuthenticated.is_session_lost());
    }

    #[test]
    fn conflict_is_detected_from_status() {
        let err = ClientError::Api {
            status: StatusCode::CONFLICT,
            message: "Email already exists".into(),
            data: json!({}),
        };
        assert!(err.is_conflict());
        assert!(!ClientError::SessionExpired.is_conflict());
    }
}
