use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub(crate) const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;
pub(crate) const FALLBACK_MESSAGE: &str = "Request failed";

/// A non-success, non-unauthorized response from the config service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub status: u16,
    pub message: String,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={}, message={}", self.status, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("request failed: {0}")]
    Request(RequestFailure),
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState(message.into())
    }

    /// Returns true when the failure requires the user to authenticate again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    /// Message suitable for showing next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(failure) => failure.message.clone(),
            Error::Validation { field, message } => format!("{field}: {message}"),
            Error::Unauthorized => "Unauthorized".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<Value>,
}

pub(crate) async fn read_body_with_limit_async(
    resp: &mut Response,
    limit: usize,
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        let remaining = limit.saturating_sub(body.len());
        if remaining == 0 {
            break;
        }
        let take = chunk.len().min(remaining);
        body.extend_from_slice(&chunk[..take]);
    }
    Ok(body)
}

pub(crate) fn parse_error_from_body(status: StatusCode, body: &[u8]) -> Error {
    let message = detail_message(body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    Error::Request(RequestFailure {
        status: status.as_u16(),
        message,
    })
}

fn detail_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorDetail = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail),
        structured => Some(structured.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(err: Error) -> RequestFailure {
        match err {
            Error::Request(failure) => failure,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_error_prefers_detail_string() {
        let err = parse_error_from_body(
            StatusCode::BAD_REQUEST,
            br#"{"detail":"Body must be {\"apis\": [...]}"}"#,
        );
        let failure = failure(err);
        assert_eq!(failure.status, 400);
        assert_eq!(failure.message, r#"Body must be {"apis": [...]}"#);
    }

    #[test]
    fn parse_error_renders_structured_detail_as_json() {
        let err = parse_error_from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#,
        );
        assert_eq!(
            failure(err).message,
            r#"[{"loc":["body"],"msg":"field required"}]"#
        );
    }

    #[test]
    fn parse_error_falls_back_to_status_text() {
        let err = parse_error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(failure(err).message, "Internal Server Error");

        let err = parse_error_from_body(StatusCode::BAD_GATEWAY, br#"{"detail":"  "}"#);
        assert_eq!(failure(err).message, "Bad Gateway");
    }

    #[test]
    fn parse_error_uses_generic_message_without_reason() {
        let status = StatusCode::from_u16(599).expect("status");
        let err = parse_error_from_body(status, b"");
        assert_eq!(failure(err).message, FALLBACK_MESSAGE);
    }

    #[test]
    fn user_message_names_validation_field() {
        let err = Error::validation("headers", "not valid JSON");
        assert_eq!(err.user_message(), "headers: not valid JSON");
        assert!(!err.is_unauthorized());
        assert!(Error::Unauthorized.is_unauthorized());
    }
}
