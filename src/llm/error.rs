use serde::Deserialize;
use thiserror::Error;

/// Failures surfaced to the form when a summary cannot be produced.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("could not reach the API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("unexpected HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no text output returned from model")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    r#type: Option<String>,
    message: String,
}

/// Maps a non-success status and body to an error, keeping the API's own message when it sent one.
pub fn parse_http_error(status: u16, body: &str) -> LlmError {
    let message = error_message(body);

    match status {
        401 | 403 => LlmError::Authentication(message),
        429 => LlmError::RateLimited(message),
        400 | 404 | 413 | 422 => LlmError::InvalidRequest(message),
        500..=599 => LlmError::Server { status, message },
        _ => LlmError::Http { status, message },
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.r#type {
            Some(kind) => format!("{} ({kind})", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_message_from_error_envelope() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        let err = parse_http_error(401, body);
        assert!(matches!(err, LlmError::Authentication(_)));
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid x-api-key (authentication_error)"
        );
    }

    #[test]
    fn falls_back_to_raw_body() {
        let err = parse_http_error(502, "Bad Gateway\n");
        assert!(matches!(err, LlmError::Server { status: 502, .. }));
        assert_eq!(err.to_string(), "service error (HTTP 502): Bad Gateway");
    }

    #[test]
    fn maps_statuses_to_variants() {
        assert!(matches!(parse_http_error(403, ""), LlmError::Authentication(_)));
        assert!(matches!(parse_http_error(429, ""), LlmError::RateLimited(_)));
        assert!(matches!(parse_http_error(400, ""), LlmError::InvalidRequest(_)));
        assert!(matches!(parse_http_error(404, ""), LlmError::InvalidRequest(_)));
        assert!(matches!(parse_http_error(529, ""), LlmError::Server { .. }));
        assert!(matches!(
            parse_http_error(302, ""),
            LlmError::Http { status: 302, .. }
        ));
    }

    #[test]
    fn empty_body_gets_placeholder_message() {
        assert_eq!(
            parse_http_error(429, "  ").to_string(),
            "rate limited: empty response body"
        );
    }
}
