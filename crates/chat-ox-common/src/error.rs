use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to a chat completion endpoint
#[derive(Error, Debug)]
pub enum CommonRequestError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid event data in streaming response
    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    /// Successful status, but the body was not what we expected
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The provider answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        r#type: Option<String>,
        code: Option<String>,
    },
}

impl CommonRequestError {
    /// HTTP status of the failed exchange, when one was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// `{"error": {...}}` envelope used by OpenAI-compatible providers
#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    /// Absent when the body is some other JSON document
    error: Option<ApiErrorBody>,
}

/// Inner object of the error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    /// Human readable description
    message: Option<String>,
    /// Provider error class, e.g. `invalid_request_error`
    r#type: Option<String>,
    /// Machine readable code
    #[serde(default, deserialize_with = "code_as_string")]
    code: Option<String>,
}

/// Some providers send numeric codes, others strings.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Parse error response from HTTP status and body
#[must_use]
pub fn parse_error_response(status: reqwest::StatusCode, body: &bytes::Bytes) -> CommonRequestError {
    let status = status.as_u16();

    if let Ok(ApiErrorPayload { error: Some(error) }) = serde_json::from_slice::<ApiErrorPayload>(body) {
        if let Some(message) = error.message {
            return CommonRequestError::Api {
                status,
                message,
                r#type: error.r#type,
                code: error.code,
            };
        }
    }

    // Fall back to raw body
    CommonRequestError::Api {
        status,
        message: String::from_utf8_lossy(body).into_owned(),
        r#type: None,
        code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::StatusCode;

    #[test]
    fn parses_openai_error_envelope() {
        let body = Bytes::from_static(
            br#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        );
        let err = parse_error_response(StatusCode::UNAUTHORIZED, &body);
        match err {
            CommonRequestError::Api {
                status,
                message,
                r#type,
                code,
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
                assert_eq!(r#type.as_deref(), Some("invalid_request_error"));
                assert_eq!(code.as_deref(), Some("invalid_api_key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_codes_become_strings() {
        let body = Bytes::from_static(br#"{"error":{"message":"slow down","code":429}}"#);
        let err = parse_error_response(StatusCode::TOO_MANY_REQUESTS, &body);
        assert!(matches!(err, CommonRequestError::Api { code: Some(ref c), .. } if c == "429"));
    }

    #[test]
    fn falls_back_to_raw_body() {
        let body = Bytes::from_static(b"upstream connect error");
        let err = parse_error_response(StatusCode::BAD_GATEWAY, &body);
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            err.to_string(),
            "API error (HTTP 502): upstream connect error"
        );
    }
}
