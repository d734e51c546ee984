use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    #[default]
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the leads API. Servers that only send
/// `{"message": ...}` decode with the code left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from a failed response, preferring the server's own
    /// message when the body is a JSON error envelope.
    pub fn from_response(status: u16, body: &str) -> Self {
        let fallback = ErrorCode::from_status(status);
        match serde_json::from_str::<ApiError>(body) {
            Ok(mut parsed) if !parsed.message.trim().is_empty() => {
                if parsed.code == ErrorCode::Internal {
                    parsed.code = fallback;
                }
                parsed
            }
            _ if body.trim().is_empty() => Self::new(fallback, format!("HTTP {status}")),
            _ => Self::new(fallback, format!("HTTP {status}: {}", body.trim())),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_message_only_body_with_status_code() {
        let err = ApiError::from_response(404, r#"{"message":"Lead not found."}"#);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Lead not found.");
    }

    #[test]
    fn keeps_explicit_code_from_body() {
        let err = ApiError::from_response(400, r#"{"code":"validation","message":"bad url"}"#);
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[test]
    fn falls_back_to_raw_body_for_non_json_errors() {
        let err = ApiError::from_response(502, "bad gateway\n");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "HTTP 502: bad gateway");

        let empty = ApiError::from_response(500, "");
        assert_eq!(empty.message, "HTTP 500");
    }
}
