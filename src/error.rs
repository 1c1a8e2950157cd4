//! Error types for the console core
//!
//! Collaborator failures (search, import, template download) are caught at
//! the boundary of each operation and turned into state; these types only
//! escape through configuration loading, the REST client and the CLI.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while talking to the REST backend
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {}", .body.display_message().unwrap_or_else(|| "no details".to_string()))]
    Status { status: u16, body: ApiErrorBody },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// Structured payload carried by the failure, if the server sent one
    pub fn body(&self) -> Option<&ApiErrorBody> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

/// Error payload returned by the backend on a rejected request.
///
/// `error` is either a plain string or an object with a `message`; bulk
/// imports may also enumerate row-level problems in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub errors: Option<Vec<String>>,
}

/// The `error` field of [`ApiErrorBody`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    Text(String),
    Structured {
        #[serde(default)]
        message: Option<String>,
    },
    /// Any other shape; carries no message
    Other(Value),
}

impl ApiErrorBody {
    /// Body with a plain-string `error`
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(ApiErrorDetail::Text(error.into())),
            ..Self::default()
        }
    }

    /// Attach row-level errors
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Human-readable message: string `error`, then `error.message`, then `message`.
    pub fn display_message(&self) -> Option<String> {
        let from_error = match &self.error {
            Some(ApiErrorDetail::Text(text)) => Some(text.clone()),
            Some(ApiErrorDetail::Structured { message }) => message.clone(),
            Some(ApiErrorDetail::Other(_)) | None => None,
        };
        let not_blank = |m: &String| !m.trim().is_empty();
        from_error
            .filter(not_blank)
            .or_else(|| self.message.clone().filter(not_blank))
    }
}

/// Row errors are normally strings; anything else is kept in its JSON form
/// so one odd entry does not make the whole body unreadable.
fn lenient_errors<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let render = |value: Value| match value {
        Value::String(text) => text,
        other => other.to_string(),
    };
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.into_iter().map(render).collect()),
        Some(other) => Some(vec![render(other)]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_error_wins() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": "bad format", "message": "ignored", "errors": ["row 2: bad"]}"#,
        )
        .unwrap();
        assert_eq!(body.display_message().as_deref(), Some("bad format"));
        assert_eq!(body.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_nested_message() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": {"message": "missing column"}}"#).unwrap();
        assert_eq!(body.display_message().as_deref(), Some("missing column"));
    }

    #[test]
    fn test_top_level_message_fallback() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": {}, "message": "server says no"}"#).unwrap();
        assert_eq!(body.display_message().as_deref(), Some("server says no"));
    }

    #[test]
    fn test_blank_error_falls_through_to_message() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": "", "message": "server says no"}"#).unwrap();
        assert_eq!(body.display_message().as_deref(), Some("server says no"));

        let blank: ApiErrorBody =
            serde_json::from_str(r#"{"error": " ", "message": ""}"#).unwrap();
        assert!(blank.display_message().is_none());
    }

    #[test]
    fn test_odd_row_errors_keep_body_readable() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": "bad", "errors": ["row 2: bad", {"row": 3, "detail": "empty"}, null]}"#,
        )
        .unwrap();
        assert_eq!(body.display_message().as_deref(), Some("bad"));
        let errors = body.errors.unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "row 2: bad");
        assert!(errors[1].contains("\"detail\":\"empty\""));
        assert_eq!(errors[2], "null");
    }

    #[test]
    fn test_single_string_errors_and_odd_error_field() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": 42, "errors": "sheet is empty", "message": "nope"}"#)
                .unwrap();
        assert_eq!(body.errors, Some(vec!["sheet is empty".to_string()]));
        assert_eq!(body.display_message().as_deref(), Some("nope"));
    }

    #[test]
    fn test_no_message() {
        let body: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.display_message().is_none());
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 400,
            body: ApiErrorBody::with_error("bad format"),
        };
        assert_eq!(err.to_string(), "HTTP 400: bad format");
    }
}
