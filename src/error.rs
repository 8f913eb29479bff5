use reqwest::StatusCode;
use serde_json::Value;

pub(crate) const ACCESS_TOKEN_INFO: &str =
    "See https://www.leveropen.com for information on how to obtain your personal Access Token.";

/// A non-success response from the Lever Open API.
///
/// The message always starts with a pointer to the token documentation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{info}\nResponse {code}: {body}", code = .status.as_u16())]
pub struct ApiError {
    info: &'static str,
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, body: Value) -> Self {
        Self {
            info: ACCESS_TOKEN_INFO,
            status,
            body,
        }
    }

    /// Builds the error from a raw response body, keeping it as JSON when it parses.
    pub(crate) fn from_body(status: StatusCode, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text)
            .unwrap_or_else(|_| Value::String(text.to_string()));
        Self::new(status, body)
    }

    pub fn info(&self) -> &str {
        self.info
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Exact-match lookup over a dataset's series did not select exactly one series.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no series with {field} {query:?}")]
    NotFound { field: &'static str, query: String },
    #[error("{matches} series share {field} {query:?}; use a more specific lookup")]
    Ambiguous {
        field: &'static str,
        query: String,
        matches: usize,
    },
}

/// A dataset filter was requested on a field other than name, collection or topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot filter datasets by {0:?}; expected one of: name, collection, topic")]
pub struct FilterFieldError(pub String);
