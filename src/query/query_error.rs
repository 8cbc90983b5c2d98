use std::fmt::Display;

/// Errors raised while turning JSON into a [`Query`](crate::query::Query).
///
/// Cleaning itself never fails; these only exist at the JSON boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The top-level value was valid JSON but not an object.
    NotAnObject(String),
    /// The text could not be parsed as JSON at all.
    Json(String),
}

impl QueryError {
    pub fn err<T>(self) -> Result<T, QueryError> {
        Err(self)
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::NotAnObject(kind) => write!(f, "QueryError: expected a JSON object, got {}", kind),
            QueryError::Json(message) => write!(f, "QueryError: invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<serde_json::Error> for QueryError {
    fn from(value: serde_json::Error) -> Self {
        QueryError::Json(value.to_string())
    }
}
