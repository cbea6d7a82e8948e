use crate::prelude::graphql::*;
use displaydoc::Display;
use http::header::ALLOW;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use typed_builder::TypedBuilder;

/// A language-level error, as found in the `errors` array of a response.
///
/// These never abort the request pipeline: parse, validation and resolver
/// failures are collected per request item and rendered as response content.
/// Serialized with serde; an error with no locations, path or extensions
/// renders as a bare `{"message": ...}` object.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize, Default, TypedBuilder)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error in the originating query document.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub locations: Vec<Location>,

    /// If this is a field error, the path to that field in the response data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub path: Option<Path>,

    /// The optional graphql extensions.
    #[serde(default, skip_serializing_if = "Object::is_empty")]
    #[builder(default)]
    pub extensions: Object,
}

/// A location in the query document that triggered an [`struct@Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number.
    pub line: i32,

    /// The column number.
    pub column: i32,
}

/// A hard transport error raised for request-correctness violations.
///
/// These are distinct from language-level [`struct@Error`]s: they abort the
/// request (or, under [`CatchPolicy::Suppress`], blank out one batch slot)
/// instead of being rendered inside an item's `errors` array. Every variant
/// maps to exactly one status code and message.
#[derive(Clone, Debug, Eq, PartialEq, Error, Display)]
pub enum HttpQueryError {
    /// GraphQL only supports GET and POST requests.
    MethodNotAllowed,

    /// GraphQL params should be a dict. Received {0}.
    InvalidParams(String),

    /// Batch requests are not enabled.
    BatchNotEnabled,

    /// Received an empty list in the batch request.
    EmptyBatch,

    /// Variables are invalid JSON.
    InvalidVariables,

    /// Must provide query string.
    MissingQuery,

    /// Can only perform a {kind} operation from a POST request.
    InvalidOperation {
        /// The offending operation kind.
        kind: OperationKind,
    },

    /// POST body sent invalid JSON.
    InvalidBody,
}

impl HttpQueryError {
    /// The HTTP status code the transport should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpQueryError::MethodNotAllowed | HttpQueryError::InvalidOperation { .. } => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Response headers that must accompany the status code.
    ///
    /// The 405 variants carry an `Allow` header listing the accepted methods.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            HttpQueryError::MethodNotAllowed => {
                headers.insert(ALLOW, HeaderValue::from_static("GET, POST"));
            }
            HttpQueryError::InvalidOperation { .. } => {
                headers.insert(ALLOW, HeaderValue::from_static("POST"));
            }
            _ => {}
        }
        headers
    }
}

/// Render a language-level error as response content.
///
/// A structured error keeps its locations, path and extensions; anything
/// else collapses to `{"message": ...}`. This is the default formatter for
/// [`encode_execution_results`].
pub fn default_format_error(error: &Error) -> Value {
    serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn bare_error_renders_as_message_only() {
        let error = Error::builder().message("it broke").build();
        assert_eq!(default_format_error(&error), json!({ "message": "it broke" }));
    }

    #[test]
    fn rich_error_renders_fully() {
        let error = Error::builder()
            .message("Cannot query field \"name\"")
            .locations(vec![Location { line: 2, column: 3 }])
            .path(vec![PathElement::from("hero"), PathElement::from(0)])
            .build();
        assert_eq!(
            default_format_error(&error),
            json!({
                "message": "Cannot query field \"name\"",
                "locations": [{ "line": 2, "column": 3 }],
                "path": ["hero", 0],
            })
        );
    }

    #[test]
    fn method_not_allowed_carries_allow_header() {
        let err = HttpQueryError::MethodNotAllowed;
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.headers().get(ALLOW).unwrap(), "GET, POST");
        assert_eq!(err.to_string(), "GraphQL only supports GET and POST requests.");
    }

    #[test]
    fn invalid_operation_names_the_kind() {
        let err = HttpQueryError::InvalidOperation {
            kind: OperationKind::Mutation,
        };
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.headers().get(ALLOW).unwrap(), "POST");
        assert_eq!(
            err.to_string(),
            "Can only perform a mutation operation from a POST request."
        );
    }

    #[test]
    fn bad_request_variants_have_no_headers() {
        for err in [
            HttpQueryError::BatchNotEnabled,
            HttpQueryError::EmptyBatch,
            HttpQueryError::InvalidVariables,
            HttpQueryError::MissingQuery,
            HttpQueryError::InvalidBody,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(err.headers().is_empty());
        }
    }
}
