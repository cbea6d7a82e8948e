use crate::prelude::graphql::*;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A graphql primary response, as produced by the schema executor.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Response {
    /// The response data.
    #[serde(default)]
    #[builder(default)]
    pub data: Value,

    /// The field errors encountered while resolving.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub errors: Vec<Error>,
}

/// The outcome of one item's pipeline run.
///
/// `invalid` means the query never executed: a parse or validation failure,
/// or a fault raised during execution. Such an item renders only its errors
/// and reports 400. A valid outcome with non-empty errors is a partial
/// success (some resolvers failed) and still reports 200 with its data.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ExecutionResult {
    pub data: Option<Value>,
    pub errors: Vec<Error>,
    pub invalid: bool,
}

impl ExecutionResult {
    /// A soft failure: the query could not be executed.
    pub fn invalid(errors: Vec<Error>) -> Self {
        ExecutionResult {
            data: None,
            errors,
            invalid: true,
        }
    }
}

impl From<Response> for ExecutionResult {
    fn from(response: Response) -> Self {
        ExecutionResult {
            data: Some(response.data),
            errors: response.errors,
            invalid: false,
        }
    }
}

/// One item's share of the HTTP response: a body (absent for suppressed
/// slots) and the status it reports into the aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseFragment {
    pub body: Option<Value>,
    pub status_code: StatusCode,
}

/// Render one outcome as a response fragment.
///
/// A suppressed slot (`None`) renders as no body with status 200. An invalid
/// outcome renders `{"errors": [...]}` with status 400 and no `data` field;
/// a valid outcome always carries `data` (even when null), preceded by its
/// formatted errors when there are any.
pub fn format_execution_result<F>(
    result: Option<&ExecutionResult>,
    format_error: &F,
) -> ResponseFragment
where
    F: Fn(&Error) -> Value,
{
    let result = match result {
        Some(result) => result,
        None => {
            return ResponseFragment {
                body: None,
                status_code: StatusCode::OK,
            }
        }
    };

    let mut response = Object::new();
    if !result.errors.is_empty() {
        response.insert(
            "errors".to_string(),
            Value::Array(result.errors.iter().map(format_error).collect()),
        );
    }

    let status_code = if result.invalid {
        StatusCode::BAD_REQUEST
    } else {
        response.insert(
            "data".to_string(),
            result.data.clone().unwrap_or(Value::Null),
        );
        StatusCode::OK
    };

    ResponseFragment {
        body: Some(Value::Object(response)),
        status_code,
    }
}

/// The aggregate response for a whole request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub body: Value,
    pub status_code: StatusCode,
}

/// Convert the ordered per-item outcomes into the final body and status.
///
/// The aggregate status is the maximum over all per-item statuses, so one
/// invalid item forces 400 for the whole batch even when its siblings
/// succeeded. Batch input keeps its array shape, with suppressed slots kept
/// as `null` entries; single input unwraps to the bare object.
pub fn encode_execution_results<F>(
    results: &[Option<ExecutionResult>],
    is_batch: bool,
    format_error: F,
) -> HttpResponse
where
    F: Fn(&Error) -> Value,
{
    let fragments: Vec<ResponseFragment> = results
        .iter()
        .map(|result| format_execution_result(result.as_ref(), &format_error))
        .collect();

    let status_code = fragments
        .iter()
        .map(|fragment| fragment.status_code)
        .max_by_key(|status| status.as_u16())
        .unwrap_or(StatusCode::OK);

    let mut bodies = fragments
        .into_iter()
        .map(|fragment| fragment.body.unwrap_or(Value::Null));
    let body = if is_batch {
        Value::Array(bodies.collect())
    } else {
        bodies.next().unwrap_or(Value::Null)
    };

    HttpResponse { body, status_code }
}

/// Encode a response body for the wire.
///
/// Compact uses `,`/`:` separators; pretty indents with two spaces.
pub fn json_encode(body: &Value, pretty: bool) -> String {
    let encoded = if pretty {
        serde_json::to_string_pretty(body)
    } else {
        serde_json::to_string(body)
    };
    encoded.unwrap_or_else(|_| String::from("null"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_response() {
        let result = serde_json::from_str::<Response>(
            json!(
            {
              "errors": [
                {
                  "message": "Name for character with ID 1002 could not be fetched.",
                  "locations": [{ "line": 6, "column": 7 }],
                  "path": ["hero", "heroFriends", 1, "name"]
                }
              ],
              "data": {
                "hero": {
                  "name": "R2-D2",
                  "heroFriends": [
                    { "id": "1000", "name": "Luke Skywalker" },
                    { "id": "1002", "name": null },
                    { "id": "1003", "name": "Leia Organa" }
                  ]
                }
              }
            })
            .to_string()
            .as_str(),
        );
        assert_eq!(
            result.unwrap(),
            Response::builder()
                .data(json!({
                  "hero": {
                    "name": "R2-D2",
                    "heroFriends": [
                      { "id": "1000", "name": "Luke Skywalker" },
                      { "id": "1002", "name": null },
                      { "id": "1003", "name": "Leia Organa" }
                    ]
                  }
                }))
                .errors(vec![Error::builder()
                    .message("Name for character with ID 1002 could not be fetched.")
                    .locations(vec![Location { line: 6, column: 7 }])
                    .path(vec![
                        PathElement::from("hero"),
                        PathElement::from("heroFriends"),
                        PathElement::from(1),
                        PathElement::from("name"),
                    ])
                    .build()])
                .build()
        );
    }

    #[test]
    fn invalid_outcome_renders_errors_only() {
        let result = ExecutionResult::invalid(vec![Error::builder().message("boom").build()]);
        let fragment = format_execution_result(Some(&result), &default_format_error);
        assert_eq!(
            fragment.body,
            Some(json!({ "errors": [{ "message": "boom" }] }))
        );
        assert_eq!(fragment.status_code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn partial_success_renders_errors_then_data() {
        let result = ExecutionResult {
            data: Some(json!({ "a": 1 })),
            errors: vec![Error::builder().message("boom").build()],
            invalid: false,
        };
        let fragment = format_execution_result(Some(&result), &default_format_error);
        assert_eq!(fragment.status_code, StatusCode::OK);
        assert_eq!(
            json_encode(&fragment.body.unwrap(), false),
            r#"{"errors":[{"message":"boom"}],"data":{"a":1}}"#
        );
    }

    #[test]
    fn valid_outcome_keeps_a_null_data_field() {
        let result = ExecutionResult {
            data: None,
            errors: vec![],
            invalid: false,
        };
        let fragment = format_execution_result(Some(&result), &default_format_error);
        assert_eq!(fragment.body, Some(json!({ "data": null })));
    }

    #[test]
    fn suppressed_slot_renders_as_no_body() {
        let fragment = format_execution_result(None, &default_format_error);
        assert_eq!(fragment.body, None);
        assert_eq!(fragment.status_code, StatusCode::OK);
    }

    #[test]
    fn batch_status_is_the_maximum() {
        let results = vec![
            Some(ExecutionResult::from(
                Response::builder().data(json!({ "a": 1 })).build(),
            )),
            Some(ExecutionResult::invalid(vec![Error::builder()
                .message("nope")
                .build()])),
        ];
        let response = encode_execution_results(&results, true, default_format_error);
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body,
            json!([
                { "data": { "a": 1 } },
                { "errors": [{ "message": "nope" }] },
            ])
        );
    }

    #[test]
    fn batch_preserves_suppressed_slots() {
        let results = vec![
            Some(ExecutionResult::from(
                Response::builder().data(json!({ "a": 1 })).build(),
            )),
            None,
        ];
        let response = encode_execution_results(&results, true, default_format_error);
        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, json!([{ "data": { "a": 1 } }, null]));
    }

    #[test]
    fn single_input_unwraps_to_a_bare_object() {
        let results = vec![Some(ExecutionResult::from(
            Response::builder().data(json!({ "a": 1 })).build(),
        ))];
        let response = encode_execution_results(&results, false, default_format_error);
        assert_eq!(response.body, json!({ "data": { "a": 1 } }));
    }

    #[test]
    fn json_encode_is_compact_or_pretty() {
        let body = json!({ "data": { "a": 1 } });
        assert_eq!(json_encode(&body, false), r#"{"data":{"a":1}}"#);
        assert_eq!(
            json_encode(&body, true),
            "{\n  \"data\": {\n    \"a\": 1\n  }\n}"
        );
    }
}
