use crate::prelude::graphql::*;
use bytes::Bytes;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use urlencoding::decode;

/// One raw graphql request item, as received from the transport.
///
/// This is the shape of a POST body object (or batch entry) and of the
/// query-string fallback parameter set. `variables` may still be a
/// json-encoded string at this stage; [`QueryParams::extract`] decodes it.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct Request {
    /// The graphql query.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub query: Option<String>,

    /// The optional graphql operation to select.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub operation_name: Option<String>,

    /// The optional variables: a json object, or a json-encoded string.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[builder(default)]
    pub variables: Option<Value>,
}

impl Request {
    /// Build the fallback parameter set from a raw url-encoded query string.
    ///
    /// `variables` stays a json-encoded string here and is decoded during
    /// extraction, so a malformed value still fails with the right error.
    pub fn from_urlencoded_query(url_encoded_query: String) -> Result<Request, serde_json::Error> {
        // decode percent encoded string
        // from the docs `Unencoded `+` is preserved literally, and _not_ changed to a space.`,
        // so let's do it I guess
        let query = url_encoded_query.replace('+', " ");
        let decoded_string = decode(query.as_str()).map_err(serde_json::Error::custom)?;
        let urldecoded: Value =
            serde_urlencoded::from_str(&decoded_string).map_err(serde_json::Error::custom)?;

        let query = if let Some(Value::String(query)) = urldecoded.get("query") {
            Some(query.clone())
        } else {
            None
        };
        let operation_name = if let Some(Value::String(name)) = urldecoded.get("operationName") {
            Some(name.clone())
        } else {
            None
        };
        let variables = urldecoded.get("variables").cloned();

        Ok(Request::builder()
            .query(query)
            .operation_name(operation_name)
            .variables(variables)
            .build())
    }

    /// Read one body item, which must be a json object.
    pub fn from_value(value: &Value) -> Result<Request, HttpQueryError> {
        if !value.is_object() {
            return Err(HttpQueryError::InvalidParams(value.to_string()));
        }
        serde_json::from_value(value.clone())
            .map_err(|_| HttpQueryError::InvalidParams(value.to_string()))
    }
}

/// The shape of a request body, resolved exactly once at the transport edge.
///
/// Downstream components never re-inspect the shape: a batch stays a batch
/// for response assembly even when it holds a single item, and a single
/// request always produces a bare response object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// An array of independent request items, executed together.
    Batch(Vec<Value>),

    /// A single request item.
    Single(Value),
}

impl RequestBody {
    /// Decode a raw POST body.
    pub fn from_bytes(body: Bytes) -> Result<RequestBody, HttpQueryError> {
        serde_json::from_slice(&body).map_err(|_| HttpQueryError::InvalidBody)
    }
}

impl Default for RequestBody {
    /// An empty single request: every parameter comes from the fallback,
    /// which is how GET requests enter the pipeline.
    fn default() -> Self {
        RequestBody::Single(Value::Object(Object::new()))
    }
}

/// The extracted parameters of one query. Immutable once built.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct QueryParams {
    pub query: Option<String>,
    pub variables: Option<Object>,
    pub operation_name: Option<String>,
}

impl QueryParams {
    /// Resolve one item against the transport-level fallback parameters.
    ///
    /// `query` and `operationName` fall back when absent or empty. A
    /// `variables` value wins on presence alone, so an explicitly empty
    /// mapping is respected instead of being treated as missing; string
    /// variables are json-decoded here and must decode to an object.
    pub fn extract(request: &Request, defaults: &Request) -> Result<QueryParams, HttpQueryError> {
        let variables = request
            .variables
            .as_ref()
            .or(defaults.variables.as_ref())
            .map(load_json_variables)
            .transpose()?;

        Ok(QueryParams {
            query: resolve_param(request.query.as_deref(), defaults.query.as_deref()),
            variables,
            operation_name: resolve_param(
                request.operation_name.as_deref(),
                defaults.operation_name.as_deref(),
            ),
        })
    }
}

/// Item value wins unless absent or empty, then the fallback, then none.
fn resolve_param(value: Option<&str>, fallback: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.filter(|v| !v.is_empty()))
        .map(str::to_string)
}

fn load_json_variables(variables: &Value) -> Result<Object, HttpQueryError> {
    match variables {
        Value::String(raw) => match serde_json::from_str(raw) {
            Ok(Value::Object(decoded)) => Ok(decoded),
            _ => Err(HttpQueryError::InvalidVariables),
        },
        Value::Object(map) => Ok(map.clone()),
        _ => Err(HttpQueryError::InvalidVariables),
    }
}
