//! The request pipeline: transport validation, parameter extraction,
//! concurrent per-item execution and hard-error policy.

use crate::prelude::graphql::*;
use futures::future::join_all;
use http::Method;
use typed_builder::TypedBuilder;

/// What happens when one item's pipeline raises a hard [`HttpQueryError`].
///
/// Language-level failures are unaffected by this policy: they are always
/// absorbed into the item's [`ExecutionResult`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CatchPolicy {
    /// Abort the whole request with the first error, in input order.
    #[default]
    Propagate,

    /// Blank out the failing item's slot and leave its siblings alone.
    Suppress,
}

/// Per-request knobs supplied by the transport integration.
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct HttpQueryOptions {
    /// Accept array bodies.
    #[builder(default)]
    pub batch_enabled: bool,

    /// Hard-error handling for individual batch items.
    #[builder(default)]
    pub catch: CatchPolicy,

    /// Fallback parameters decoded from the query string.
    ///
    /// Only single requests consume these; batch items never inherit the
    /// transport-level defaults.
    #[builder(default)]
    pub query_data: Option<Request>,
}

/// Everything the pipeline produced for one request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpQueryResult {
    /// Ordered per-item outcomes; `None` marks a suppressed slot.
    pub responses: Vec<Option<ExecutionResult>>,

    /// The extracted parameters, in the same order, for transport-side
    /// logging.
    pub params: Vec<QueryParams>,

    /// Whether the input was a batch; drives the output shape.
    pub is_batch: bool,
}

impl HttpQueryResult {
    /// Aggregate into the final body and status with the default error
    /// formatter.
    pub fn into_response(self) -> HttpResponse {
        self.into_response_with(default_format_error)
    }

    /// Aggregate with a custom error formatter.
    pub fn into_response_with<F>(self, format_error: F) -> HttpResponse
    where
        F: Fn(&Error) -> Value,
    {
        encode_execution_results(&self.responses, self.is_batch, format_error)
    }
}

/// Drive a whole HTTP request through the pipeline.
///
/// Enforces the transport constraints (method, body shape, batch rules),
/// extracts the parameters of every item, then runs one pipeline per item
/// concurrently. The outcome list preserves input order regardless of
/// completion order. Under [`CatchPolicy::Propagate`] the first hard item
/// error aborts the request; under [`CatchPolicy::Suppress`] it becomes a
/// `None` slot. Errors raised before dispatch (method, body shape, batch
/// rules, parameter extraction) always abort, whatever the policy.
#[tracing::instrument(skip_all, level = "debug")]
pub async fn run_http_query<E>(
    executor: &E,
    method: &Method,
    body: RequestBody,
    options: HttpQueryOptions,
    context: &Context,
) -> Result<HttpQueryResult, HttpQueryError>
where
    E: SchemaExecutor,
{
    if method != Method::GET && method != Method::POST {
        return Err(HttpQueryError::MethodNotAllowed);
    }
    // GET requests may only execute query operations.
    let allow_only_query = method == Method::GET;

    let (items, is_batch) = validate_body(body, options.batch_enabled)?;

    // Batch items never see the query-string defaults.
    let defaults = match (is_batch, options.query_data) {
        (false, Some(query_data)) => query_data,
        _ => Request::default(),
    };

    let params = items
        .iter()
        .map(|item| {
            let request = Request::from_value(item)?;
            QueryParams::extract(&request, &defaults)
        })
        .collect::<Result<Vec<QueryParams>, HttpQueryError>>()?;

    // join_all keeps the results indexed by input position and awaits every
    // pipeline before returning, so no item is still in flight once the
    // first propagated error is reported.
    let outcomes = join_all(
        params
            .iter()
            .map(|params| execute_query_request(executor, params, allow_only_query, context)),
    )
    .await;

    let responses = match options.catch {
        CatchPolicy::Suppress => outcomes.into_iter().map(Result::ok).collect(),
        CatchPolicy::Propagate => outcomes
            .into_iter()
            .map(|outcome| outcome.map(Some))
            .collect::<Result<Vec<Option<ExecutionResult>>, HttpQueryError>>()?,
    };

    Ok(HttpQueryResult {
        responses,
        params,
        is_batch,
    })
}

/// Classify the body shape and enforce the batch rules.
fn validate_body(
    body: RequestBody,
    batch_enabled: bool,
) -> Result<(Vec<Value>, bool), HttpQueryError> {
    match body {
        RequestBody::Batch(items) => {
            if !batch_enabled {
                return Err(HttpQueryError::BatchNotEnabled);
            }
            if items.is_empty() {
                return Err(HttpQueryError::EmptyBatch);
            }
            Ok((items, true))
        }
        RequestBody::Single(item) => {
            if !item.is_object() {
                return Err(HttpQueryError::InvalidParams(item.to_string()));
            }
            Ok((vec![item], false))
        }
    }
}

/// Run one item through parse → validate → method policy → execute.
///
/// Parse, validation and execution failures are absorbed into the returned
/// outcome so sibling items stay unaffected. The hard errors are a missing
/// query string and a non-query operation on a GET request; the latter is a
/// protocol violation and is raised before execution can start.
#[tracing::instrument(skip_all, level = "debug")]
pub async fn execute_query_request<E>(
    executor: &E,
    params: &QueryParams,
    allow_only_query: bool,
    context: &Context,
) -> Result<ExecutionResult, HttpQueryError>
where
    E: SchemaExecutor,
{
    let query = params
        .query
        .as_deref()
        .filter(|query| !query.is_empty())
        .ok_or(HttpQueryError::MissingQuery)?;

    let document = match executor.parse(query) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(%error, "query failed to parse");
            return Ok(ExecutionResult::invalid(vec![error]));
        }
    };

    let validation_errors = executor.validate(&document);
    if !validation_errors.is_empty() {
        tracing::debug!(
            count = validation_errors.len(),
            "query failed validation"
        );
        return Ok(ExecutionResult::invalid(validation_errors));
    }

    if allow_only_query {
        if let Some(kind) = executor.operation_kind(&document, params.operation_name.as_deref()) {
            if kind != OperationKind::Query {
                return Err(HttpQueryError::InvalidOperation { kind });
            }
        }
    }

    let variables = params.variables.clone().unwrap_or_default();
    match executor
        .execute(
            &document,
            params.operation_name.as_deref(),
            &variables,
            context,
        )
        .await
    {
        Ok(response) => Ok(response.into()),
        Err(error) => {
            tracing::debug!(%error, "execution failed");
            Ok(ExecutionResult::invalid(vec![error]))
        }
    }
}
