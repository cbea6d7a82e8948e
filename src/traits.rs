use crate::prelude::graphql::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an operation within a query document.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
            OperationKind::Subscription => f.write_str("subscription"),
        }
    }
}

/// The query engine the request pipeline drives.
///
/// The goal of this trait is to hide the implementation details of parsing,
/// validating and executing a query against a schema. The pipeline owns the
/// transport concerns and calls into an implementation of this trait for
/// everything language-level; a schema (and whatever resolvers it carries) is
/// captured by the implementor.
///
/// Error contract: [`parse`](SchemaExecutor::parse) and
/// [`execute`](SchemaExecutor::execute) failures, and non-empty
/// [`validate`](SchemaExecutor::validate) results, are soft: the pipeline
/// turns them into an invalid [`ExecutionResult`] for that item instead of
/// aborting the request.
#[async_trait]
pub trait SchemaExecutor: Send + Sync {
    /// The parsed form of a query document.
    type Document: Send + Sync;

    /// Parse the query text into a document.
    fn parse(&self, query: &str) -> Result<Self::Document, Error>;

    /// Validate a parsed document against the schema.
    ///
    /// An empty result means the document may be executed.
    fn validate(&self, document: &Self::Document) -> Vec<Error>;

    /// The kind of the operation that `operation_name` selects.
    ///
    /// Returns `None` when the document has no such operation; the GET
    /// method-policy check passes in that case.
    fn operation_kind(
        &self,
        document: &Self::Document,
        operation_name: Option<&str>,
    ) -> Option<OperationKind>;

    /// Execute a validated document and produce its data and field errors.
    ///
    /// May suspend on I/O while resolvers run. Returning `Err` marks the
    /// whole item invalid; field-level failures belong in
    /// [`Response::errors`] alongside the data that did resolve.
    #[must_use = "execution results must be used"]
    async fn execute(
        &self,
        document: &Self::Document,
        operation_name: Option<&str>,
        variables: &Object,
        context: &Context,
    ) -> Result<Response, Error>;
}
