//! Transport-agnostic request pipeline for GraphQL-over-HTTP servers.
//!
//! This crate sits between a web framework and a GraphQL execution engine.
//! The transport layer hands it a request method, a raw body (one request or
//! a batch) and any query-string parameters; the pipeline validates the
//! transport constraints, extracts the query parameters for every item,
//! drives each item through parse → validate → execute against a
//! caller-supplied [`SchemaExecutor`], and aggregates the per-item outcomes
//! into a single HTTP-shaped response with the right status code.
//!
//! Language-level failures (syntax errors, validation errors, resolver
//! errors) never abort the request: they are captured per item as an
//! [`ExecutionResult`] so sibling batch items are unaffected. Request-level
//! violations (bad method, malformed body, disallowed batch, ...) are
//! [`HttpQueryError`]s carrying the status code and headers the transport
//! should return to the client.

mod context;
mod error;
mod http_query;
mod json_ext;
mod request;
mod response;
mod traits;

pub use context::*;
pub use error::*;
pub use http_query::*;
pub use json_ext::*;
pub use request::*;
pub use response::*;
pub use traits::*;

pub mod prelude {
    // NOTE: only traits can be added here! Everything else should be scoped under the module
    //       graphql so the user can use, for example:
    //        -  graphql::Request to get a GraphQL Request
    //        -  graphql::HttpResponse to get the aggregated response
    //        -  ...
    //
    //      This is because the user might work with HTTP requests alongside GraphQL requests so we
    //      thought it might be handy to have everything under the namespace "graphql" and let
    //      the user imports things explicitly if they prefer to.
    pub use crate::traits::*;
    pub mod graphql {
        pub use crate::*;
    }
}
