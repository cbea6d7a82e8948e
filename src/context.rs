//! Provide a [`Context`] for the execution seam of the request pipeline.
//!
//! Transport integrations put opaque execution options (context value, root
//! value, hooks, ...) into a [`Context`] and the pipeline hands it through to
//! the [`SchemaExecutor`](crate::SchemaExecutor) unchanged. During a request
//! the context is shared read-only across all concurrent batch items.

use crate::prelude::graphql::*;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Holds [`Context`] entries.
pub type Entries = Arc<DashMap<String, Value>>;

/// Opaque per-request options handed through to the schema executor.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Entries,
}

impl Context {
    pub fn new() -> Self {
        Context {
            entries: Default::default(),
        }
    }

    pub fn get<K, V>(&self, key: K) -> Result<Option<V>, serde_json::Error>
    where
        K: Into<String>,
        V: for<'de> serde::Deserialize<'de>,
    {
        self.entries
            .get(&key.into())
            .map(|v| serde_json::from_value(v.value().clone()))
            .transpose()
    }

    pub fn insert<K, V>(&self, key: K, value: V) -> Result<Option<V>, serde_json::Error>
    where
        K: Into<String>,
        V: for<'de> serde::Deserialize<'de> + Serialize,
    {
        let value = serde_json::to_value(value)?;
        self.entries
            .insert(key.into(), value)
            .map(serde_json::from_value)
            .transpose()
    }
}

#[cfg(test)]
mod test {
    use crate::Context;

    #[test]
    fn test_context_insert() {
        let c = Context::new();
        assert!(c.insert("key1", 1).is_ok());
        assert_eq!(c.get("key1").unwrap(), Some(1));
    }

    #[test]
    fn test_context_overwrite() {
        let c = Context::new();
        assert!(c.insert("overwrite", 2).is_ok());
        assert!(c.insert("overwrite", 3).is_ok());
        assert_eq!(c.get("overwrite").unwrap(), Some(3));
    }

    #[test]
    fn test_context_missing_key() {
        let c = Context::new();
        assert_eq!(c.get::<_, i32>("absent").unwrap(), None);
    }
}
