//! Content store access
//!
//! The store owns every post, author and category. This module only knows
//! how to send a query expression with named parameters and hand back
//! whatever the projection produced; result shapes belong to the callers.

mod client;
pub mod queries;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub use client::SanityClient;

/// Errors raised while talking to the content store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Content store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode content store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Named query parameters, substituted by the store (`$name` in the query)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Look up a parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up a string parameter
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Iterate parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A queryable content repository
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Execute a query and return the raw `result` value
    async fn query(&self, query: &str, params: &QueryParams) -> Result<Value, StoreError>;
}

/// Execute a query and deserialize the result into the caller's projection
pub async fn fetch<T: DeserializeOwned>(
    store: &dyn ContentStore,
    query: &str,
    params: &QueryParams,
) -> Result<T, StoreError> {
    let value = store.query(query, params).await?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct FixedStore(Value);

    #[async_trait]
    impl ContentStore for FixedStore {
        async fn query(&self, _query: &str, _params: &QueryParams) -> Result<Value, StoreError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        title: String,
    }

    #[test]
    fn test_query_params() {
        let params = QueryParams::new()
            .with("slug", "hello")
            .with("category", "Sport");
        assert_eq!(params.get_str("slug"), Some("hello"));
        assert_eq!(params.get_str("missing"), None);
        let names: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["category", "slug"]);
    }

    #[tokio::test]
    async fn test_fetch_typed_projection() {
        let store = FixedStore(serde_json::json!([{ "title": "A" }, { "title": "B" }]));
        let rows: Vec<Row> = fetch(&store, "*", &QueryParams::new()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].title, "B");
    }

    #[tokio::test]
    async fn test_fetch_shape_mismatch_is_decode_error() {
        let store = FixedStore(serde_json::json!({ "unexpected": true }));
        let result: Result<Vec<Row>, _> = fetch(&store, "*", &QueryParams::new()).await;
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
