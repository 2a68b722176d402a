//! HTTP client for the hosted content lake query API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{ContentStore, QueryParams, StoreError};
use crate::config::StoreConfig;

/// Query API client bound to one project and dataset
///
/// Performs no retries and no caching of its own; `use_cdn` only selects
/// which host answers the query.
pub struct SanityClient {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

/// Envelope returned by the query endpoint
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
    ms: Option<u64>,
}

impl SanityClient {
    /// Create a client from store configuration
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client with a preconfigured HTTP client
    pub fn with_client(config: &StoreConfig, client: reqwest::Client) -> Self {
        let endpoint = format!(
            "{}/v{}/data/query/{}",
            base_url(config),
            config.api_version.trim_start_matches('v'),
            config.dataset
        );
        Self {
            endpoint,
            token: config.token.clone(),
            client,
        }
    }

    /// Full query endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Base URL for the configured project, honoring `api_host` and `use_cdn`
fn base_url(config: &StoreConfig) -> String {
    match &config.api_host {
        Some(host) => host.trim_end_matches('/').to_string(),
        None => {
            let host = if config.use_cdn { "apicdn" } else { "api" };
            format!("https://{}.{}.sanity.io", config.project_id, host)
        }
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn query(&self, query: &str, params: &QueryParams) -> Result<Value, StoreError> {
        // Parameters travel JSON-encoded as `$name=<value>`
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params.iter() {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        let mut request = self.client.get(&self.endpoint).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Content store returned {}: {}", status, body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: QueryResponse = serde_json::from_slice(&bytes)?;
        if let Some(ms) = envelope.ms {
            tracing::debug!("Content store answered in {}ms", ms);
        }

        Ok(envelope.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_config(server: &MockServer) -> StoreConfig {
        StoreConfig {
            project_id: "proj".to_string(),
            api_host: Some(server.uri()),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_endpoint_hosts() {
        let mut config = StoreConfig::default();
        config.project_id = "abc".to_string();
        assert_eq!(
            SanityClient::new(&config).endpoint(),
            "https://abc.api.sanity.io/v2025-01-01/data/query/production"
        );

        config.use_cdn = true;
        config.api_version = "v2021-10-21".to_string();
        assert_eq!(
            SanityClient::new(&config).endpoint(),
            "https://abc.apicdn.sanity.io/v2021-10-21/data/query/production"
        );
    }

    #[tokio::test]
    async fn test_query_sends_json_encoded_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2025-01-01/data/query/production"))
            .and(query_param("$slug", "\"hello-world\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "*",
                "ms": 4,
                "result": { "title": "Hello" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SanityClient::new(&mock_config(&server));
        let params = QueryParams::new().with("slug", "hello-world");
        let result = client.query("*[slug.current == $slug][0]", &params).await.unwrap();

        assert_eq!(result["title"], "Hello");
    }

    #[tokio::test]
    async fn test_query_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = mock_config(&server);
        config.token = Some("secret".to_string());
        let result = SanityClient::new(&config)
            .query("*", &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(result, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_null_result_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": null })),
            )
            .mount(&server)
            .await;

        let result = SanityClient::new(&mock_config(&server))
            .query("*", &QueryParams::new())
            .await
            .unwrap();

        assert!(result.is_null());
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("query parse error"))
            .mount(&server)
            .await;

        let err = SanityClient::new(&mock_config(&server))
            .query("*[", &QueryParams::new())
            .await
            .unwrap_err();

        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("parse error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = SanityClient::new(&mock_config(&server))
            .query("*", &QueryParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = StoreConfig {
            api_host: Some("http://127.0.0.1:1".to_string()),
            ..StoreConfig::default()
        };
        let err = SanityClient::new(&config)
            .query("*", &QueryParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Transport(_)));
    }
}
