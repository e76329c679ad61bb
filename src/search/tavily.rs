//! Tavily search API client.

use super::{SearchHit, WebSearch};
use crate::config::SearchSettings;
use crate::error::{Result, SnakkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Search backend using the Tavily REST API.
pub struct TavilySearch {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilySearch {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from settings, reading TAVILY_API_KEY when the key
    /// is not configured.
    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        let api_key = match &settings.api_key {
            Some(key) => key.clone(),
            None => std::env::var("TAVILY_API_KEY").map_err(|_| {
                SnakkError::Config(
                    "TAVILY_API_KEY not set. Set it with: export TAVILY_API_KEY='tvly-...'"
                        .to_string(),
                )
            })?,
        };

        Self::new(
            &settings.endpoint,
            &api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                max_results,
                search_depth: "basic",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SnakkError::Search(format!("{}: {}", status, body)));
        }

        let parsed: SearchResponse = response.json().await?;
        let mut hits = parsed.results;
        hits.truncate(max_results as usize);

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-test"))
            .and(body_partial_json(serde_json::json!({
                "query": "weather in Paris",
                "max_results": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "weather in Paris",
                "results": [
                    { "title": "Paris", "url": "https://a.example", "content": "Sunny", "score": 0.91 },
                    { "title": "France", "url": "https://b.example", "content": "Mild", "score": 0.55 }
                ],
                "response_time": 0.4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let search = TavilySearch::new(
            &format!("{}/search", server.uri()),
            "tvly-test",
            Duration::from_secs(5),
        )
        .unwrap();

        let hits = search.search("weather in Paris", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Paris");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_error_status_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let search = TavilySearch::new(
            &format!("{}/search", server.uri()),
            "tvly-test",
            Duration::from_secs(5),
        )
        .unwrap();

        let err = search.search("anything", 3).await.unwrap_err();
        assert!(matches!(err, SnakkError::Search(_)));
        assert!(err.is_retryable());
    }
}
