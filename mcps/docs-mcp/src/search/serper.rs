//! Serper backend
//!
//! Implements the SearchBackend trait on top of the Serper Google search API.
//! See: https://serper.dev

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{SearchBackend, SearchHit, SearchOutcome};
use crate::config::SearchConfig;
use crate::error::{DocsError, DocsResult, Stage};

/// Serper backend
pub struct SerperBackend {
    client: Client,
    url: String,
    api_key: String,
    timeout_seconds: u64,
}

impl SerperBackend {
    pub fn new(config: &SearchConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> DocsError {
        if err.is_timeout() {
            DocsError::Timeout {
                stage: Stage::Search,
                seconds: self.timeout_seconds,
            }
        } else {
            DocsError::SearchProvider {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                body: err.to_string(),
            }
        }
    }
}

// Serper API request/response types
#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    link: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
}

#[async_trait]
impl SearchBackend for SerperBackend {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &str, num: usize) -> DocsResult<SearchOutcome> {
        tracing::debug!("Serper search: {} (num: {})", query, num);

        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest { q: query, num })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DocsError::SearchProvider { status, body });
        }

        let serper: SerperResponse = response.json().await.map_err(|e| self.transport_error(e))?;

        let hits: Vec<SearchHit> = serper
            .organic
            .into_iter()
            .take(num)
            .enumerate()
            .filter_map(|(i, r)| {
                let link = r.link.filter(|l| !l.trim().is_empty())?;
                Some(SearchHit {
                    rank: i + 1,
                    link,
                    title: r.title,
                    snippet: r.snippet,
                })
            })
            .collect();

        tracing::debug!("Serper returned {} usable hits", hits.len());
        Ok(SearchOutcome::from_hits(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer, timeout_seconds: u64) -> SearchConfig {
        SearchConfig {
            url: format!("{}/search", server.uri()),
            api_key: Some("test-key".to_string()),
            num_results: 2,
            timeout_seconds,
        }
    }

    #[tokio::test]
    async fn test_search_sends_query_and_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_json(serde_json::json!({
                "q": "site:docs.astral.sh/uv publish",
                "num": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "Publishing", "link": "https://docs.astral.sh/uv/guides/publish", "snippet": "uv publish"},
                    {"title": "CLI", "link": "https://docs.astral.sh/uv/reference/cli"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        let outcome = backend
            .search("site:docs.astral.sh/uv publish", 2)
            .await
            .unwrap();

        let SearchOutcome::Hits(hits) = outcome else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].rank, 1);
        assert_eq!(hits[0].link, "https://docs.astral.sh/uv/guides/publish");
        assert_eq!(hits[0].snippet.as_deref(), Some("uv publish"));
        assert_eq!(hits[1].link, "https://docs.astral.sh/uv/reference/cli");
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"link": "https://a.example/1"},
                    {"link": "https://a.example/2"},
                    {"link": "https://a.example/3"}
                ]
            })))
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        let SearchOutcome::Hits(hits) = backend.search("q", 2).await.unwrap() else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].link, "https://a.example/2");
    }

    #[tokio::test]
    async fn test_search_skips_entries_without_link() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "no link"},
                    {"link": "https://a.example/2"}
                ]
            })))
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        let SearchOutcome::Hits(hits) = backend.search("q", 2).await.unwrap() else {
            panic!("expected hits");
        };
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rank, 2);
    }

    #[tokio::test]
    async fn test_search_empty_organic_is_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": []
            })))
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        assert_eq!(
            backend.search("q", 2).await.unwrap(),
            SearchOutcome::NoResults
        );
    }

    #[tokio::test]
    async fn test_search_missing_organic_is_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "searchParameters": {"q": "q"}
            })))
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        assert_eq!(
            backend.search("q", 2).await.unwrap(),
            SearchOutcome::NoResults
        );
    }

    #[tokio::test]
    async fn test_search_provider_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Unauthorized."))
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 30)).unwrap();
        let err = backend.search("q", 2).await.unwrap_err();
        match err {
            DocsError::SearchProvider { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Unauthorized.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"organic": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let backend = SerperBackend::new(&test_config(&server, 1)).unwrap();
        let err = backend.search("q", 2).await.unwrap_err();
        assert!(matches!(
            err,
            DocsError::Timeout {
                stage: Stage::Search,
                seconds: 1
            }
        ));
    }
}
