//! Search backend implementations
//!
//! A [`SearchBackend`] turns a site-scoped query into ranked result links.
//! Serper (Google results over a JSON API) is the provider used in production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DocsResult;

pub mod serper;

pub use serper::SerperBackend;

/// A single ranked search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// 1-based rank as returned by the provider
    pub rank: usize,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Outcome of a search: either ranked hits or nothing at all
///
/// An empty result set is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Hits(Vec<SearchHit>),
    NoResults,
}

impl SearchOutcome {
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Hits(hits)
        }
    }
}

/// Trait for search backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Run `query` and return at most `num` hits in provider rank order
    async fn search(&self, query: &str, num: usize) -> DocsResult<SearchOutcome>;
}
