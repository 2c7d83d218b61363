//! Documentation query pipeline
//!
//! `get_docs` runs three stages:
//!
//! 1. Search: build `site:<domain> <query>` and ask the search backend for
//!    ranked links
//! 2. Fetch and clean: for each link, download the page and turn it into
//!    readable text with the configured [`TextCleaner`]
//! 3. Aggregate: label each page `SOURCE: <link>` and join them with a blank line
//!
//! Links are processed independently. A failed link is reported in a trailing
//! note instead of failing the whole call, unless every link failed.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use crate::clean::{build_cleaner, TextCleaner};
use crate::config::Config;
use crate::directory::LibraryDirectory;
use crate::error::{DocsError, DocsResult, SourceFailure};
use crate::fetch::{PageFetcher, PageSource};
use crate::search::{SearchBackend, SearchHit, SearchOutcome, SerperBackend};

/// Returned when the search provider has nothing for the query
pub const NO_RESULTS: &str = "No results found";

/// Upper bound for a caller-supplied result count
pub const MAX_RESULTS: usize = 10;

/// Cleaned text of one result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPage {
    pub link: String,
    pub text: String,
}

impl CleanedPage {
    /// `SOURCE: <link>` followed by the cleaned text
    pub fn labeled(&self) -> String {
        format!("SOURCE: {}\n{}", self.link, self.text)
    }
}

/// Join labeled pages, appending a note for links that failed
pub fn aggregate(pages: &[CleanedPage], failures: &[SourceFailure]) -> String {
    let mut parts: Vec<String> = pages.iter().map(CleanedPage::labeled).collect();

    if !failures.is_empty() {
        let links: Vec<&str> = failures.iter().map(|f| f.link.as_str()).collect();
        parts.push(format!("(Failed to retrieve: {})", links.join(", ")));
    }

    parts.join("\n\n")
}

/// The search -> fetch/clean -> aggregate pipeline behind the `get_docs` tool
pub struct DocsPipeline {
    directory: LibraryDirectory,
    search: Arc<dyn SearchBackend>,
    fetcher: Arc<dyn PageSource>,
    cleaner: Arc<dyn TextCleaner>,
    num_results: usize,
    max_concurrency: usize,
}

impl DocsPipeline {
    pub fn new(
        directory: LibraryDirectory,
        search: Arc<dyn SearchBackend>,
        fetcher: Arc<dyn PageSource>,
        cleaner: Arc<dyn TextCleaner>,
    ) -> Self {
        Self {
            directory,
            search,
            fetcher,
            cleaner,
            num_results: 2,
            max_concurrency: 2,
        }
    }

    /// Default number of results processed per call
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.clamp(1, MAX_RESULTS);
        self
    }

    /// Links fetched and cleaned at once; 1 is strictly sequential
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Build the production pipeline (Serper search, configured cleanup)
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let search: Arc<dyn SearchBackend> = Arc::new(SerperBackend::new(&config.search)?);
        let fetcher: Arc<dyn PageSource> = Arc::new(PageFetcher::new(&config.fetch)?);
        let cleaner = build_cleaner(config)?;

        Ok(Self::new(
            LibraryDirectory::new(config.libraries.clone()),
            search,
            fetcher,
            cleaner,
        )
        .with_num_results(config.search.num_results)
        .with_max_concurrency(config.fetch.max_concurrency))
    }

    pub fn directory(&self) -> &LibraryDirectory {
        &self.directory
    }

    pub fn cleaner_name(&self) -> &str {
        self.cleaner.name()
    }

    pub fn search_backend_name(&self) -> &str {
        self.search.name()
    }

    /// Search the docs of `library` for `query` with the configured result count
    pub async fn get_docs(&self, query: &str, library: &str) -> DocsResult<String> {
        self.get_docs_with_limit(query, library, None).await
    }

    /// Like [`get_docs`](Self::get_docs), optionally overriding the result count
    pub async fn get_docs_with_limit(
        &self,
        query: &str,
        library: &str,
        num_results: Option<usize>,
    ) -> DocsResult<String> {
        // Checked before any network call
        let site_query = self.directory.site_query(library, query)?;
        let num = num_results
            .map(|n| n.clamp(1, MAX_RESULTS))
            .unwrap_or(self.num_results);

        tracing::info!("get_docs: library={} query={:?} num={}", library, query, num);

        let hits = match self.search.search(&site_query, num).await? {
            SearchOutcome::NoResults => {
                tracing::info!("No results for {:?}", site_query);
                return Ok(NO_RESULTS.to_string());
            }
            SearchOutcome::Hits(hits) => hits,
        };

        let (pages, failures) = self.fetch_all(hits, num).await;

        if pages.is_empty() {
            if failures.is_empty() {
                return Ok(NO_RESULTS.to_string());
            }
            return Err(DocsError::AllSourcesFailed(failures));
        }

        Ok(aggregate(&pages, &failures))
    }

    /// Fetch and clean every hit, keeping rank order regardless of completion order
    async fn fetch_all(
        &self,
        hits: Vec<SearchHit>,
        num: usize,
    ) -> (Vec<CleanedPage>, Vec<SourceFailure>) {
        let results: Vec<(String, DocsResult<String>)> = stream::iter(hits.into_iter().take(num))
            .map(|hit| async move {
                let result = self.fetch_and_clean(&hit.link).await;
                (hit.link, result)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut pages = Vec::new();
        let mut failures = Vec::new();

        for (link, result) in results {
            match result {
                Ok(text) if text.is_empty() => {
                    tracing::debug!("Skipping {}: nothing left after cleanup", link);
                }
                Ok(text) => pages.push(CleanedPage { link, text }),
                Err(error) => {
                    tracing::warn!("Failed to retrieve {}: {}", link, error);
                    failures.push(SourceFailure { link, error });
                }
            }
        }

        (pages, failures)
    }

    /// Fetch one page and clean it
    pub async fn fetch_and_clean(&self, link: &str) -> DocsResult<String> {
        let raw = self.fetcher.fetch(link).await?;
        self.cleaner.clean(&raw).await
    }
}
