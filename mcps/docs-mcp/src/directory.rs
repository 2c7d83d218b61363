//! Library directory
//!
//! Maps a library identifier to the root domain of its official docs and
//! builds the site-restricted search query for it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{DocsError, DocsResult};

/// Immutable mapping of library identifier to documentation domain
#[derive(Debug, Clone)]
pub struct LibraryDirectory {
    entries: BTreeMap<String, String>,
}

/// A single directory entry, as reported by `list_libraries`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LibraryEntry {
    pub library: String,
    pub domain: String,
}

impl LibraryDirectory {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Look up the documentation domain for a library
    pub fn domain(&self, library: &str) -> DocsResult<&str> {
        self.entries
            .get(library)
            .map(String::as_str)
            .ok_or_else(|| DocsError::UnsupportedLibrary {
                library: library.to_string(),
                supported: self.libraries(),
            })
    }

    /// Build `site:<domain> <query>` for a supported library
    pub fn site_query(&self, library: &str, query: &str) -> DocsResult<String> {
        let domain = self.domain(library)?;
        Ok(format!("site:{} {}", domain, query))
    }

    /// Supported library identifiers, sorted
    pub fn libraries(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<LibraryEntry> {
        self.entries
            .iter()
            .map(|(library, domain)| LibraryEntry {
                library: library.clone(),
                domain: domain.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LibraryDirectory {
    fn default() -> Self {
        Self::new(crate::config::default_libraries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_query_for_every_default_library() {
        let directory = LibraryDirectory::default();
        for entry in directory.entries() {
            let query = directory.site_query(&entry.library, "install").unwrap();
            assert_eq!(query, format!("site:{} install", entry.domain));
        }
    }

    #[test]
    fn test_site_query_uv() {
        let directory = LibraryDirectory::default();
        assert_eq!(
            directory
                .site_query("uv", "Publish a package with UV")
                .unwrap(),
            "site:docs.astral.sh/uv Publish a package with UV"
        );
    }

    #[test]
    fn test_unknown_library() {
        let directory = LibraryDirectory::default();
        let err = directory.site_query("django", "models").unwrap_err();
        match err {
            DocsError::UnsupportedLibrary { library, supported } => {
                assert_eq!(library, "django");
                assert_eq!(supported, vec!["langchain", "llama-index", "openai", "uv"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let directory = LibraryDirectory::default();
        assert!(directory.domain("UV").is_err());
    }

    #[test]
    fn test_entries_sorted() {
        let directory = LibraryDirectory::default();
        let names: Vec<_> = directory.entries().into_iter().map(|e| e.library).collect();
        assert_eq!(names, directory.libraries());
        assert_eq!(directory.len(), 4);
    }
}
