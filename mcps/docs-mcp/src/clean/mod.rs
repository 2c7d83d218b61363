//! Text cleanup strategies
//!
//! Turns a raw page body into readable text. Two interchangeable
//! implementations of [`TextCleaner`] exist:
//!
//! - [`LlmCleaner`]: splits the body with [`chunk_text`] and sends each chunk
//!   to a hosted model, concatenating the outputs in order
//! - [`LocalExtractor`]: parses the HTML and keeps the main readable text,
//!   without any network call

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{CleanupStrategy, Config};
use crate::error::DocsResult;
use crate::llm::OpenAiCompatClient;

pub mod llm;
pub mod local;

pub use llm::LlmCleaner;
pub use local::LocalExtractor;

/// Trait for page cleanup strategies
#[async_trait]
pub trait TextCleaner: Send + Sync {
    /// Get the name of this strategy
    fn name(&self) -> &str;

    /// Clean one page body. Failure aborts the whole page.
    async fn clean(&self, raw: &str) -> DocsResult<String>;
}

/// Split `text` into contiguous chunks of `size` characters
///
/// Only the last chunk may be shorter. Chunks never split a UTF-8 sequence
/// and concatenating them reproduces `text` exactly. An empty input yields
/// no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Build the cleaner selected by `cleanup.strategy`
pub fn build_cleaner(config: &Config) -> reqwest::Result<Arc<dyn TextCleaner>> {
    let cleaner: Arc<dyn TextCleaner> = match config.cleanup.strategy {
        CleanupStrategy::Llm => {
            let model = Arc::new(OpenAiCompatClient::new(&config.llm)?);
            Arc::new(LlmCleaner::new(
                model,
                config.llm.system_prompt.clone(),
                config.cleanup.chunk_size,
            ))
        }
        CleanupStrategy::Local => Arc::new(LocalExtractor::new()),
    };

    tracing::info!("Using {} cleanup strategy", cleaner.name());
    Ok(cleaner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_is_ceiling() {
        for len in [1usize, 3999, 4000, 4001, 8000, 10_500] {
            let text = "a".repeat(len);
            let chunks = chunk_text(&text, 4000);
            assert_eq!(chunks.len(), len.div_ceil(4000), "len {}", len);
        }
    }

    #[test]
    fn test_chunks_are_full_except_last() {
        let text: String = (0..10_500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 4000);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4000);
        assert_eq!(chunks[1].len(), 4000);
        assert_eq!(chunks[2].len(), 2500);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(chunk_text("", 4000).is_empty());
    }

    #[test]
    fn test_chunks_count_characters_not_bytes() {
        let text = "é".repeat(5);
        let chunks = chunk_text(&text, 2);

        assert_eq!(chunks, vec!["éé", "éé", "é"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_mixed_width_round_trip() {
        let text = "docs: 日本語 ✓ uv publish 🚀 end".repeat(37);
        for size in [1, 3, 7, 64, 4000] {
            let chunks = chunk_text(&text, size);
            assert_eq!(chunks.concat(), text);
            let (last, full) = chunks.split_last().unwrap();
            assert!(full.iter().all(|c| c.chars().count() == size));
            assert!(last.chars().count() <= size);
        }
    }

    #[test]
    fn test_build_cleaner_follows_strategy() {
        let mut config = Config::default();
        config.cleanup.strategy = CleanupStrategy::Local;
        assert_eq!(build_cleaner(&config).unwrap().name(), "local");

        config.cleanup.strategy = CleanupStrategy::Llm;
        assert_eq!(build_cleaner(&config).unwrap().name(), "llm");
    }
}
