//! Model-backed cleanup

use async_trait::async_trait;
use std::sync::Arc;

use super::{chunk_text, TextCleaner};
use crate::error::DocsResult;
use crate::llm::ChatModel;

/// Cleans a page by sending fixed-size chunks to a hosted model
pub struct LlmCleaner {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    chunk_size: usize,
}

impl LlmCleaner {
    pub fn new(model: Arc<dyn ChatModel>, system_prompt: String, chunk_size: usize) -> Self {
        Self {
            model,
            system_prompt,
            chunk_size,
        }
    }
}

#[async_trait]
impl TextCleaner for LlmCleaner {
    fn name(&self) -> &str {
        "llm"
    }

    async fn clean(&self, raw: &str) -> DocsResult<String> {
        let chunks = chunk_text(raw, self.chunk_size);
        tracing::debug!(
            "Cleaning {} chars in {} chunks with {}",
            raw.chars().count(),
            chunks.len(),
            self.model.model()
        );

        // Chunks are sent one at a time; the first failure aborts the page.
        let mut cleaned = String::new();
        for chunk in chunks {
            let part = self.model.complete(&self.system_prompt, chunk).await?;
            cleaned.push_str(&part);
        }

        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocsError;
    use std::sync::Mutex;

    /// Returns the user message unchanged and records every call
    #[derive(Default)]
    struct EchoModel {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, system: &str, user: &str) -> DocsResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(user.to_string())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    /// Fails on the n-th call (0-based)
    struct FailingModel {
        fail_at: usize,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _system: &str, user: &str) -> DocsResult<String> {
            let mut calls = self.calls.lock().unwrap();
            let n = *calls;
            *calls += 1;
            if n == self.fail_at {
                Err(DocsError::CleanupModel("rate limited".to_string()))
            } else {
                Ok(user.to_uppercase())
            }
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_identity_model_round_trips_body() {
        let model = Arc::new(EchoModel::default());
        let cleaner = LlmCleaner::new(model.clone(), "strip html".to_string(), 4000);

        let body = "<html>".to_string() + &"x".repeat(9000) + "</html>";
        let cleaned = cleaner.clean(&body).await.unwrap();

        assert_eq!(cleaned, body);
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(system, _)| system == "strip html"));
    }

    #[tokio::test]
    async fn test_chunks_sent_in_order() {
        let model = Arc::new(EchoModel::default());
        let cleaner = LlmCleaner::new(model.clone(), "s".to_string(), 3);

        cleaner.clean("abcdefgh").await.unwrap();

        let users: Vec<String> = model
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, u)| u.clone())
            .collect();
        assert_eq!(users, vec!["abc", "def", "gh"]);
    }

    #[tokio::test]
    async fn test_empty_body_makes_no_calls() {
        let model = Arc::new(EchoModel::default());
        let cleaner = LlmCleaner::new(model.clone(), "s".to_string(), 4000);

        assert_eq!(cleaner.clean("").await.unwrap(), "");
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_aborts_page() {
        let model = Arc::new(FailingModel {
            fail_at: 1,
            calls: Mutex::new(0),
        });
        let cleaner = LlmCleaner::new(model.clone(), "s".to_string(), 2);

        let err = cleaner.clean("aabbcc").await.unwrap_err();
        assert!(matches!(err, DocsError::CleanupModel(_)));
        // No further chunks after the failing one
        assert_eq!(*model.calls.lock().unwrap(), 2);
    }
}
