//! Context retrieval for Helpdesk
//!
//! The knowledge base lives behind a vector index that Helpdesk does not
//! manage. This module defines the seam the router talks to and the two
//! backends shipped with the binary.

pub mod http;

pub use http::HttpRetriever;

use crate::config::RetrieverConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Placeholder inserted into prompts when nothing relevant was found
pub const NO_CONTEXT_PLACEHOLDER: &str = "(no relevant documents found)";

/// A ranked text chunk returned by a retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Chunk text
    pub text: String,
    /// Relevance score, higher is better
    pub score: f32,
}

impl Passage {
    /// Create a passage
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Source of context passages for a query
///
/// # Examples
///
/// ```
/// use helpdesk::retrieval::{ContextRetriever, EmptyRetriever};
///
/// # async fn example() -> helpdesk::error::Result<()> {
/// let passages = EmptyRetriever.retrieve("reset password", 2).await?;
/// assert!(passages.is_empty());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Return up to `top_k` passages ranked by descending score
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Retrieval` if the backend cannot be queried
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>>;
}

/// Retriever with no knowledge base behind it
///
/// Answers then rely on the model alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRetriever;

#[async_trait]
impl ContextRetriever for EmptyRetriever {
    async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<Passage>> {
        Ok(Vec::new())
    }
}

/// Sort passages by descending score and keep the best `top_k`
///
/// NaN scores sort last.
///
/// # Examples
///
/// ```
/// use helpdesk::retrieval::{rank_passages, Passage};
///
/// let ranked = rank_passages(
///     vec![Passage::new("b", 0.2), Passage::new("a", 0.9), Passage::new("c", 0.5)],
///     2,
/// );
/// assert_eq!(ranked[0].text, "a");
/// assert_eq!(ranked.len(), 2);
/// ```
pub fn rank_passages(mut passages: Vec<Passage>, top_k: usize) -> Vec<Passage> {
    passages.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    });
    passages.truncate(top_k);
    passages
}

/// Join passage texts into a single context block
pub fn format_context(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }
    passages
        .iter()
        .map(|p| p.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the retriever described by the configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be created
pub fn create_retriever(config: &RetrieverConfig) -> Result<Arc<dyn ContextRetriever>> {
    match &config.endpoint {
        Some(endpoint) => Ok(Arc::new(HttpRetriever::new(endpoint.clone())?)),
        None => {
            tracing::info!("No retriever endpoint configured, answering without documents");
            Ok(Arc::new(EmptyRetriever))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_passages_sorts_descending_and_truncates() {
        let ranked = rank_passages(
            vec![
                Passage::new("low", 0.1),
                Passage::new("high", 0.8),
                Passage::new("mid", 0.4),
            ],
            2,
        );
        let texts: Vec<_> = ranked.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid"]);
    }

    #[test]
    fn test_rank_passages_nan_last() {
        let ranked = rank_passages(
            vec![Passage::new("nan", f32::NAN), Passage::new("ok", 0.0)],
            5,
        );
        assert_eq!(ranked[0].text, "ok");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), NO_CONTEXT_PLACEHOLDER);
    }

    #[test]
    fn test_format_context_joins_with_blank_line() {
        let passages = vec![Passage::new(" first \n", 0.9), Passage::new("second", 0.5)];
        assert_eq!(format_context(&passages), "first\n\nsecond");
    }

    #[tokio::test]
    async fn test_empty_retriever() {
        let passages = EmptyRetriever.retrieve("anything", 3).await.unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_create_retriever_without_endpoint() {
        assert!(create_retriever(&RetrieverConfig::default()).is_ok());
    }
}
