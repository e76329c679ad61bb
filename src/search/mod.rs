//! Web search backends for the agent's search tool.

mod tavily;

pub use tavily::TavilySearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Snippet or extracted page content.
    pub content: String,
    /// Relevance score from the backend, higher is better.
    #[serde(default)]
    pub score: f32,
}

/// Trait for web search backends.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run a query and return at most `max_results` hits, best first.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>>;
}

/// Render hits as text for the model.
pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for '{}'.", query);
    }

    let formatted = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.content.chars().take(500).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Found {} results for '{}':\n\n{}", hits.len(), query, formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit {
            title: "Paris forecast".to_string(),
            url: "https://weather.example/paris".to_string(),
            content: "Sunny, 21°C".to_string(),
            score: 0.9,
        }];

        let text = format_hits("weather in Paris", &hits);
        assert!(text.starts_with("Found 1 results for 'weather in Paris'"));
        assert!(text.contains("1. Paris forecast"));
        assert!(text.contains("Sunny, 21°C"));
    }

    #[test]
    fn test_format_no_hits() {
        assert_eq!(format_hits("nothing", &[]), "No results found for 'nothing'.");
    }
}
