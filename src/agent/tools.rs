//! Tool definitions and implementations for the agent.

use crate::error::{Result, SnakkError};
use crate::model::ToolSpec;
use crate::search::{format_hits, WebSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name the model uses to call the web search tool.
pub const WEB_SEARCH: &str = "web_search";

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the web.
    WebSearch {
        query: String,
        #[serde(default)]
        max_results: Option<u32>,
    },
}

/// Tool execution context with access to the search backend.
pub struct ToolContext {
    pub search: Arc<dyn WebSearch>,
    /// Results per query when the model does not ask for a number.
    pub default_max_results: u32,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Arc<dyn WebSearch>, default_max_results: u32) -> Self {
        Self {
            search,
            default_max_results,
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::WebSearch { query, max_results } => {
                let limit = max_results.unwrap_or(self.default_max_results).clamp(1, 20);
                let hits = self.search.search(query, limit).await?;
                Ok(format_hits(query, &hits))
            }
        }
    }
}

/// Human-friendly name for a tool, used in progress notifications.
///
/// Unknown tools are shown by their raw identifier.
pub fn display_name(tool_name: &str) -> &str {
    match tool_name {
        WEB_SEARCH => "web search",
        other => other,
    }
}

/// Tool definitions offered to the model.
pub fn tool_definitions() -> Vec<ToolSpec> {
    vec![ToolSpec {
        name: WEB_SEARCH.to_string(),
        description: "Search the web for current or online information. \
            Use this for news, weather, prices, or anything you are not sure about."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results (default: 5)"
                }
            },
            "required": ["query"]
        }),
    }]
}

/// Parse a tool call from the model's name and JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| SnakkError::InvalidInput(format!("Invalid tool arguments: {}", e)))?;

    match name {
        WEB_SEARCH => {
            let query = args["query"]
                .as_str()
                .filter(|q| !q.trim().is_empty())
                .ok_or_else(|| SnakkError::InvalidInput("Missing 'query' argument".to_string()))?
                .to_string();
            let max_results = args["max_results"].as_u64().map(|n| n as u32);
            Ok(ToolCall::WebSearch { query, max_results })
        }
        _ => Err(SnakkError::InvalidInput(format!("Unknown tool: {}", name))),
    }
}
