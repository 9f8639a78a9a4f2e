//! The `retrieve_knowledge` tool offered to the chat model.
//!
//! [`retrieve_knowledge_schema`] describes the function to the model and
//! [`RetrieveKnowledgeArgs::parse`] validates the argument payload the model
//! sends back.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ToolArgumentError;

/// Name of the retrieval function exposed to the model.
pub const RETRIEVE_KNOWLEDGE: &str = "retrieve_knowledge";

/// Arguments of a `retrieve_knowledge` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveKnowledgeArgs {
    /// The search query to run against the knowledge base.
    pub query: String,
}

impl RetrieveKnowledgeArgs {
    /// Parse the raw JSON argument string of a tool call.
    ///
    /// # Errors
    ///
    /// - [`ToolArgumentError::Malformed`] for invalid JSON, a non-object
    ///   payload, or unexpected fields.
    /// - [`ToolArgumentError::MissingQuery`] when `query` is absent or not a
    ///   string.
    /// - [`ToolArgumentError::EmptyQuery`] when `query` is blank.
    pub fn parse(arguments: &str) -> Result<Self, ToolArgumentError> {
        let value: Value = serde_json::from_str(arguments)
            .map_err(|e| ToolArgumentError::Malformed(e.to_string()))?;
        let Value::Object(map) = &value else {
            return Err(ToolArgumentError::Malformed("expected a JSON object".to_string()));
        };
        if !map.get("query").is_some_and(Value::is_string) {
            return Err(ToolArgumentError::MissingQuery);
        }
        let args: Self = serde_json::from_value(value)
            .map_err(|e| ToolArgumentError::Malformed(e.to_string()))?;
        if args.query.trim().is_empty() {
            return Err(ToolArgumentError::EmptyQuery);
        }
        Ok(args)
    }
}

/// Human-readable description of the tool for the given index.
pub fn retrieve_knowledge_description(index_name: &str) -> String {
    format!(
        "Search the knowledge base for relevant information based on a user query. \
         This tool retrieves the most relevant information from the {index_name} index."
    )
}

/// JSON schema of the tool parameters.
///
/// Strict: `query` is required and no other property is accepted.
pub fn retrieve_knowledge_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query to find relevant information in the knowledge base."
            }
        },
        "required": ["query"],
        "additionalProperties": false
    })
}
