//! System prompt and tool definition sent with every conversation.

use flowbot_model::ToolDefinition;
use flowbot_rag::RETRIEVE_KNOWLEDGE;
use flowbot_rag::tool::{retrieve_knowledge_description, retrieve_knowledge_schema};

/// Default name the assistant introduces itself with.
pub const DEFAULT_ASSISTANT_NAME: &str = "FlowBot Assistant";

/// Render the system prompt for `assistant_name`.
pub fn system_prompt(assistant_name: &str) -> String {
    format!(
        "# Identity\n\
         You are {assistant_name}, an AI assistant that retrieves relevant information from the knowledge base.\n\n\
         # Instructions\n\
         ## PERSISTENCE\n\
         You are an agent. Keep working until the user's query is fully resolved. Only stop when you're sure the problem is solved.\n\
         ## TOOL CALLING\n\
         Use the {RETRIEVE_KNOWLEDGE} function to fetch relevant information from the knowledge base. Do NOT guess or hallucinate results. \
         If you need clarification to call the tool, ask the user.\n\
         ## PLANNING\n\
         Plan extensively: decide whether to call the function, reflect on results, then finalize the answer.\n\
         ## LANGUAGE\n\
         Respond in the same language as the user's input.\n"
    )
}

/// The `retrieve_knowledge` function as offered to the model.
pub fn retrieve_knowledge_tool(index_name: &str) -> ToolDefinition {
    ToolDefinition {
        name: RETRIEVE_KNOWLEDGE.to_string(),
        description: retrieve_knowledge_description(index_name),
        parameters: retrieve_knowledge_schema(),
        strict: true,
    }
}
