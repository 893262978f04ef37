//! Tool registration and dispatch. Every loaded prompt is exposed as a tool.

use serde_json::{Map, Value};

use promptcaddy::{render, Bindings, PromptStore};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::schema::input_schema;

pub struct ToolRegistry;

impl ToolRegistry {
    /// Describe every prompt in the store's current generation.
    pub fn list_tools(store: &PromptStore) -> Vec<ToolDefinition> {
        store
            .list()
            .iter()
            .map(|prompt| ToolDefinition {
                name: prompt.id.clone(),
                description: prompt.description.clone(),
                input_schema: input_schema(prompt),
            })
            .collect()
    }

    /// Render the named prompt with the supplied arguments.
    pub fn call(
        name: &str,
        arguments: Option<Map<String, Value>>,
        store: &PromptStore,
    ) -> McpResult<ToolCallResult> {
        let prompt = store
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let bindings = bindings_from_arguments(arguments.unwrap_or_default());
        let text = render(&prompt, &bindings).map_err(|e| McpError::Render(e.to_string()))?;

        Ok(ToolCallResult::text(text))
    }
}

/// Coerce tool arguments to text. Strings pass through; any other value
/// becomes its compact JSON form.
pub fn bindings_from_arguments(arguments: Map<String, Value>) -> Bindings {
    arguments
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}
