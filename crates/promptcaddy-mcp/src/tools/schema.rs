//! Input schemas synthesized from prompt parameters.

use serde_json::{json, Map, Value};

use promptcaddy::{Prompt, SELECTION};

const SELECTION_DESCRIPTION: &str = "The selected text or code to process";

/// Build the JSON object schema advertised for a prompt.
///
/// Every declared parameter becomes a property, plus an optional
/// `selection` string that is never required.
pub fn input_schema(prompt: &Prompt) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &prompt.parameters {
        if param.name == SELECTION {
            continue;
        }
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.kind,
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    properties.insert(
        SELECTION.to_string(),
        json!({
            "type": "string",
            "description": SELECTION_DESCRIPTION,
        }),
    );

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
