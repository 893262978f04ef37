//! Placeholder substitution for prompt bodies.

use std::collections::HashMap;

use crate::types::{CaddyError, CaddyResult, Prompt};

/// Binding name that is substituted whether or not a prompt declares it.
pub const SELECTION: &str = "selection";

/// Values bound to parameter names for one render.
pub type Bindings = HashMap<String, String>;

/// Build the `{{name}}` token for a parameter.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Render a prompt body with the given bindings.
///
/// Parameters are visited in declaration order and the first required one
/// without a binding fails the render. Unbound optional placeholders are
/// left in the output as-is. A `selection` binding is applied last.
pub fn render(prompt: &Prompt, bindings: &Bindings) -> CaddyResult<String> {
    let mut text = prompt.body.clone();

    for param in &prompt.parameters {
        match bindings.get(&param.name) {
            Some(value) => text = text.replace(&placeholder(&param.name), value),
            None if param.required => {
                return Err(CaddyError::MissingParameter(param.name.clone()));
            }
            None => {}
        }
    }

    if let Some(selection) = bindings.get(SELECTION) {
        text = text.replace(&placeholder(SELECTION), selection);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::ParameterSpec;

    fn prompt(parameters: &[(&str, bool)], body: &str) -> Prompt {
        Prompt {
            id: "test".to_string(),
            title: String::new(),
            description: String::new(),
            version: String::new(),
            parameters: parameters
                .iter()
                .map(|(name, required)| ParameterSpec {
                    name: name.to_string(),
                    description: String::new(),
                    kind: "string".to_string(),
                    required: *required,
                })
                .collect(),
            body: body.to_string(),
            source: PathBuf::from("test.md"),
        }
    }

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_placeholder_token() {
        assert_eq!(placeholder("name"), "{{name}}");
    }

    #[test]
    fn test_render_required_parameter() {
        let p = prompt(&[("name", true)], "Hello {{name}}!");
        assert_eq!(render(&p, &bind(&[("name", "Ada")])).unwrap(), "Hello Ada!");
    }

    #[test]
    fn test_missing_required_parameter() {
        let p = prompt(&[("name", true)], "Hello {{name}}!");
        let err = render(&p, &Bindings::new()).unwrap_err();
        assert!(matches!(err, CaddyError::MissingParameter(ref n) if n == "name"));
        assert_eq!(err.to_string(), "required parameter missing: name");
    }

    #[test]
    fn test_first_missing_in_declaration_order() {
        let p = prompt(&[("a", false), ("b", true), ("c", true)], "{{a}}{{b}}{{c}}");
        let err = render(&p, &bind(&[("a", "1")])).unwrap_err();
        assert_eq!(err.to_string(), "required parameter missing: b");
    }

    #[test]
    fn test_unbound_optional_left_untouched() {
        let p = prompt(&[("tone", false)], "Say it {{tone}}.");
        assert_eq!(render(&p, &Bindings::new()).unwrap(), "Say it {{tone}}.");
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let p = prompt(&[("x", true)], "{{x}}-{{x}}-{{x}}");
        assert_eq!(render(&p, &bind(&[("x", "y")])).unwrap(), "y-y-y");
    }

    #[test]
    fn test_selection_without_declaration() {
        let p = prompt(&[], "Text: {{selection}}");
        assert_eq!(
            render(&p, &bind(&[("selection", "X")])).unwrap(),
            "Text: X"
        );
    }

    #[test]
    fn test_undeclared_bindings_ignored() {
        let p = prompt(&[], "{{other}}");
        assert_eq!(render(&p, &bind(&[("other", "x")])).unwrap(), "{{other}}");
    }

    #[test]
    fn test_substitution_follows_declaration_order() {
        let p = prompt(&[("a", true), ("b", true)], "{{a}} {{b}}");
        let out = render(&p, &bind(&[("a", "{{b}}"), ("b", "B")])).unwrap();
        assert_eq!(out, "B B");

        let p = prompt(&[("b", true), ("a", true)], "{{a}} {{b}}");
        let out = render(&p, &bind(&[("a", "{{b}}"), ("b", "B")])).unwrap();
        assert_eq!(out, "{{b}} B");
    }
}
