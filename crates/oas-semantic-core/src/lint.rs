//! Batch semantic diagnostics over a whole document.
//!
//! Unlike scoring, where a single bad property aborts the run, validation
//! collects every per-property resolution failure and keeps going, so an
//! editor can show all problems at once.

use serde::Serialize;
use serde_json::Value;

use crate::context::{has_context, resolve_context};
use crate::property::resolve_property;
use crate::schema_utils::build_path;

/// One non-fatal semantic problem, anchored to a JSON Pointer path.
#[derive(Debug, Clone, Serialize)]
pub struct SpecError {
    pub path: String,
    pub message: String,
}

/// Collect per-property resolution failures across all object-typed
/// component schemas that carry a usable merged context.
pub fn lint_document(doc: &Value) -> Vec<SpecError> {
    let mut errors = Vec::new();

    let Some(schemas) = doc
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    else {
        errors.push(SpecError {
            path: "#/components".to_string(),
            message: "No #/components/schemas models provided".to_string(),
        });
        return errors;
    };

    for (name, schema) in schemas {
        if schema.get("type").and_then(Value::as_str) != Some("object") {
            continue;
        }
        let merged = resolve_context(schema);
        if !has_context(&merged) {
            continue;
        }
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            continue;
        };
        for property in properties.keys() {
            if let Err(error) = resolve_property(&merged, &[property.as_str()]) {
                errors.push(SpecError {
                    path: build_path(
                        "#",
                        &["components", "schemas", name, "properties", property.as_str()],
                    ),
                    message: error.to_string(),
                });
            }
        }
    }

    errors
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_schemas_is_one_error() {
        let errors = lint_document(&json!({ "openapi": "3.0.2" }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "No #/components/schemas models provided");
    }

    #[test]
    fn test_clean_document_has_no_errors() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Person": {
                        "type": "object",
                        "x-jsonld-context": { "@vocab": "https://example.org/onto/" },
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }
        });
        assert!(lint_document(&doc).is_empty());
    }

    #[test]
    fn test_failures_are_collected_not_fatal() {
        // Two models, each with one unresolvable property: both reported.
        let doc = json!({
            "components": {
                "schemas": {
                    "A": {
                        "type": "object",
                        "x-jsonld-context": { "@base": "https://example.org/" },
                        "properties": { "first": { "type": "string" } }
                    },
                    "B": {
                        "type": "object",
                        "x-jsonld-context": { "id": "@identifier" },
                        "properties": { "id": { "type": "string" } }
                    }
                }
            }
        });
        let errors = lint_document(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "#/components/schemas/A/properties/first");
        assert!(errors[1].message.contains("@identifier"));
    }

    #[test]
    fn test_models_without_context_are_skipped() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Bare": {
                        "type": "object",
                        "properties": { "anything": { "type": "string" } }
                    }
                }
            }
        });
        assert!(lint_document(&doc).is_empty());
    }
}
