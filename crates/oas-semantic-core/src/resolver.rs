//! Document `$ref` resolution seam.
//!
//! The score calculator treats `$ref` resolution as an external collaborator
//! behind [`DocumentResolver`]. The bundled [`LocalResolver`] inlines local
//! JSON-Pointer refs (`#/...`) cycle-safely and annotates every inlined node
//! with a `$$ref` provenance marker so the normalizer can later rewrite it;
//! remote URL refs are reported as resolution errors rather than fetched.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Result of resolving a document: the resolved tree plus any errors the
/// resolver encountered. Callers must treat a non-empty `errors` as fatal.
#[derive(Debug, Clone)]
pub struct ResolvedSpec {
    pub spec: Value,
    pub errors: Vec<String>,
}

/// Collaborator that resolves every `$ref` in an OpenAPI document.
#[async_trait]
pub trait DocumentResolver: Send + Sync {
    async fn resolve(&self, spec: &Value) -> ResolvedSpec;
}

/// Resolver for self-contained documents.
///
/// Inlines `#/...` JSON-Pointer refs by copying the target in place of the
/// referencing node. Each inlined node gains a `$$ref` marker of
/// `<base><pointer>` (the browser editor uses its own location as `base`;
/// an empty base leaves bare pointers, which normalize against an origin of
/// `"#"`). The root of the resolved tree is stamped `$$normalized`.
///
/// Cycles are left as unresolved `$ref` nodes rather than expanded forever;
/// `max_depth` bounds pathological nesting.
pub struct LocalResolver {
    base: String,
    max_depth: usize,
}

impl LocalResolver {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            max_depth: 50,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn inline(
        &self,
        node: &Value,
        root: &Value,
        stack: &mut Vec<String>,
        errors: &mut Vec<String>,
    ) -> Value {
        if stack.len() > self.max_depth {
            errors.push(format!(
                "$ref nesting exceeded max depth {} at {}",
                self.max_depth,
                stack.last().map_or("#", String::as_str)
            ));
            return node.clone();
        }

        match node {
            Value::Object(obj) => {
                if let Some(ref_str) = obj.get("$ref").and_then(Value::as_str) {
                    return self.inline_ref(ref_str, root, stack, errors);
                }
                let mut out = Map::new();
                for (key, value) in obj {
                    out.insert(key.clone(), self.inline(value, root, stack, errors));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.inline(item, root, stack, errors))
                    .collect(),
            ),
            _ => node.clone(),
        }
    }

    fn inline_ref(
        &self,
        ref_str: &str,
        root: &Value,
        stack: &mut Vec<String>,
        errors: &mut Vec<String>,
    ) -> Value {
        if ref_str != "#" && !ref_str.starts_with("#/") {
            errors.push(format!("Remote $ref not resolvable locally: {ref_str}"));
            return Value::Object(Map::from_iter([(
                "$ref".to_string(),
                Value::String(ref_str.to_string()),
            )]));
        }

        // Cycle: leave the ref in place for the caller to decide.
        if stack.iter().any(|seen| seen == ref_str) {
            return Value::Object(Map::from_iter([(
                "$ref".to_string(),
                Value::String(ref_str.to_string()),
            )]));
        }

        match root.pointer(&ref_str[1..]) {
            Some(target) => {
                stack.push(ref_str.to_string());
                let mut inlined = self.inline(target, root, stack, errors);
                stack.pop();
                if let Some(obj) = inlined.as_object_mut() {
                    obj.insert(
                        "$$ref".to_string(),
                        Value::String(format!("{}{ref_str}", self.base)),
                    );
                }
                inlined
            }
            None => {
                errors.push(format!("Unresolvable $ref: {ref_str}"));
                Value::Object(Map::from_iter([(
                    "$ref".to_string(),
                    Value::String(ref_str.to_string()),
                )]))
            }
        }
    }
}

#[async_trait]
impl DocumentResolver for LocalResolver {
    async fn resolve(&self, spec: &Value) -> ResolvedSpec {
        let mut errors = Vec::new();
        let mut stack = Vec::new();
        let mut resolved = self.inline(spec, spec, &mut stack, &mut errors);
        if let Some(obj) = resolved.as_object_mut() {
            obj.insert("$$normalized".to_string(), Value::Bool(true));
        }
        ResolvedSpec {
            spec: resolved,
            errors,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn resolve(spec: &Value) -> ResolvedSpec {
        LocalResolver::new("").resolve(spec).await
    }

    #[tokio::test]
    async fn test_local_ref_is_inlined_with_marker() {
        let spec = json!({
            "components": {
                "schemas": {
                    "Person": {
                        "type": "object",
                        "properties": {
                            "address": { "$ref": "#/components/schemas/Address" }
                        }
                    },
                    "Address": { "type": "object" }
                }
            }
        });
        let resolved = resolve(&spec).await;
        assert!(resolved.errors.is_empty());
        let address =
            &resolved.spec["components"]["schemas"]["Person"]["properties"]["address"];
        assert_eq!(address["type"], json!("object"));
        assert_eq!(address["$$ref"], json!("#/components/schemas/Address"));
    }

    #[tokio::test]
    async fn test_base_prefixes_the_marker() {
        let spec = json!({
            "components": {
                "schemas": {
                    "A": { "$ref": "#/components/schemas/B" },
                    "B": { "type": "string" }
                }
            }
        });
        let resolver = LocalResolver::new("https://editor.example/");
        let resolved = resolver.resolve(&spec).await;
        assert_eq!(
            resolved.spec["components"]["schemas"]["A"]["$$ref"],
            json!("https://editor.example/#/components/schemas/B")
        );
    }

    #[tokio::test]
    async fn test_root_is_stamped_normalized() {
        let resolved = resolve(&json!({ "openapi": "3.0.2" })).await;
        assert_eq!(resolved.spec["$$normalized"], json!(true));
    }

    #[tokio::test]
    async fn test_cyclic_ref_is_left_in_place() {
        let spec = json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "next": { "$ref": "#/components/schemas/Node" }
                        }
                    }
                }
            }
        });
        let resolved = resolve(&spec).await;
        assert!(resolved.errors.is_empty());
        let next = &resolved.spec["components"]["schemas"]["Node"]["properties"]["next"]
            ["properties"]["next"];
        assert_eq!(next["$ref"], json!("#/components/schemas/Node"));
    }

    #[tokio::test]
    async fn test_remote_ref_is_an_error() {
        let spec = json!({
            "components": {
                "schemas": {
                    "A": { "$ref": "https://example.org/defs.json#/A" }
                }
            }
        });
        let resolved = resolve(&spec).await;
        assert_eq!(resolved.errors.len(), 1);
        assert!(resolved.errors[0].contains("Remote $ref"));
    }

    #[tokio::test]
    async fn test_unresolvable_pointer_is_an_error() {
        let spec = json!({
            "components": {
                "schemas": {
                    "A": { "$ref": "#/components/schemas/Missing" }
                }
            }
        });
        let resolved = resolve(&spec).await;
        assert_eq!(resolved.errors.len(), 1);
        assert!(resolved.errors[0].contains("Unresolvable"));
    }
}
