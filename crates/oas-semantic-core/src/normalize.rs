//! Ref normalization for resolved OpenAPI documents.
//!
//! A resolved document carries `$$ref` provenance markers naming where each
//! inlined schema came from. On export those markers must not leak external
//! dependency structure: refs under the exporting origin collapse back to
//! local JSON-Pointer `$ref`s, and genuinely remote refs are hoisted into
//! content-addressed `components.schemas` entries named
//! `<lastUrlSegment>-<hash>`, deduplicated by hash.

use serde_json::{Map, Value};

use crate::error::SemanticError;

/// Rewrite every `$$ref` in `doc` into a locally addressable `$ref`.
///
/// Deterministic (component insertion order is first-encountered order) and
/// idempotent: a document produced by this function contains no `$$ref`
/// markers, so a second pass returns it unchanged.
///
/// # Errors
///
/// [`SemanticError::MissingOrigin`] when `local_origin` is empty.
pub fn normalize_refs(doc: &Value, local_origin: &str) -> Result<Value, SemanticError> {
    if local_origin.is_empty() {
        return Err(SemanticError::MissingOrigin);
    }

    let mut additions: Vec<(String, Value)> = Vec::new();
    let mut normalized = rewrite(doc, local_origin, &mut additions);

    if !additions.is_empty() {
        let root = normalized.as_object_mut().ok_or_else(|| {
            SemanticError::Document("document root is not an object".to_string())
        })?;
        let components = root
            .entry("components")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(components) = components.as_object_mut() {
            let schemas = components
                .entry("schemas")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(schemas) = schemas.as_object_mut() {
                for (name, schema) in additions {
                    schemas.entry(name).or_insert(schema);
                }
            }
        }
    }

    Ok(normalized)
}

fn rewrite(node: &Value, origin: &str, additions: &mut Vec<(String, Value)>) -> Value {
    match node {
        Value::Object(obj) => {
            if let Some(url) = obj.get("$$ref").and_then(Value::as_str) {
                return rewrite_ref(url, obj, origin, additions);
            }
            let mut out = Map::new();
            for (key, value) in obj {
                out.insert(key.clone(), rewrite(value, origin, additions));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite(item, origin, additions))
                .collect(),
        ),
        _ => node.clone(),
    }
}

fn rewrite_ref(
    url: &str,
    obj: &Map<String, Value>,
    origin: &str,
    additions: &mut Vec<(String, Value)>,
) -> Value {
    // A ref under the exporting origin collapses to a bare local pointer.
    if let Some(rest) = url.strip_prefix(origin) {
        let pointer = if origin.ends_with('#') {
            format!("#{rest}")
        } else {
            rest.to_string()
        };
        let mut out = Map::new();
        out.insert("$ref".to_string(), Value::String(pointer));
        return Value::Object(out);
    }

    let hash = stable_hash(url);
    let prefix = url.rsplit('/').next().unwrap_or(url);
    let name = format!("{prefix}-{hash}");

    if !additions.iter().any(|(existing, _)| existing == &name) {
        // Reserve the slot before recursing so that components nested inside
        // this element register after it (first-encountered order).
        let index = additions.len();
        additions.push((name.clone(), Value::Null));
        let mut content = Map::new();
        for (key, value) in obj {
            if key != "$$ref" {
                content.insert(key.clone(), rewrite(value, origin, additions));
            }
        }
        additions[index].1 = Value::Object(content);
    }

    let mut out = Map::new();
    out.insert("x-ref".to_string(), Value::String(url.to_string()));
    out.insert(
        "$ref".to_string(),
        Value::String(format!("#/components/schemas/{name}")),
    );
    Value::Object(out)
}

/// Stable 128-bit fold of a string, hex-encoded to 32 characters.
///
/// Two FNV-1a passes (forward and reversed byte order) — a pure function of
/// the input, stable across runs and toolchains. Collision resistance only
/// needs to keep generated component names apart, not survive an adversary.
pub(crate) fn stable_hash(input: &str) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut forward = OFFSET;
    for byte in input.bytes() {
        forward ^= u64::from(byte);
        forward = forward.wrapping_mul(PRIME);
    }
    let mut backward = OFFSET;
    for byte in input.bytes().rev() {
        backward ^= u64::from(byte);
        backward = backward.wrapping_mul(PRIME);
    }
    format!("{forward:016x}{backward:016x}")
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ORIGIN: &str = "https://editor.example/#";

    #[test]
    fn test_empty_origin_is_rejected() {
        let err = normalize_refs(&json!({}), "").unwrap_err();
        assert!(matches!(err, SemanticError::MissingOrigin));
    }

    #[test]
    fn test_local_ref_collapses_to_bare_pointer() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Person": {
                        "type": "object",
                        "$$ref": "https://editor.example/#/components/schemas/Person"
                    }
                }
            }
        });
        let normalized = normalize_refs(&doc, ORIGIN).unwrap();
        assert_eq!(
            normalized["components"]["schemas"]["Person"],
            json!({ "$ref": "#/components/schemas/Person" })
        );
    }

    #[test]
    fn test_local_ref_with_origin_not_ending_in_hash() {
        let doc = json!({
            "a": { "$$ref": "https://editor.example/#/components/schemas/A", "type": "object" }
        });
        let normalized = normalize_refs(&doc, "https://editor.example/").unwrap();
        assert_eq!(
            normalized["a"],
            json!({ "$ref": "#/components/schemas/A" })
        );
    }

    #[test]
    fn test_remote_ref_is_hoisted_into_components() {
        let url = "https://schemas.example/defs.yaml#/Address";
        let doc = json!({
            "components": {
                "schemas": {
                    "Person": {
                        "type": "object",
                        "properties": {
                            "address": {
                                "type": "object",
                                "$$ref": url,
                                "properties": { "city": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        });
        let normalized = normalize_refs(&doc, ORIGIN).unwrap();

        let name = format!("Address-{}", stable_hash(url));
        let address = &normalized["components"]["schemas"]["Person"]["properties"]["address"];
        assert_eq!(address["x-ref"], json!(url));
        assert_eq!(
            address["$ref"],
            json!(format!("#/components/schemas/{name}"))
        );

        let hoisted = &normalized["components"]["schemas"][&name];
        assert_eq!(hoisted["type"], json!("object"));
        assert_eq!(hoisted["properties"]["city"]["type"], json!("string"));
        assert!(hoisted.get("$$ref").is_none());
    }

    #[test]
    fn test_identical_remote_refs_share_one_component() {
        let url = "https://schemas.example/defs.yaml#/Address";
        let doc = json!({
            "a": { "$$ref": url, "type": "object" },
            "b": { "$$ref": url, "type": "object" }
        });
        let normalized = normalize_refs(&doc, ORIGIN).unwrap();
        let schemas = normalized["components"]["schemas"].as_object().unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(normalized["a"], normalized["b"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Person": {
                        "type": "object",
                        "$$ref": "https://schemas.example/person.yaml#/Person"
                    }
                }
            }
        });
        let once = normalize_refs(&doc, ORIGIN).unwrap();
        let twice = normalize_refs(&once, ORIGIN).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_component_insertion_order_is_first_encountered() {
        let doc = json!({
            "first": { "$$ref": "https://schemas.example/a.yaml#/A", "type": "object" },
            "second": { "$$ref": "https://schemas.example/b.yaml#/B", "type": "object" }
        });
        let normalized = normalize_refs(&doc, ORIGIN).unwrap();
        let names: Vec<&String> = normalized["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert!(names[0].starts_with("A-"));
        assert!(names[1].starts_with("B-"));
    }

    #[test]
    fn test_nested_remote_ref_registers_after_parent() {
        let doc = json!({
            "root": {
                "$$ref": "https://schemas.example/outer.yaml#/Outer",
                "type": "object",
                "properties": {
                    "inner": {
                        "$$ref": "https://schemas.example/inner.yaml#/Inner",
                        "type": "string"
                    }
                }
            }
        });
        let normalized = normalize_refs(&doc, ORIGIN).unwrap();
        let names: Vec<&String> = normalized["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert!(names[0].starts_with("Outer-"));
        assert!(names[1].starts_with("Inner-"));
    }

    #[test]
    fn test_stable_hash_is_deterministic_and_fixed_length() {
        let a = stable_hash("https://schemas.example/defs.yaml#/Address");
        let b = stable_hash("https://schemas.example/defs.yaml#/Address");
        let c = stable_hash("https://schemas.example/defs.yaml#/Person");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
