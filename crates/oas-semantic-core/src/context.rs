//! JSON-LD context merging over JSON Schema trees.
//!
//! A schema may carry `x-jsonld-context` annotations at arbitrary depths.
//! [`resolve_context`] walks the tree depth-first and folds every annotation
//! into a single `{"@context": ...}` node for the whole model, so that a
//! property path can later be expanded against one merged context.
//!
//! Merging never mutates the input: every step builds new `Value` nodes.

use serde_json::{Map, Value};

/// Merge every `x-jsonld-context` annotation in `schema` into one context.
///
/// Returns `{"@context": {...}}`, or an empty object when the subtree carries
/// no annotation at all. The result is independent of the declaration order
/// of `x-jsonld-context` relative to `properties` in the source document.
pub fn resolve_context(schema: &Value) -> Value {
    let mut acc = Map::new();
    traverse_schema(schema, &mut acc);
    Value::Object(acc)
}

/// Depth-first accumulator walk.
///
/// Keys are visited in a fixed priority order regardless of source order:
/// `x-jsonld-context` first, then `properties`, then everything else as
/// transparent containers sharing the same accumulator.
fn traverse_schema(node: &Value, acc: &mut Map<String, Value>) {
    let obj = match node {
        Value::Object(obj) => obj,
        Value::Array(arr) => {
            for item in arr {
                traverse_schema(item, acc);
            }
            return;
        }
        _ => return,
    };

    if let Some(local) = obj.get("x-jsonld-context") {
        if !local.is_null() {
            // The annotation becomes the local context at this level. A string
            // value is an explicit remote context reference and is kept as-is;
            // property merging below leaves it untouched.
            acc.insert("@context".to_string(), local.clone());
        }
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, child) in props {
            let candidate = resolve_context(child);
            let empty = candidate.as_object().is_none_or(Map::is_empty);
            if empty {
                continue;
            }
            merge_property_context(acc, name, &candidate);
        }
    }

    for (key, value) in obj {
        if key == "x-jsonld-context" || key == "properties" {
            continue;
        }
        traverse_schema(value, acc);
    }
}

/// Fold a property's resolved sub-context into the accumulated `@context`.
///
/// Non-overwrite rules:
/// - an entry that is explicitly `null` stays detached and is never touched;
/// - an entry that already carries its own nested `@context` is never
///   replaced by a parent's candidate;
/// - a bare-string entry is promoted to `{"@id": ...}` so the existing IRI
///   link survives the merge.
fn merge_property_context(acc: &mut Map<String, Value>, name: &str, candidate: &Value) {
    let ctx = acc
        .entry("@context")
        .or_insert_with(|| Value::Object(Map::new()));
    let ctx_obj = match ctx.as_object_mut() {
        Some(obj) => obj,
        // Explicit remote context reference: not ours to merge into.
        None => return,
    };

    let base = match ctx_obj.get(name) {
        Some(Value::Null) => return,
        Some(Value::Object(existing)) if existing.contains_key("@context") => return,
        Some(Value::String(id)) => {
            let mut promoted = Map::new();
            promoted.insert("@id".to_string(), Value::String(id.clone()));
            Value::Object(promoted)
        }
        Some(existing) => existing.clone(),
        None => Value::Object(Map::new()),
    };

    ctx_obj.insert(name.to_string(), deep_merge(&base, candidate));
}

/// Whether a merged context produced by [`resolve_context`] carries any
/// usable mapping. An empty accumulated object does not; an explicit remote
/// context reference does.
pub fn has_context(merged: &Value) -> bool {
    match merged.get("@context") {
        Some(Value::Object(ctx)) => !ctx.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Recursive map union; `overlay` wins on leaf conflicts.
fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            let mut merged = base_obj.clone();
            for (key, value) in overlay_obj {
                let entry = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
