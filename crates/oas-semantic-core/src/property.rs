//! Property path resolution against a merged JSON-LD context.
//!
//! Given the output of [`crate::context::resolve_context`] and a property
//! path, computes the absolute ontology IRI of the field, its short name,
//! and any controlled-vocabulary base associated with `@id`-typed values.
//!
//! Resolution tries two cheap routes before full expansion: the fast paths
//! (`@id` / absolute URI last segments) and a quick walk through nested
//! `@context` objects that catches explicit `null` detachments and reserved
//! keywords early. Everything else goes through the expansion subset in
//! [`crate::expand`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SemanticError;
use crate::expand::{self, is_keyword};

/// Outcome of resolving one property path.
///
/// Invariants: a path resolving to a JSON-LD reserved keyword has
/// `field_uri == Some(field_name)`; a path explicitly mapped to `null` has
/// `field_uri == None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProperty {
    pub field_name: String,
    pub field_uri: Option<String>,
    pub vocabulary_uri: Option<String>,
}

/// Resolve a dotted property path against a merged context.
///
/// # Errors
///
/// - [`SemanticError::InvalidKeyword`] for an `@`-prefixed mapping that is
///   not a recognized JSON-LD keyword.
/// - [`SemanticError::NoResults`] when expansion produces nothing resolvable
///   (no `@vocab`, no prefix match).
/// - [`SemanticError::Expansion`] for IRI-syntax failures, logged distinctly
///   before being re-thrown.
pub fn resolve_property(
    merged_context: &Value,
    path: &[&str],
) -> Result<ResolvedProperty, SemanticError> {
    let Some(last) = path.last() else {
        return Err(SemanticError::NoResults);
    };

    // Fast paths: reserved identifier segments and absolute URIs resolve to
    // themselves without consulting the context.
    if last.starts_with("@id") || is_http_uri(last) {
        return Ok(ResolvedProperty {
            field_name: basename(last).to_string(),
            field_uri: Some((*last).to_string()),
            vocabulary_uri: None,
        });
    }

    let ctx = merged_context.get("@context").unwrap_or(merged_context);

    if let Some(root_scope) = ctx.as_object() {
        if let Some(resolved) = walk_context(root_scope, path)? {
            return Ok(resolved);
        }
    }

    expand_path(ctx, path)
}

/// Quick walk through nested `@context` objects.
///
/// Returns `Ok(Some(..))` when the walk can conclude on its own (explicit
/// `null`, reserved keyword leaf), `Ok(None)` when it exits early and full
/// expansion must decide.
fn walk_context(
    root_scope: &Map<String, Value>,
    path: &[&str],
) -> Result<Option<ResolvedProperty>, SemanticError> {
    let mut scope = root_scope;
    for (i, segment) in path.iter().enumerate() {
        let last_segment = i + 1 == path.len();
        match scope.get(*segment) {
            Some(Value::Null) => {
                return Ok(Some(ResolvedProperty {
                    field_name: (*segment).to_string(),
                    field_uri: None,
                    vocabulary_uri: None,
                }));
            }
            Some(Value::String(target)) if last_segment && target.starts_with('@') => {
                return if is_keyword(target) {
                    Ok(Some(ResolvedProperty {
                        field_name: target.clone(),
                        field_uri: Some(target.clone()),
                        vocabulary_uri: None,
                    }))
                } else {
                    Err(SemanticError::InvalidKeyword {
                        term: (*segment).to_string(),
                        keyword: target.clone(),
                    })
                };
            }
            Some(Value::Object(def)) if !last_segment => {
                // Descend only through an explicit nested context; anything
                // else (still being authored, plain term def) is for full
                // expansion to decide.
                match def.get("@context").and_then(Value::as_object) {
                    Some(inner) => scope = inner,
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        }
    }
    Ok(None)
}

/// Full-path resolution: build a minimal JSON-LD document nesting the path
/// as keys, expand it, and walk the expansion one property per level.
fn expand_path(ctx: &Value, path: &[&str]) -> Result<ResolvedProperty, SemanticError> {
    let mut nested = Value::String(String::new());
    for segment in path.iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert((*segment).to_string(), nested);
        nested = Value::Object(wrapper);
    }

    let mut doc = Map::new();
    doc.insert("@context".to_string(), ctx.clone());
    if let Value::Object(obj) = nested {
        doc.extend(obj);
    }

    let expanded = match expand::expand(&Value::Object(doc)) {
        Ok(expanded) => expanded,
        Err(err @ SemanticError::Expansion { .. }) => {
            // IRI/context syntax failures get their own log line; generic
            // resolution failures do not.
            tracing::error!(error = %err, "JSON-LD context parse failure");
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    let mut node = &expanded;
    let mut field_uri: Option<&str> = None;
    for _ in path {
        let obj = match node.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => return Err(SemanticError::NoResults),
        };
        let (key, value) = obj.iter().next().expect("object is non-empty");
        field_uri = Some(key);
        node = value;
    }
    let field_uri = field_uri.ok_or(SemanticError::NoResults)?;

    let vocabulary_uri = node
        .get("@id")
        .and_then(Value::as_str)
        .map(|id| id.strip_suffix('/').unwrap_or(id).to_string());

    Ok(ResolvedProperty {
        field_name: basename(field_uri).to_string(),
        field_uri: Some(field_uri.to_string()),
        vocabulary_uri,
    })
}

fn is_http_uri(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Last `/`-delimited segment (best-effort for `#`-terminated URIs).
fn basename(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}

// ===========================================================================
// Tests
// ===========================================================================
