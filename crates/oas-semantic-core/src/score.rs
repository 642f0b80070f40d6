//! Whole-document semantic scoring.
//!
//! Orchestrates the context merger and property resolver across every
//! object-typed component schema, verifies ontology URIs through the SPARQL
//! count oracle, and annotates the resolved document with per-model and
//! document-level scores.

use chrono::Utc;
use serde_json::{Map, Number, Value};

use crate::context::{has_context, resolve_context};
use crate::error::SemanticError;
use crate::property::resolve_property;
use crate::resolver::DocumentResolver;
use crate::schema_utils::escape_pointer_segment;
use crate::sparql::SparqlClient;

/// Result of a scoring run: the annotated resolved document and the
/// document-level score.
#[derive(Debug)]
pub struct ScoreOutcome {
    pub document: Value,
    pub score: f64,
}

/// Score the semantic annotation quality of an OpenAPI document.
///
/// The document is first resolved through `resolver`; resolution errors are
/// fatal. Each `type: "object"` schema under `components.schemas` is scored
/// over its top-level property names: properties resolving to JSON-LD
/// keywords are trivially valid, ontology URIs are verified in one batched
/// SPARQL query per model, and the model score is
/// `(valid + verified) / declared`. The document score is the mean over all
/// object-typed models, rounded to two decimals.
///
/// A SPARQL failure is not an error: the affected URIs score as zero
/// matches and the calculation continues.
///
/// # Errors
///
/// - [`SemanticError::Resolution`] when the resolver reports errors.
/// - [`SemanticError::NoSchemas`] when `components.schemas` is absent or
///   empty.
/// - Any property-resolution error from [`resolve_property`] aborts the
///   scoring call.
pub async fn calculate_semantic_score(
    doc: &Value,
    resolver: &dyn DocumentResolver,
    sparql: &dyn SparqlClient,
) -> Result<ScoreOutcome, SemanticError> {
    let resolved = resolver.resolve(doc).await;
    if !resolved.errors.is_empty() {
        return Err(SemanticError::Resolution(resolved.errors.join("; ")));
    }
    let mut document = resolved.spec;
    if let Some(root) = document.as_object_mut() {
        root.remove("$$normalized");
    }

    let schema_names: Vec<String> = match document
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    {
        Some(schemas) if !schemas.is_empty() => schemas.keys().cloned().collect(),
        _ => return Err(SemanticError::NoSchemas),
    };

    let mut object_scores = Vec::new();
    for name in &schema_names {
        let pointer = format!("/components/schemas/{}", escape_pointer_segment(name));
        let Some(schema) = document.pointer(&pointer).cloned() else {
            continue;
        };
        let model_score = score_model(name, &schema, sparql).await?;
        if let Some(slot) = document.pointer_mut(&pointer).and_then(Value::as_object_mut) {
            slot.insert(
                "x-semantic-score".to_string(),
                number(model_score.unwrap_or(0.0)),
            );
        }
        if let Some(score) = model_score {
            object_scores.push(score);
        }
    }

    let mean = if object_scores.is_empty() {
        0.0
    } else {
        object_scores.iter().sum::<f64>() / object_scores.len() as f64
    };
    let score = (mean * 100.0).round() / 100.0;

    let root = document.as_object_mut().ok_or_else(|| {
        SemanticError::Document("document root is not an object".to_string())
    })?;
    let info = root
        .entry("info")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(info) = info.as_object_mut() {
        info.insert("x-semantic-score".to_string(), number(score));
        info.insert(
            "x-semantic-score-timestamp".to_string(),
            Value::from(Utc::now().timestamp_millis()),
        );
    }

    Ok(ScoreOutcome { document, score })
}

/// Score one component schema.
///
/// Returns `None` for non-object schemas (they do not participate in the
/// document mean), `Some(0.0)` for object schemas without a usable merged
/// context or without declared properties. Only top-level property names
/// are walked.
async fn score_model(
    name: &str,
    schema: &Value,
    sparql: &dyn SparqlClient,
) -> Result<Option<f64>, SemanticError> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(None);
    }
    let merged = resolve_context(schema);
    if !has_context(&merged) {
        return Ok(Some(0.0));
    }
    let properties: Vec<String> = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    if properties.is_empty() {
        return Ok(Some(0.0));
    }

    let mut valid = Vec::new();
    let mut unknown = Vec::new();
    for property in &properties {
        let resolved = resolve_property(&merged, &[property.as_str()])?;
        // Detached properties (field_uri: None) count in neither bucket.
        if let Some(uri) = resolved.field_uri {
            if uri.starts_with('@') {
                valid.push(uri);
            } else {
                unknown.push(uri);
            }
        }
    }
    let valid = dedup_last_seen(valid);
    let unknown = dedup_last_seen(unknown);

    let verified = if unknown.is_empty() {
        0
    } else {
        match sparql.count_known(&unknown).await {
            Ok(count) => count,
            Err(error) => {
                tracing::warn!(
                    model = name,
                    error = %error,
                    "SPARQL verification failed; scoring unknown URIs as zero"
                );
                0
            }
        }
    };

    Ok(Some(
        (valid.len() as f64 + verified as f64) / properties.len() as f64,
    ))
}

/// De-duplicate, keeping each element at its last occurrence.
fn dedup_last_seen(uris: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(uris.len());
    for (i, uri) in uris.iter().enumerate() {
        if uris[i + 1..].iter().all(|later| later != uri) {
            out.push(uri.clone());
        }
    }
    out
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::from(0), Value::Number)
}

// ===========================================================================
// Tests
// ===========================================================================
