//! Minimal JSON-LD expansion.
//!
//! Implements only the expansion subset the property resolver exercises:
//! term definitions, CURIE/prefix expansion, `@vocab` fallback for unmapped
//! local names, `@base`-relative `@id` references, nested `@context`
//! scoping, explicit-`null` detachment, and reserved-keyword passthrough.
//! Framing, `@graph`, `@list`, and `@reverse` semantics are out of scope.
//!
//! Remote context references (a string in `@context` position) are not
//! dereferenced; terms under them simply fail to expand.

use serde_json::{json, Map, Value};
use url::Url;

use crate::error::SemanticError;

/// The recognized JSON-LD reserved keywords.
pub(crate) const JSONLD_KEYWORDS: &[&str] = &[
    "@base",
    "@container",
    "@context",
    "@definition",
    "@direction",
    "@id",
    "@import",
    "@language",
    "@nest",
    "@prefix",
    "@propagate",
    "@protected",
    "@reverse",
    "@term",
    "@type",
    "@version",
    "@vocab",
    "@graph",
    "@index",
    "@list",
    "@set",
];

pub(crate) fn is_keyword(s: &str) -> bool {
    JSONLD_KEYWORDS.contains(&s)
}

/// Outcome of mapping a term against the active context.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TermMapping {
    /// The term expands to an absolute IRI or a reserved keyword.
    Iri(String),
    /// The term is explicitly mapped to `null` — detached from the ontology.
    Detached,
    /// No mapping exists (no term definition, no prefix, no `@vocab`).
    Unmapped,
}

/// In-memory form of a JSON-LD context: `@vocab`, `@base`, and the raw term
/// entries in declaration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveContext {
    vocab: Option<String>,
    base: Option<String>,
    terms: Map<String, Value>,
}

impl ActiveContext {
    /// Overlay a local context onto this one, child scope wins.
    pub(crate) fn with_local(&self, local: &Value) -> Self {
        let mut child = self.clone();
        child.apply(local);
        child
    }

    fn apply(&mut self, ctx: &Value) {
        match ctx {
            Value::Object(obj) => {
                for (key, value) in obj {
                    match key.as_str() {
                        "@vocab" => self.vocab = value.as_str().map(String::from),
                        "@base" => self.base = value.as_str().map(String::from),
                        // Processing-mode keywords carry no term mapping.
                        "@version" | "@language" | "@direction" | "@propagate"
                        | "@protected" | "@import" => {}
                        _ => {
                            self.terms.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.apply(item);
                }
            }
            // Remote context reference or scalar: nothing to apply locally.
            _ => {}
        }
    }

    pub(crate) fn term_definition(&self, name: &str) -> Option<&Value> {
        self.terms.get(name)
    }

    /// Map a property name to its expanded IRI, detached, or unmapped state.
    ///
    /// An `@`-prefixed mapping that is not a recognized JSON-LD keyword is a
    /// hard error.
    pub(crate) fn map_term(&self, name: &str) -> Result<TermMapping, SemanticError> {
        if name.starts_with('@') {
            return if is_keyword(name) {
                Ok(TermMapping::Iri(name.to_string()))
            } else {
                Err(SemanticError::InvalidKeyword {
                    term: name.to_string(),
                    keyword: name.to_string(),
                })
            };
        }

        match self.terms.get(name) {
            Some(Value::Null) => Ok(TermMapping::Detached),
            Some(Value::String(target)) => self.map_term_target(name, target),
            Some(Value::Object(def)) => match def.get("@id") {
                Some(Value::Null) => Ok(TermMapping::Detached),
                Some(Value::String(target)) => self.map_term_target(name, target),
                _ => Ok(self.vocab_expand(name)),
            },
            _ => Ok(self.vocab_expand(name)),
        }
    }

    fn map_term_target(&self, name: &str, target: &str) -> Result<TermMapping, SemanticError> {
        if target.starts_with('@') {
            return if is_keyword(target) {
                Ok(TermMapping::Iri(target.to_string()))
            } else {
                Err(SemanticError::InvalidKeyword {
                    term: name.to_string(),
                    keyword: target.to_string(),
                })
            };
        }
        Ok(self.vocab_expand(target))
    }

    fn vocab_expand(&self, value: &str) -> TermMapping {
        match self.expand_iri(value, true) {
            Some(iri) => TermMapping::Iri(iri),
            None => TermMapping::Unmapped,
        }
    }

    /// Expand a string to an absolute IRI: keyword passthrough, CURIE prefix
    /// lookup, absolute-IRI passthrough, `@vocab` fallback when `vocab` is set.
    pub(crate) fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        if value.starts_with('@') && is_keyword(value) {
            return Some(value.to_string());
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            // `scheme://...` and blank nodes are already absolute.
            if suffix.starts_with("//") || prefix == "_" {
                return Some(value.to_string());
            }
            if let Some(namespace) = self.prefix_iri(prefix) {
                return Some(format!("{namespace}{suffix}"));
            }
            // Unknown prefix with a colon: an absolute IRI in some other
            // scheme (urn:, mailto:, ...).
            return Some(value.to_string());
        }
        if vocab {
            if let Some(v) = &self.vocab {
                return Some(format!("{v}{value}"));
            }
        }
        None
    }

    fn prefix_iri(&self, prefix: &str) -> Option<String> {
        match self.terms.get(prefix)? {
            Value::String(iri) if !iri.starts_with('@') => Some(iri.clone()),
            Value::Object(def) => def.get("@id")?.as_str().map(String::from),
            _ => None,
        }
    }

    /// Expand an `@id`-typed reference value, resolving relative references
    /// against `@base`. An unparseable `@base` is an IRI-syntax error.
    pub(crate) fn expand_reference(
        &self,
        value: &str,
    ) -> Result<Option<String>, SemanticError> {
        if value.starts_with('@') && is_keyword(value) {
            return Ok(Some(value.to_string()));
        }
        if value.contains(':') {
            return Ok(self.expand_iri(value, false));
        }
        let Some(base) = &self.base else {
            return Ok(None);
        };
        let base_url = Url::parse(base).map_err(|e| SemanticError::Expansion {
            term: value.to_string(),
            message: format!("invalid @base '{base}': {e}"),
        })?;
        let joined = base_url.join(value).map_err(|e| SemanticError::Expansion {
            term: value.to_string(),
            message: format!("cannot resolve '{value}' against @base '{base}': {e}"),
        })?;
        Ok(Some(joined.into()))
    }
}

/// Expand a JSON-LD input document.
///
/// The root `@context` (if any) seeds the active context; every property key
/// is mapped through [`ActiveContext::map_term`]; detached and unmapped
/// properties are dropped, exactly as full expansion drops them. Values
/// expand to `{"@id": ...}` nodes for `@id`-typed terms and `{"@value": ...}`
/// nodes otherwise.
pub(crate) fn expand(doc: &Value) -> Result<Value, SemanticError> {
    match doc.as_object() {
        Some(obj) => expand_object(obj, &ActiveContext::default()),
        None => Ok(doc.clone()),
    }
}

fn expand_object(
    obj: &Map<String, Value>,
    active: &ActiveContext,
) -> Result<Value, SemanticError> {
    let scoped;
    let active = match obj.get("@context") {
        Some(local) => {
            scoped = active.with_local(local);
            &scoped
        }
        None => active,
    };

    let mut out = Map::new();
    for (key, value) in obj {
        if key == "@context" {
            continue;
        }
        let expanded_key = match active.map_term(key)? {
            TermMapping::Iri(iri) => iri,
            // Dropped, as full expansion drops them.
            TermMapping::Detached | TermMapping::Unmapped => continue,
        };

        let def = active.term_definition(key);
        let value_scope;
        let value_active = match def.and_then(|d| d.get("@context")) {
            Some(local) => {
                value_scope = active.with_local(local);
                &value_scope
            }
            None => active,
        };
        let id_typed = def
            .and_then(|d| d.get("@type"))
            .and_then(Value::as_str)
            .is_some_and(|t| t == "@id");

        out.insert(expanded_key, expand_term_value(value, id_typed, value_active)?);
    }
    Ok(Value::Object(out))
}

fn expand_term_value(
    value: &Value,
    id_typed: bool,
    active: &ActiveContext,
) -> Result<Value, SemanticError> {
    match value {
        Value::Object(inner) => expand_object(inner, active),
        Value::Array(items) => {
            let expanded = items
                .iter()
                .map(|item| expand_term_value(item, id_typed, active))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(expanded))
        }
        Value::String(s) if id_typed => match active.expand_reference(s)? {
            Some(iri) => Ok(json!({ "@id": iri })),
            None => Ok(json!({ "@value": s })),
        },
        other => Ok(json!({ "@value": other.clone() })),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
