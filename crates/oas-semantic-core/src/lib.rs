//! JSON-LD context resolution and semantic-property scoring for OpenAPI
//! documents.
//!
//! OpenAPI/JSON Schema models may carry `x-jsonld-context` annotations that
//! tie their properties to ontology IRIs. This crate implements the four
//! subsystems that make those annotations useful:
//!
//! - [`resolve_context`] — merge nested, possibly-conflicting context
//!   fragments into one context per model.
//! - [`resolve_property`] — expand a property path against a merged context
//!   into its absolute ontology IRI.
//! - [`calculate_semantic_score`] — score every object-typed component
//!   schema by how many of its properties carry a verifiable mapping,
//!   verifying ontology URIs through a SPARQL count oracle.
//! - [`normalize_refs`] — rewrite a resolved document so remote schema
//!   references become locally addressable, content-hashed components.
//!
//! `$ref` resolution and SPARQL transport are collaborator seams
//! ([`DocumentResolver`], [`SparqlClient`]) with bundled default
//! implementations ([`LocalResolver`], [`HttpSparqlClient`]).
//!
//! ```
//! use oas_semantic_core::{resolve_context, resolve_property};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "x-jsonld-context": {
//!         "@vocab": "https://w3id.org/italia/onto/CPV/",
//!         "description": "educationLevelDesc"
//!     },
//!     "properties": { "description": { "type": "string" } }
//! });
//!
//! let merged = resolve_context(&schema);
//! let resolved = resolve_property(&merged, &["description"]).unwrap();
//! assert_eq!(
//!     resolved.field_uri.as_deref(),
//!     Some("https://w3id.org/italia/onto/CPV/educationLevelDesc")
//! );
//! ```

pub mod context;
pub mod document;
pub mod error;
mod expand;
pub mod lint;
pub mod normalize;
pub mod property;
pub mod resolver;
pub mod schema_utils;
pub mod score;
pub mod sparql;

pub use context::resolve_context;
pub use document::validate_openapi_shape;
pub use error::SemanticError;
pub use lint::{lint_document, SpecError};
pub use normalize::normalize_refs;
pub use property::{resolve_property, ResolvedProperty};
pub use resolver::{DocumentResolver, LocalResolver, ResolvedSpec};
pub use score::{calculate_semantic_score, ScoreOutcome};
pub use sparql::{HttpSparqlClient, SparqlClient};
