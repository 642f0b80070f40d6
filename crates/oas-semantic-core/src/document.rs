//! OpenAPI document shape checks.
//!
//! The scoring boundary only accepts `3.0.x` documents that carry the
//! metadata and component sections the calculator needs. These checks gate
//! input before any resolution work starts.

use serde_json::Value;

use crate::error::SemanticError;

/// Validate that `doc` looks like a scoreable OpenAPI 3.0.x document.
///
/// # Errors
///
/// [`SemanticError::Document`] naming the first missing piece: the
/// `openapi` version field (which must match `3.0.x`), `info.title`,
/// `info.version`, or the `components` section.
pub fn validate_openapi_shape(doc: &Value) -> Result<(), SemanticError> {
    let version = doc
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or_else(|| SemanticError::Document("missing openapi version field".to_string()))?;
    if !version.starts_with("3.0.") {
        return Err(SemanticError::Document(format!(
            "unsupported OpenAPI version '{version}'; expected 3.0.x"
        )));
    }

    let title = doc.pointer("/info/title").and_then(Value::as_str);
    if title.is_none_or(str::is_empty) {
        return Err(SemanticError::Document("missing info.title".to_string()));
    }
    if doc.pointer("/info/version").and_then(Value::as_str).is_none() {
        return Err(SemanticError::Document("missing info.version".to_string()));
    }
    if doc.get("components").and_then(Value::as_object).is_none() {
        return Err(SemanticError::Document(
            "missing components section".to_string(),
        ));
    }

    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_doc() -> Value {
        json!({
            "openapi": "3.0.2",
            "info": { "title": "People API", "version": "1.0.0" },
            "components": { "schemas": {} }
        })
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(validate_openapi_shape(&valid_doc()).is_ok());
    }

    #[test]
    fn test_wrong_major_version_is_rejected() {
        let mut doc = valid_doc();
        doc["openapi"] = json!("3.1.0");
        let err = validate_openapi_shape(&doc).unwrap_err();
        assert!(err.to_string().contains("expected 3.0.x"));
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let mut doc = valid_doc();
        doc["info"]["title"] = json!("");
        assert!(validate_openapi_shape(&doc).is_err());
    }

    #[test]
    fn test_missing_components_is_rejected() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("components");
        let err = validate_openapi_shape(&doc).unwrap_err();
        assert!(err.to_string().contains("components"));
    }
}
