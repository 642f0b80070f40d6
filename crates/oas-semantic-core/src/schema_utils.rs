//! JSON Pointer path helpers shared by the scoring and lint walks.
//!
//! Diagnostic paths and generated `$ref` pointers are built with RFC 6901
//! escaping so that property keys containing `/` or `~` stay addressable.

use std::borrow::Cow;

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// Each segment is escaped per RFC 6901 before joining.
///
/// # Example
/// ```
/// use oas_semantic_core::schema_utils::build_path;
/// assert_eq!(build_path("#", &["properties", "a/b"]), "#/properties/a~1b");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_no_special() {
        let result = escape_pointer_segment("foo");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "foo");
    }

    #[test]
    fn test_escape_tilde_and_slash() {
        assert_eq!(escape_pointer_segment("a~b"), "a~0b");
        assert_eq!(escape_pointer_segment("a/b"), "a~1b");
        assert_eq!(escape_pointer_segment("~/"), "~0~1");
    }

    #[test]
    fn test_build_path_simple() {
        assert_eq!(
            build_path("#", &["components", "schemas", "Person"]),
            "#/components/schemas/Person"
        );
    }

    #[test]
    fn test_build_path_escaping() {
        assert_eq!(build_path("#", &["properties", "a/b"]), "#/properties/a~1b");
    }

    #[test]
    fn test_build_path_empty() {
        assert_eq!(build_path("#", &[]), "#");
    }
}
