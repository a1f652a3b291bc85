//! The normalized body data model.
//!
//! Every sub-parser funnels into the same shape: [`FormBody`] holds plain
//! form values and uploaded files keyed by field name, and [`ParsedBody`]
//! wraps either that shape or a decoded JSON document. JSON bodies keep
//! their decoded value as-is instead of being folded into the form shape,
//! so downstream consumers must special-case them.
//!
//! Values are never cached or shared between requests; a [`ParsedBody`] is
//! built fresh per parse call and owned entirely by the caller.

use bytes::Bytes;

/// An insertion-ordered multimap from field names to values.
///
/// Keys keep the order of their first occurrence, and every key holds its
/// values in append order, so repeated form fields round-trip without
/// reordering. Lookups are linear; request forms carry few enough fields
/// that this beats hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<V> {
    entries: Vec<(String, Vec<V>)>,
}

impl<V> FieldMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends a value under `name`, creating the key on first use.
    pub fn append(&mut self, name: &str, value: V) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name.to_string(), vec![value])),
        }
    }

    /// All values appended under `name`, in append order.
    pub fn get(&self, name: &str) -> Option<&[V]> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, values)| values.as_slice())
    }

    /// The first value appended under `name`.
    pub fn first(&self, name: &str) -> Option<&V> {
        self.get(name).and_then(<[V]>::first)
    }

    /// Field names in order of first occurrence.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(name, values)` pairs in order of first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// One uploaded file extracted from a multipart file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Filename declared by the part's `Content-Disposition`.
    pub filename: String,
    /// The part's own `Content-Type`, or `application/unknown` when the
    /// part does not declare one.
    pub content_type: String,
    /// The raw payload, exactly as sent. Never interpreted as text.
    pub body: Bytes,
}

/// Normalized `{arguments, files}` result shared by the urlencoded and
/// multipart sub-parsers.
///
/// The two maps are independent: a field name may appear in both when a
/// request mixes a plain value and an upload under one name, and both are
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    /// Plain form values by field name.
    pub arguments: FieldMap<String>,
    /// Uploaded files by field name.
    pub files: FieldMap<FileUpload>,
}

impl FormBody {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.files.is_empty()
    }
}

/// Result of parsing one request body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// Decoded `application/json` document, passed through unchanged.
    Json(serde_json::Value),
    /// Normalized form fields and file uploads.
    Form(FormBody),
}

impl ParsedBody {
    /// The empty result returned for empty bodies and unrecognized content
    /// types.
    pub fn empty() -> Self {
        Self::Form(FormBody::default())
    }

    /// True when this is a form result with no arguments and no files.
    ///
    /// Callers that must reject unsupported content types do so by checking
    /// this, since the dispatcher never fails on an unknown media type.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(_) => false,
            Self::Form(form) => form.is_empty(),
        }
    }

    /// The decoded JSON value, when the body was `application/json`.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Form(_) => None,
        }
    }

    /// The normalized form data, when the body was a form.
    pub fn as_form(&self) -> Option<&FormBody> {
        match self {
            Self::Json(_) => None,
            Self::Form(form) => Some(form),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_accumulates_in_order() {
        let mut map = FieldMap::new();
        map.append("lang", "rust".to_string());
        map.append("name", "ferris".to_string());
        map.append("lang", "en".to_string());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("lang"), Some(&["rust".to_string(), "en".to_string()][..]));
        assert_eq!(map.first("lang"), Some(&"rust".to_string()));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn names_keep_first_occurrence_order() {
        let mut map = FieldMap::new();
        map.append("b", 1);
        map.append("a", 2);
        map.append("b", 3);
        map.append("c", 4);

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn iter_exposes_value_slices() {
        let mut map = FieldMap::new();
        map.append("x", "1".to_string());
        map.append("x", "2".to_string());

        let pairs: Vec<(&str, &[String])> = map.iter().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "x");
        assert_eq!(pairs[0].1.len(), 2);
    }

    #[test]
    fn empty_parsed_body() {
        let empty = ParsedBody::empty();
        assert!(empty.is_empty());
        assert!(empty.as_json().is_none());
        assert!(empty.as_form().is_some_and(FormBody::is_empty));
    }

    #[test]
    fn json_body_is_never_empty() {
        let parsed = ParsedBody::Json(serde_json::json!({}));
        assert!(!parsed.is_empty());
        assert!(parsed.as_form().is_none());
        assert_eq!(parsed.as_json(), Some(&serde_json::json!({})));
    }

    #[test]
    fn argument_and_file_share_a_name() {
        let mut form = FormBody::default();
        form.arguments.append("data", "inline".to_string());
        form.files.append(
            "data",
            FileUpload {
                filename: "data.bin".to_string(),
                content_type: "application/octet-stream".to_string(),
                body: Bytes::from_static(b"\x00\x01"),
            },
        );

        assert_eq!(form.arguments.get("data").map(<[String]>::len), Some(1));
        assert_eq!(form.files.get("data").map(<[FileUpload]>::len), Some(1));
        assert!(!form.is_empty());
    }
}
