//! Book record data model
//!
//! The structured extraction result for one book detail page, plus the
//! sentinel values used when a field cannot be located in the markup.

use serde::{Deserialize, Serialize};

/// Sentinel for a book name the extractor could not locate
pub const UNKNOWN_BOOK_NAME: &str = "Unknown Book Name";

/// Sentinel for an author name the extractor could not locate
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Sentinel for an edition language the extractor could not locate
pub const UNKNOWN_LANGUAGE: &str = "Unknown Language";

/// Structured metadata for one book detail page
///
/// Serialized field names match the external interface shape
/// (`Book_name`, `Author_name`, `Edition_Language`, `Book_link`), which is
/// also the shape persisted by early versions of the record cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Book_name")]
    pub book_name: String,

    #[serde(rename = "Author_name")]
    pub author_name: String,

    #[serde(rename = "Edition_Language")]
    pub edition_language: String,

    /// The detail page URL this record was extracted from.
    ///
    /// Records cached before this field existed deserialize with an empty
    /// string here; the record pipeline repairs them in place on next access.
    #[serde(rename = "Book_link", default)]
    pub source_url: String,
}

impl BookRecord {
    /// Whether this record carries every field a current-schema record has.
    ///
    /// The only field that can be missing is `source_url` (introduced after
    /// the first cache deployments); the three scraped fields always hold at
    /// least their sentinel values.
    pub fn is_complete(&self) -> bool {
        !self.source_url.is_empty()
    }

    /// Whether every scraped field fell back to its sentinel value
    pub fn is_all_defaults(&self) -> bool {
        self.book_name == UNKNOWN_BOOK_NAME
            && self.author_name == UNKNOWN_AUTHOR
            && self.edition_language == UNKNOWN_LANGUAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BookRecord {
        BookRecord {
            book_name: "The Rust Programming Language".to_string(),
            author_name: "Steve Klabnik".to_string(),
            edition_language: "English".to_string(),
            source_url: "https://books.example.com/book/trpl".to_string(),
        }
    }

    #[test]
    fn test_complete_record() {
        assert!(sample_record().is_complete());
    }

    #[test]
    fn test_incomplete_record_missing_source_url() {
        let mut record = sample_record();
        record.source_url = String::new();
        assert!(!record.is_complete());
    }

    #[test]
    fn test_all_defaults() {
        let record = BookRecord {
            book_name: UNKNOWN_BOOK_NAME.to_string(),
            author_name: UNKNOWN_AUTHOR.to_string(),
            edition_language: UNKNOWN_LANGUAGE.to_string(),
            source_url: "https://books.example.com/book/x".to_string(),
        };
        assert!(record.is_all_defaults());
        assert!(!sample_record().is_all_defaults());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.contains("\"Book_name\""));
        assert!(json.contains("\"Author_name\""));
        assert!(json.contains("\"Edition_Language\""));
        assert!(json.contains("\"Book_link\""));
    }

    #[test]
    fn test_deserialize_legacy_record_without_link() {
        // Records written before source_url existed have no Book_link key
        let json = r#"{
            "Book_name": "Dune",
            "Author_name": "Frank Herbert",
            "Edition_Language": "English"
        }"#;
        let record: BookRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.book_name, "Dune");
        assert!(record.source_url.is_empty());
        assert!(!record.is_complete());
    }
}
