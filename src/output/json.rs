//! JSON export of resolved records
//!
//! Records serialize with the external field names (`Book_name`,
//! `Author_name`, `Edition_Language`, `Book_link`), so the export file is
//! consumable by anything that spoke to earlier deployments of this scraper.

use crate::record::BookRecord;
use crate::Result;
use std::path::Path;

/// Serializes records to a pretty-printed JSON array
pub fn records_to_json(records: &[BookRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Writes the record export to a file
pub fn write_export(records: &[BookRecord], path: &Path) -> Result<()> {
    let json = records_to_json(records)?;
    std::fs::write(path, json)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<BookRecord> {
        vec![BookRecord {
            book_name: "Dune".to_string(),
            author_name: "Frank Herbert".to_string(),
            edition_language: "English".to_string(),
            source_url: "https://books.example.com/book/dune".to_string(),
        }]
    }

    #[test]
    fn test_export_uses_wire_field_names() {
        let json = records_to_json(&sample_records()).unwrap();
        assert!(json.contains("\"Book_name\": \"Dune\""));
        assert!(json.contains("\"Book_link\": \"https://books.example.com/book/dune\""));
    }

    #[test]
    fn test_write_export_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");

        write_export(&sample_records(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<BookRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sample_records());
    }

    #[test]
    fn test_empty_export_is_valid_json() {
        let json = records_to_json(&[]).unwrap();
        assert_eq!(json.trim(), "[]");
    }
}
