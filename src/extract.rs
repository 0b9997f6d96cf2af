//! Field extractor for book detail pages
//!
//! The only place knowledge of the catalog's markup lives. Extraction is a
//! pure function over raw page content: no I/O, no cache, and it never fails
//! hard — each field independently falls back to its sentinel value when its
//! locator matches nothing.
//!
//! Detail pages carry their metadata as labeled list items:
//!
//! ```html
//! <li><strong>Full Book Name:</strong> Dune</li>
//! <li><strong>Author Name:</strong> Frank Herbert</li>
//! <li><strong>Edition Language:</strong> <span>English</span></li>
//! ```

use crate::record::{BookRecord, UNKNOWN_AUTHOR, UNKNOWN_BOOK_NAME, UNKNOWN_LANGUAGE};
use scraper::{ElementRef, Html, Selector};

const BOOK_NAME_LABEL: &str = "Full Book Name:";
const AUTHOR_LABEL: &str = "Author Name:";
const LANGUAGE_LABEL: &str = "Edition Language:";

/// Extracts a [`BookRecord`] from raw detail page content
///
/// `source_url` is taken verbatim from the argument, never parsed out of the
/// content. Only the first matching element is used for each field.
pub fn extract(raw_page: &str, source_url: &str) -> BookRecord {
    let document = Html::parse_document(raw_page);

    let book_name = labeled_item_text(&document, BOOK_NAME_LABEL)
        .unwrap_or_else(|| UNKNOWN_BOOK_NAME.to_string());
    let author_name =
        labeled_item_text(&document, AUTHOR_LABEL).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let edition_language = labeled_item_span(&document, LANGUAGE_LABEL)
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

    let record = BookRecord {
        book_name,
        author_name,
        edition_language,
        source_url: source_url.to_string(),
    };

    if record.is_all_defaults() {
        tracing::warn!("No metadata fields found on {}", source_url);
    }

    record
}

/// Finds the first `<li>` whose `<strong>` label matches, returning the
/// list item's own trailing text
fn labeled_item_text(document: &Html, label: &str) -> Option<String> {
    let li = find_labeled_item(document, label)?;

    // The value is a direct text child of the <li>, after the label element
    li.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Finds the first `<li>` whose `<strong>` label matches, returning the text
/// of the value's nested `<span>`
fn labeled_item_span(document: &Html, label: &str) -> Option<String> {
    let li = find_labeled_item(document, label)?;
    let span_selector = Selector::parse("span").ok()?;

    li.select(&span_selector)
        .next()
        .map(|span| span.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn find_labeled_item<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    let li_selector = Selector::parse("li").ok()?;
    let strong_selector = Selector::parse("strong").ok()?;

    document.select(&li_selector).find(|li| {
        li.select(&strong_selector)
            .next()
            .map(|strong| strong.text().collect::<String>().trim() == label)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE_URL: &str = "https://books.example.com/book/dune";

    fn full_page() -> &'static str {
        r#"<html><body><ul>
            <li><strong>Full Book Name:</strong> Dune</li>
            <li><strong>Author Name:</strong> Frank Herbert</li>
            <li><strong>Edition Language:</strong> <span>English</span></li>
        </ul></body></html>"#
    }

    #[test]
    fn test_extract_all_fields() {
        let record = extract(full_page(), SOURCE_URL);
        assert_eq!(record.book_name, "Dune");
        assert_eq!(record.author_name, "Frank Herbert");
        assert_eq!(record.edition_language, "English");
        assert_eq!(record.source_url, SOURCE_URL);
    }

    #[test]
    fn test_missing_author_defaults() {
        let html = r#"<html><body><ul>
            <li><strong>Full Book Name:</strong> Dune</li>
            <li><strong>Edition Language:</strong> <span>English</span></li>
        </ul></body></html>"#;

        let record = extract(html, SOURCE_URL);
        assert_eq!(record.author_name, UNKNOWN_AUTHOR);
        // Present fields are still populated
        assert_eq!(record.book_name, "Dune");
        assert_eq!(record.edition_language, "English");
    }

    #[test]
    fn test_empty_page_all_defaults() {
        let record = extract("<html><body></body></html>", SOURCE_URL);
        assert_eq!(record.book_name, UNKNOWN_BOOK_NAME);
        assert_eq!(record.author_name, UNKNOWN_AUTHOR);
        assert_eq!(record.edition_language, UNKNOWN_LANGUAGE);
        assert_eq!(record.source_url, SOURCE_URL);
        assert!(record.is_all_defaults());
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let record = extract("<<<not html &&& <li><strong>", SOURCE_URL);
        assert!(record.is_all_defaults());
    }

    #[test]
    fn test_first_match_wins() {
        let html = r#"<html><body><ul>
            <li><strong>Full Book Name:</strong> Dune</li>
            <li><strong>Full Book Name:</strong> Not Dune</li>
        </ul></body></html>"#;

        let record = extract(html, SOURCE_URL);
        assert_eq!(record.book_name, "Dune");
    }

    #[test]
    fn test_language_requires_nested_span() {
        // Language value outside a span is not where this catalog puts it
        let html = r#"<html><body><ul>
            <li><strong>Edition Language:</strong> English</li>
        </ul></body></html>"#;

        let record = extract(html, SOURCE_URL);
        assert_eq!(record.edition_language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_values_are_trimmed() {
        let html = r#"<html><body><ul>
            <li><strong>Full Book Name:</strong>   Dune   </li>
            <li><strong>Edition Language:</strong> <span>  English </span></li>
        </ul></body></html>"#;

        let record = extract(html, SOURCE_URL);
        assert_eq!(record.book_name, "Dune");
        assert_eq!(record.edition_language, "English");
    }

    #[test]
    fn test_source_url_taken_verbatim() {
        // Content mentioning other URLs must not leak into source_url
        let html = r#"<html><body>
            <a href="https://elsewhere.example.com/">link</a>
        </body></html>"#;

        let record = extract(html, SOURCE_URL);
        assert_eq!(record.source_url, SOURCE_URL);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(extract(full_page(), SOURCE_URL), extract(full_page(), SOURCE_URL));
    }
}
