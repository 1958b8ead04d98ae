//! Structural validation of decoded metadata records.
//!
//! The strict parse-then-validate boundary: records come in as loose
//! JSON, leave as [`ImageMetadata`] or not at all. Invalid records are
//! dropped (logged, never replaced); the caller infers the gap from the
//! returned count.

use crate::types::{Category, ImageMetadata};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::warn;

/// Hard floor on usable keywords per record.
pub const MIN_KEYWORDS: usize = 15;
/// Soft target range for keyword counts; outside it we only warn,
/// since upstream truncation can shave the list.
pub const KEYWORD_TARGET: (usize, usize) = (45, 49);

/// One record as decoded from the service payload, before validation.
#[derive(Debug, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: String,
}

/// Validate one decoded record against the structural checks.
pub fn validate_record(raw: RawMetadata, display_name: &str) -> Result<ImageMetadata> {
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(Error::validation_field("must not be empty", "title"));
    }
    let description = raw.description.trim();
    if description.is_empty() {
        return Err(Error::validation_field("must not be empty", "description"));
    }

    let keywords: Vec<String> = raw
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.len() < MIN_KEYWORDS {
        return Err(Error::validation_field(
            format!("need at least {} keywords, got {}", MIN_KEYWORDS, keywords.len()),
            "keywords",
        ));
    }
    if keywords.len() < KEYWORD_TARGET.0 || keywords.len() > KEYWORD_TARGET.1 {
        warn!(
            display_name,
            keyword_count = keywords.len(),
            "keyword count outside target range"
        );
    }

    let category: Category = raw
        .category
        .parse()
        .map_err(|e: String| Error::validation_field(e, "category"))?;

    Ok(ImageMetadata {
        title: title.to_string(),
        description: description.to_string(),
        keywords,
        category,
        display_name: display_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, description: &str, keywords: usize, category: &str) -> RawMetadata {
        RawMetadata {
            title: title.to_string(),
            description: description.to_string(),
            keywords: (0..keywords).map(|i| format!("kw{}", i)).collect(),
            category: category.to_string(),
        }
    }

    #[test]
    fn accepts_a_complete_record() {
        let meta = validate_record(raw("Sunset", "A sunset over water", 45, "Landscapes"), "a.jpg")
            .unwrap();
        assert_eq!(meta.title, "Sunset");
        assert_eq!(meta.category, Category::Landscapes);
        assert_eq!(meta.display_name, "a.jpg");
        assert_eq!(meta.keywords.len(), 45);
    }

    #[test]
    fn rejects_empty_title_and_description() {
        assert!(validate_record(raw("", "desc", 45, "Food"), "a.jpg").is_err());
        assert!(validate_record(raw("   ", "desc", 45, "Food"), "a.jpg").is_err());
        assert!(validate_record(raw("title", "", 45, "Food"), "a.jpg").is_err());
    }

    #[test]
    fn rejects_too_few_keywords() {
        assert!(validate_record(raw("t", "d", 14, "Food"), "a.jpg").is_err());
        assert!(validate_record(raw("t", "d", 15, "Food"), "a.jpg").is_ok());
    }

    #[test]
    fn blank_keywords_do_not_count() {
        let mut record = raw("t", "d", 15, "Food");
        record.keywords[0] = "   ".to_string();
        assert!(validate_record(record, "a.jpg").is_err());
    }

    #[test]
    fn rejects_unknown_category() {
        let err = validate_record(raw("t", "d", 45, "Moods"), "a.jpg").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn accepts_numeric_category_id() {
        let meta = validate_record(raw("t", "d", 45, "11"), "a.jpg").unwrap();
        assert_eq!(meta.category, Category::Landscapes);
    }

    #[test]
    fn keyword_count_above_floor_but_below_target_passes() {
        // Soft bound is guidance only; 20 keywords still validates.
        assert!(validate_record(raw("t", "d", 20, "People"), "a.jpg").is_ok());
    }
}
