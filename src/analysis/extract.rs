//! Payload extraction from decorated service responses.
//!
//! The service is asked for a bare JSON array, but real responses come
//! wrapped in markdown fences, prefixed with prose, sprinkled with
//! `//` comment lines, or carrying trailing commas. Extraction isolates
//! and repairs the structured payload before decoding; nothing past
//! this point sees undecoded text.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());
static ARRAY_SLICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());
static OBJECT_SLICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*//.*$").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Strip decorations that break strict JSON decoding.
fn sanitize(text: &str) -> String {
    let without_comments = LINE_COMMENT.replace_all(text, "");
    TRAILING_COMMA
        .replace_all(&without_comments, "$1")
        .into_owned()
}

fn try_parse(candidate: &str) -> Option<serde_json::Value> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    if let Ok(v) = serde_json::from_str(candidate) {
        return Some(v);
    }
    serde_json::from_str(&sanitize(candidate)).ok()
}

/// Isolate the structured payload from a possibly-decorated response.
///
/// Tries, in order: the raw text, the first fenced block, the widest
/// `[..]` slice, the widest `{..}` slice. Each candidate gets a strict
/// parse first and a sanitized parse second.
pub fn extract_payload(text: &str) -> Option<serde_json::Value> {
    if let Some(v) = try_parse(text) {
        return Some(v);
    }

    if let Some(captures) = FENCED_BLOCK.captures(text) {
        if let Some(inner) = captures.get(1) {
            if let Some(v) = try_parse(inner.as_str()) {
                return Some(v);
            }
        }
    }

    for pattern in [&*ARRAY_SLICE, &*OBJECT_SLICE] {
        if let Some(m) = pattern.find(text) {
            if let Some(v) = try_parse(m.as_str()) {
                return Some(v);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_json_array() {
        let v = extract_payload(r#"[{"title": "Sunset"}]"#).unwrap();
        assert_eq!(v[0]["title"], "Sunset");
    }

    #[test]
    fn parses_fenced_block_with_language_tag() {
        let text = "Here is the metadata you asked for:\n```json\n[{\"title\": \"Harbor\"}]\n```\nLet me know if you need more.";
        let v = extract_payload(text).unwrap();
        assert_eq!(v[0]["title"], "Harbor");
    }

    #[test]
    fn parses_bare_fenced_block() {
        let text = "```\n[{\"title\": \"Alley\"}]\n```";
        let v = extract_payload(text).unwrap();
        assert_eq!(v[0]["title"], "Alley");
    }

    #[test]
    fn tolerates_trailing_commas() {
        let text = r#"[{"title": "Dunes", "keywords": ["sand", "desert",],},]"#;
        let v = extract_payload(text).unwrap();
        assert_eq!(v[0]["keywords"][1], "desert");
    }

    #[test]
    fn tolerates_comment_lines() {
        let text = "[\n  // first image\n  {\"title\": \"Pier\"}\n]";
        let v = extract_payload(text).unwrap();
        assert_eq!(v[0]["title"], "Pier");
    }

    #[test]
    fn finds_array_embedded_in_prose() {
        let text = "Sure! The results are [{\"title\": \"Creek\"}] as requested.";
        let v = extract_payload(text).unwrap();
        assert_eq!(v[0]["title"], "Creek");
    }

    #[test]
    fn rejects_text_without_any_payload() {
        assert!(extract_payload("I could not process these images.").is_none());
        assert!(extract_payload("").is_none());
    }
}
