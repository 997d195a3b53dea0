//! Value cleaning
//!
//! Turns a raw cell value into its cleared form:
//! - HTML entity decoding (`&amp;`, `&#233;`, `&#x41;`, ...)
//! - Unicode NFKC normalization
//! - Control, zero-width and garbage characters dropped
//! - Whitespace collapsed and trimmed
//!
//! An input that cleans down to nothing becomes `None`.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// Characters that carry no meaning for entity lookup
const GARBAGE_CHARS: &[char] = &[
    '"', '[', ']', '{', '}', '|', '\\', '*', '~', '^', '`', '<', '>', '\u{FFFD}',
];

/// Named HTML entities decoded during cleaning
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ndash", "-"),
    ("mdash", "-"),
    ("lsquo", "'"),
    ("rsquo", "'"),
    ("ldquo", "\""),
    ("rdquo", "\""),
    ("hellip", "..."),
    ("copy", "©"),
    ("reg", "®"),
    ("deg", "°"),
    ("eacute", "é"),
    ("egrave", "è"),
    ("agrave", "à"),
    ("aacute", "á"),
    ("ccedil", "ç"),
    ("ouml", "ö"),
    ("uuml", "ü"),
    ("auml", "ä"),
    ("szlig", "ß"),
    ("ntilde", "ñ"),
];

/// Clean a raw value. Returns `None` when nothing meaningful remains.
pub fn clear_value(raw: &str) -> Option<String> {
    let decoded = decode_html_entities(raw);
    let folded: String = decoded.nfkc().collect();

    let stripped: String = folded
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !is_garbage(*c))
        .collect();

    let cleared = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleared.is_empty() {
        None
    } else {
        Some(cleared)
    }
}

#[inline]
fn is_garbage(c: char) -> bool {
    c.is_control()
        || matches!(c, '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}')
        || GARBAGE_CHARS.contains(&c)
}

/// Decode named and numeric HTML character references.
///
/// Unknown or malformed references are left as they are.
pub fn decode_html_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&semi| semi > 1 && semi <= 10)
            .and_then(|semi| decode_reference(&tail[1..semi]).map(|text| (text, semi)));

        match decoded {
            Some((text, semi)) => {
                out.push_str(&text);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(reference: &str) -> Option<String> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    HTML_ENTITIES
        .iter()
        .find(|(name, _)| *name == reference)
        .map(|(_, text)| (*text).to_string())
}

/// Render a raw JSON record value as source text.
///
/// Strings pass through, scalars are printed, `null` has no source value.
pub fn source_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(clear_value("  New   York\t City \n"), Some("New York City".to_string()));
    }

    #[test]
    fn test_empty_becomes_none() {
        assert_eq!(clear_value(""), None);
        assert_eq!(clear_value("   "), None);
        assert_eq!(clear_value("\"\"[]"), None);
    }

    #[test]
    fn test_html_entities() {
        assert_eq!(clear_value("Tom &amp; Jerry"), Some("Tom & Jerry".to_string()));
        assert_eq!(clear_value("Caf&eacute;"), Some("Café".to_string()));
        assert_eq!(clear_value("&#65;&#x42;C"), Some("ABC".to_string()));
        // Unknown references survive
        assert_eq!(clear_value("a &foo; b"), Some("a &foo; b".to_string()));
        assert_eq!(clear_value("AT&T"), Some("AT&T".to_string()));
    }

    #[test]
    fn test_garbage_and_nfkc() {
        assert_eq!(clear_value("\"Paris\""), Some("Paris".to_string()));
        assert_eq!(clear_value("Ｐａｒｉｓ"), Some("Paris".to_string()));
        assert_eq!(clear_value("Par\u{200B}is"), Some("Paris".to_string()));
        assert_eq!(clear_value("O'Brien"), Some("O'Brien".to_string()));
    }

    #[test]
    fn test_cleaning_cleared_value_is_stable() {
        let once = clear_value("  Saint-Étienne &amp; Lyon ").unwrap();
        assert_eq!(clear_value(&once), Some(once.clone()));
    }

    #[test]
    fn test_source_text() {
        assert_eq!(source_text(&json!(null)), None);
        assert_eq!(source_text(&json!("x")), Some("x".to_string()));
        assert_eq!(source_text(&json!(5)), Some("5".to_string()));
        assert_eq!(source_text(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(source_text(&json!(true)), Some("true".to_string()));
    }
}
