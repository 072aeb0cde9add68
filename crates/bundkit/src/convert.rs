//! HTML to plain text conversion for long-form detail fields

/// Maximum characters kept by [`html_to_plain`]
pub const MAX_TEXT_CHARS: usize = 4000;

/// Marker appended when text was cut
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Strip markup, trim, and cap the result at [`MAX_TEXT_CHARS`] characters
pub fn html_to_plain(html: &str) -> String {
    let text = strip_tags(html);
    truncate_chars(text.trim(), MAX_TEXT_CHARS)
}

/// Remove every `<...>` tag.
///
/// A tag is a `<` followed by at least one character other than `>` and a
/// closing `>`. A `<` with no closing `>` after it, or an empty `<>`, is
/// kept as text.
pub fn strip_tags(html: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => {
                rest = &after[close + 1..];
            }
            _ => {
                output.push('<');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Keep the first `max` characters, appending [`TRUNCATION_MARKER`] if
/// anything was cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => {
            let mut cut = text[..byte_idx].to_string();
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<h2>Sicherheit</h2><p>Reisen <b>nicht</b> empfohlen.</p>"),
            "SicherheitReisen nicht empfohlen."
        );
        assert_eq!(
            strip_tags("<a href=\"https://example.com\">link</a>"),
            "link"
        );
    }

    #[test]
    fn test_strip_tags_keeps_stray_brackets() {
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("x <> y"), "x <> y");
        assert_eq!(strip_tags("3 > 2"), "3 > 2");
    }

    #[test]
    fn test_strip_tags_multiline_tag() {
        assert_eq!(strip_tags("a<div\nclass=\"x\">b"), "ab");
    }

    #[test]
    fn test_plain_text_unchanged_except_trim() {
        assert_eq!(html_to_plain("  Keine Warnung.\n"), "Keine Warnung.");
    }

    #[test]
    fn test_html_to_plain_truncates_long_text() {
        let html = format!("<p>{}</p>", "a".repeat(5000));
        let plain = html_to_plain(&html);
        assert!(plain.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            plain.chars().count(),
            MAX_TEXT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_truncate_exact_boundary() {
        let text = "b".repeat(MAX_TEXT_CHARS);
        assert_eq!(truncate_chars(&text, MAX_TEXT_CHARS), text);
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "ä".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "äää... [truncated]");
    }
}
