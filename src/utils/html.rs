//! HTML and XML escaping.

use std::borrow::Cow;

/// Characters that require escaping in both HTML text and attributes.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Escape HTML special characters.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, "&#39;")
}

/// Escape XML special characters (`'` becomes `&apos;`).
#[inline]
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    escape_with(s, "&apos;")
}

fn escape_with<'a>(s: &'a str, apos: &'static str) -> Cow<'a, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str(apos),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_borrowed_when_clean() {
        assert!(matches!(escape("hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("it's"), "it&apos;s");
        assert_eq!(
            escape_xml("https://example.com/search?q=a&b=c"),
            "https://example.com/search?q=a&amp;b=c"
        );
    }
}
