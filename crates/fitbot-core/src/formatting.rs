//! Formatting helpers for Telegram HTML parse mode.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap already-escaped content in a Telegram block quote.
pub fn blockquote(content: &str) -> String {
    format!("<blockquote>{content}</blockquote>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn leaves_cyrillic_untouched() {
        assert_eq!(escape_html("Иван Петров"), "Иван Петров");
    }
}
