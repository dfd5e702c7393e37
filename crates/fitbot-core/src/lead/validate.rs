//! Syntactic checks for contact details.

use std::sync::OnceLock;

use regex::Regex;

/// A phone is valid when it carries 10 to 20 digits; formatting characters
/// (spaces, dashes, `+`, parentheses) are ignored.
pub fn is_valid_phone(text: &str) -> bool {
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=20).contains(&digits)
}

/// Minimal `local@domain.tld` shape check. Not RFC 5322.
pub fn is_valid_email(text: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
        .is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_counts_digits_only() {
        assert!(is_valid_phone("+7 900 000-00-00"));
        assert!(is_valid_phone("89001234567"));
        assert!(is_valid_phone("(900) 123-45-67"));
        assert!(is_valid_phone("12345678901234567890"));
    }

    #[test]
    fn phone_rejects_out_of_range() {
        assert!(!is_valid_phone("123-45-67"));
        assert!(!is_valid_phone("900 000 00 0"));
        assert!(!is_valid_phone("123456789012345678901"));
        assert!(!is_valid_phone("позвоните мне"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn email_accepts_simple_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("ivan@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.ru"));
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("ivan @example.com"));
        assert!(!is_valid_email("ivan@exa mple.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ivan.example.com"));
    }
}
