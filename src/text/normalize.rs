//! OCR output cleanup.
//!
//! Engines emit stray symbols, form feeds and ragged line breaks. Everything
//! outside a small ASCII allow-list is dropped and whitespace runs collapse to
//! a single space.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.,;:!?()'\-\n ]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw OCR text into clean text.
///
/// Never fails; the result may be empty.
pub fn normalize(raw: &str) -> String {
    let filtered = DISALLOWED.replace_all(raw, "");
    WHITESPACE_RUN
        .replace_all(&filtered, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '\'', '-'];

    fn is_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == ' ' || ALLOWED_PUNCTUATION.contains(&c)
    }

    #[test]
    fn test_strips_noise_characters() {
        assert_eq!(normalize("Hello, w@rld! #42"), "Hello, wrld! 42");
        assert_eq!(normalize("price: $5 (approx.)"), "price: 5 (approx.)");
    }

    #[test]
    fn test_collapses_whitespace_and_newlines() {
        assert_eq!(normalize("  first line\n\n second   line \n"), "first line second line");
    }

    #[test]
    fn test_tabs_and_carriage_returns_are_dropped() {
        // Tabs and CR are not on the allow-list, so they vanish before collapsing.
        assert_eq!(normalize("a\tb\r\nc"), "ab c");
    }

    #[test]
    fn test_non_ascii_letters_removed() {
        assert_eq!(normalize("café naïve"), "caf nave");
    }

    #[test]
    fn test_empty_and_noise_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("@@@ ### \n\t"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "  The quick (brown) fox -- jumps!\n\nover the 'lazy' dog?  ",
            "§§ weird ¶ symbols \u{00a0} and\u{2003}spaces",
            "line1\nline2\n\n\nline3",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_output_only_contains_allowed_characters() {
        let input: String = (0u32..0x3000).filter_map(char::from_u32).collect();
        let output = normalize(&input);
        assert!(output.chars().all(is_allowed), "unexpected char in {:?}", output);
        assert!(!output.contains("  "));
        assert_eq!(output, output.trim());
    }
}
