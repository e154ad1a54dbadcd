//! Markup stripping and text sanitization for text kinds and bare markers.
//!
//! Both functions are idempotent: applying them to their own output is a
//! no-op.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A tag opener followed by anything up to the closing `>`. An
/// unterminated tag runs to the end of input.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*(?:>|$)").expect("static pattern compiles"));

/// Remove markup tags. Repeats until no tag remains, so removing one tag
/// cannot splice together a new one (`<<b>i>` → empty).
pub fn strip_tags(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = match TAG_RE.replace_all(&current, "") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Drop control characters other than tab, newline and carriage return.
fn strip_controls(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Drop control characters, strip tags, encode quotes as numeric entities
/// and trim. When `max_chars` is given the result is truncated to that many
/// Unicode scalar values.
///
/// Control characters are removed before tag stripping, so `<\0script>` is
/// stripped as a tag.
pub fn sanitize_string(input: &str, max_chars: Option<usize>) -> String {
    let stripped = strip_tags(&strip_controls(input));

    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            other => out.push(other),
        }
    }

    let mut out = out.trim().to_string();
    if let Some(max) = max_chars {
        if out.chars().count() > max {
            out = out.chars().take(max).collect::<String>().trim_end().to_string();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_tags_and_keeps_text() {
        assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("tail <script src=x"), "tail ");
        assert_eq!(strip_tags("<<b>i>"), "");
    }

    #[test]
    fn sanitizer_encodes_quotes_and_trims() {
        assert_eq!(
            sanitize_string("  <i>it's \"fine\"</i> ", None),
            "it&#39;s &#34;fine&#34;"
        );
    }

    #[test]
    fn sanitizer_truncates_by_characters() {
        assert_eq!(sanitize_string("καλημέρα", Some(4)), "καλη");
        assert_eq!(sanitize_string("ab cd", Some(3)), "ab");
    }

    #[test]
    fn control_characters_cannot_hide_a_tag() {
        assert_eq!(sanitize_string("<\0script>alert(1)</script>", None), "alert(1)");
        assert_eq!(sanitize_string("<\0img src=x onerror=y>hi", None), "hi");
        assert_eq!(sanitize_string("a\u{7}b\tc", None), "ab\tc");
    }

    proptest! {
        #[test]
        fn sanitizer_is_idempotent(input in "[a-z <>/\"'!?&#;0-9\\x00\\x07]{0,40}", max in proptest::option::of(0usize..20)) {
            let once = sanitize_string(&input, max);
            let twice = sanitize_string(&once, max);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn stripped_text_contains_no_tags(input in "[a-z <>/!]{0,40}") {
            let stripped = strip_tags(&input);
            prop_assert!(!TAG_RE.is_match(&stripped));
        }
    }
}
