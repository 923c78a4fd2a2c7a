use once_cell::sync::Lazy;
use regex::Regex;

// Script blocks must go before generic tag stripping, otherwise only the
// markers disappear and the script body survives as bare text.
static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?</\s*script\s*>")
        .expect("invalid script block pattern")
});

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid html tag pattern"));

static JAVASCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("invalid scheme pattern"));

static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+=").expect("invalid event handler pattern"));

/// Reduces a free-text field to a safe subset of characters and length before
/// it is validated, displayed or embedded in an email body.
///
/// The transform is lossy and infallible: it always returns a string,
/// possibly empty. Order matters — script blocks, then remaining tags, then
/// scheme/handler fragments, then the final character strip, so that
/// partially-formed tags are caught as well.
pub fn sanitize(input: &str, max_length: usize) -> String {
    let cleaned = SCRIPT_BLOCK.replace_all(input, "");
    let cleaned = HTML_TAG.replace_all(&cleaned, "");
    let cleaned = JAVASCRIPT_SCHEME.replace_all(&cleaned, "");
    let cleaned = EVENT_HANDLER.replace_all(&cleaned, "");

    let cleaned: String = cleaned
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect();

    let truncated: String = cleaned.chars().take(max_length).collect();
    truncated.trim().to_string()
}

/// Variant for values placed into header-sensitive contexts (reply-to).
///
/// Additionally strips line breaks to prevent header injection and `%` to
/// neutralize encoded payloads. `@` is kept — it is semantically required
/// for email addresses.
pub fn sanitize_email_header_field(input: &str, max_length: usize) -> String {
    let without_breaks: String = input
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '%'))
        .collect();
    sanitize(&without_breaks, max_length)
}
