use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Inclusive length bounds for a text field, counted in user-perceived
/// characters (extended grapheme clusters).
pub struct FieldBounds {
    pub min: usize,
    pub max: usize,
}

/// Single source of truth for the rule set. Both the client-side guard and
/// the server handler validate against these same bounds, so the two trust
/// domains cannot drift apart.
pub const NAME_BOUNDS: FieldBounds = FieldBounds { min: 2, max: 100 };
pub const MESSAGE_BOUNDS: FieldBounds = FieldBounds { min: 10, max: 1000 };

/// RFC 5321 limit on the total address length, in octets.
pub const EMAIL_MAX_LENGTH: usize = 254;

// RFC 5322 subset: full local-part character class, dot-separated
// alphanumeric/hyphen labels with no leading or trailing hyphen.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("invalid email pattern")
});

#[derive(Debug)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email) && email.len() <= EMAIL_MAX_LENGTH
}

/// Checks structural and length constraints on already-sanitized fields.
///
/// All violations are collected rather than short-circuited, in field order
/// name -> email -> message, at most one message per field. Validation never
/// mutates its input; that is the sanitizer's job.
pub fn validate(name: &str, email: &str, message: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else {
        let length = name.graphemes(true).count();
        if length < NAME_BOUNDS.min || length > NAME_BOUNDS.max {
            errors.push(format!(
                "Name must be between {} and {} characters",
                NAME_BOUNDS.min, NAME_BOUNDS.max
            ));
        }
    }

    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(email) {
        errors.push("Valid email address is required".to_string());
    }

    if message.is_empty() {
        errors.push("Message is required".to_string());
    } else {
        let length = message.graphemes(true).count();
        if length < MESSAGE_BOUNDS.min || length > MESSAGE_BOUNDS.max {
            errors.push(format!(
                "Message must be between {} and {} characters",
                MESSAGE_BOUNDS.min, MESSAGE_BOUNDS.max
            ));
        }
    }

    ValidationResult { errors }
}
