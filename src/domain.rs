use crate::sanitizer::sanitize;
use crate::validation::{EMAIL_MAX_LENGTH, MESSAGE_BOUNDS, NAME_BOUNDS};

/// Raw user-provided record, exactly as collected from the form. Lives only
/// for the duration of one submission attempt.
///
/// Absent keys deserialize as empty strings so the validator reports them as
/// missing fields instead of the parse failing wholesale.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SubmissionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// The same three fields after the sanitization transform. Constructing one
/// is the only way to get sanitized fields, so a `SanitizedSubmission` can be
/// trusted not to carry markup, script or header-injection payloads.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SanitizedSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SanitizedSubmission {
    pub fn from_input(input: &SubmissionInput) -> Self {
        Self {
            name: sanitize(&input.name, NAME_BOUNDS.max),
            // The header-sensitive variant runs where the address is placed
            // into a header context, not here: a local part like a%b is a
            // valid address and must survive until then.
            email: sanitize(&input.email.to_lowercase(), EMAIL_MAX_LENGTH),
            message: sanitize(&input.message, MESSAGE_BOUNDS.max),
        }
    }
}
