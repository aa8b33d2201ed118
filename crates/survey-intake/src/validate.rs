//! Required-field validation for survey submissions.

use serde_json::Value;

use crate::error::AppError;
use crate::model::Submission;

/// Fields every submission must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 11] = [
    "fullName",
    "role",
    "organization",
    "email",
    "biggestImpact",
    "implementFirst",
    "firstAction",
    "builtGPT",
    "pullQuote",
    "valuablePart",
    "recommend",
];

/// Decode a raw request body into a submission.
///
/// Surrounding whitespace is ignored. Anything other than a JSON object is rejected.
pub fn parse_body(body: &[u8]) -> Result<Submission, AppError> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() {
        return Err(AppError::EmptyBody);
    }
    match serde_json::from_slice::<Value>(trimmed) {
        Ok(Value::Object(fields)) => Ok(Submission::new(fields)),
        Ok(_) | Err(_) => Err(AppError::MalformedJson),
    }
}

/// Reject the submission on the first required field that is missing.
///
/// A field is missing when it is absent, `null`, an empty string, or an empty array.
/// `0`, `"0"` and `false` are answers, not gaps.
pub fn validate(submission: &Submission) -> Result<(), AppError> {
    match REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|field| is_missing(submission.get(field)))
    {
        Some(field) => Err(AppError::MissingField(field)),
        None => Ok(()),
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
