use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One survey response, exactly as the client sent it (plus `submittedAt`).
///
/// Kept as a JSON object rather than a struct so unknown form fields survive into the
/// responses store untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission(Map<String, Value>);

impl Submission {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field as text: strings verbatim, numbers and booleans as their JSON text,
    /// anything else (absent, null, arrays, objects) as the empty string.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => String::new(),
        }
    }

    /// Field as an integer, 0 when absent or unparseable.
    pub fn int(&self, key: &str) -> i64 {
        self.0.get(key).map(coerce_int).unwrap_or(0)
    }

    /// Exact string comparison; non-string values never match.
    pub fn is(&self, key: &str, expected: &str) -> bool {
        matches!(self.0.get(key), Some(Value::String(s)) if s == expected)
    }

    /// String elements of an array field. Non-array values yield an empty list.
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fill in `submittedAt` when the client did not provide one.
    pub fn stamped(mut self, now: &str) -> Self {
        let missing = matches!(self.0.get("submittedAt"), None | Some(Value::Null));
        if missing {
            self.0
                .insert("submittedAt".to_string(), Value::String(now.to_string()));
        }
        self
    }
}

/// Integer reading of a loosely typed form value.
///
/// Numbers truncate toward zero, strings contribute their leading integer
/// (`"9 - very likely"` is 9), `true` is 1. Everything else is 0.
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end].parse::<i64>().unwrap_or(0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// A shareable quote, created only when the respondent opted in to public sharing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub name: String,
    pub title: String,
    pub quote: String,
    pub nps: i64,
    pub conf_gain: i64,
    pub submitted_at: String,
    pub high_impact: bool,
}

/// A respondent worth a sales follow-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub title: String,
    pub interest: Vec<String>,
    pub nps: i64,
    pub notes: String,
    pub submitted_at: String,
}

/// A respondent who built a GPT and is already using it (or about to).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyAdopter {
    pub name: String,
    pub email: String,
    pub title: String,
    #[serde(rename = "builtGPT")]
    pub built_gpt: String,
    #[serde(rename = "testedGPT")]
    pub tested_gpt: String,
    #[serde(rename = "gptUse")]
    pub gpt_use: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
}
