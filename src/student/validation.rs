//! Create-request validation.
//!
//! Request bodies are loosely typed: clients send numbers where strings are
//! expected and vice versa. Rules run in a fixed order and the first
//! violation wins.

use serde_json::{Map, Number, Value};

use super::types::{Age, NewStudent, DEFAULT_STATUS};
use crate::error::ValidationError;

/// A required text field and the error reported when it is missing.
struct TextRule {
    field: &'static str,
    error: ValidationError,
}

/// Required text fields, in evaluation order. `age` is checked after these.
const TEXT_RULES: [TextRule; 3] = [
    TextRule {
        field: "name",
        error: ValidationError::NameRequired,
    },
    TextRule {
        field: "course",
        error: ValidationError::CourseRequired,
    },
    TextRule {
        field: "year",
        error: ValidationError::YearRequired,
    },
];

/// Validate a create-student request body.
///
/// Bodies that are not JSON objects are treated as empty objects.
pub fn validate(body: &Value) -> Result<NewStudent, ValidationError> {
    let empty = Map::new();
    let fields = body.as_object().unwrap_or(&empty);

    // `?` in rule order: the first violation is the one reported.
    let [name, course, year] = TEXT_RULES.each_ref().map(|rule| {
        fields
            .get(rule.field)
            .and_then(non_blank_text)
            .ok_or(rule.error)
    });
    let (name, course, year) = (name?, course?, year?);

    let age = fields
        .get("age")
        .and_then(parse_age)
        .ok_or(ValidationError::AgeInvalid)?;

    let status = fields
        .get("status")
        .and_then(non_blank_text)
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Ok(NewStudent {
        name,
        age,
        course,
        year,
        status,
    })
}

/// Coerce a loose value to trimmed text. Falsy and structured values count
/// as missing.
fn non_blank_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => number_text(n),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// Render a number the way JavaScript's `String(n)` does for common values:
/// whole floats lose their fraction, so `2.0` becomes `"2"`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

fn parse_age(value: &Value) -> Option<Age> {
    Age::new(loose_number(value)?)
}

/// Numeric coercion following JavaScript's `Number(value)`. `None` stands for
/// NaN.
fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_string(s),
        // An array converts through its joined string form.
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [Value::Bool(_) | Value::Object(_)] => None,
            [single] => loose_number(single),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

fn numeric_string(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }

    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&t[2..], radix).ok().map(|v| v as f64);
    }

    // Rust also accepts "inf" and "nan"; JavaScript does not.
    if !t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    t.parse().ok()
}
