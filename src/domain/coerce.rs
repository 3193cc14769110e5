// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata type coercion.
//!
//! Stack tooling frequently stringifies every primitive on its way into
//! resource metadata, so `"true"` arrives where `true` was meant and `"42"`
//! where `42` was. This module walks a parsed metadata value and converts
//! stringified primitives back to their native representation. It is applied
//! only to metadata lookups, and only when `parse_metadata` is enabled in the
//! backend settings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Integer part must not carry a redundant leading zero, so strings like
// "007" stay strings.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9]\d*)(\.\d+)?([eE][+-]?\d+)?$")
        .expect("numeric literal pattern should compile")
});

/// Recursively converts stringified primitives back to native values.
///
/// Mappings and sequences are rebuilt with each value coerced; the string
/// literals `"true"`, `"false"` and `"null"` become their native
/// counterparts; strings matching the numeric-literal grammar become numbers
/// (float when the literal carries a decimal point or exponent, integer
/// otherwise). Everything else passes through unchanged.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stacksource::domain::coerce_metadata;
///
/// assert_eq!(coerce_metadata(json!("true")), json!(true));
/// assert_eq!(coerce_metadata(json!("42")), json!(42));
/// assert_eq!(coerce_metadata(json!("3.14")), json!(3.14));
/// // A leading zero disqualifies the numeric match.
/// assert_eq!(coerce_metadata(json!("007")), json!("007"));
/// assert_eq!(
///     coerce_metadata(json!({"a": "true", "b": ["1", "x"]})),
///     json!({"a": true, "b": [1, "x"]})
/// );
/// ```
pub fn coerce_metadata(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, coerce_metadata(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_metadata).collect()),
        Value::String(s) => coerce_scalar(s),
        other => other,
    }
}

fn coerce_scalar(s: String) -> Value {
    match s.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ if NUMERIC_LITERAL.is_match(&s) => {
            if s.contains(['.', 'e', 'E']) {
                // Out-of-range literals fall through unchanged rather than
                // becoming infinities.
                match s.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                    Some(number) => Value::Number(number),
                    None => Value::String(s),
                }
            } else {
                match s.parse::<i64>() {
                    Ok(number) => Value::Number(number.into()),
                    Err(_) => Value::String(s),
                }
            }
        }
        _ => Value::String(s),
    }
}
