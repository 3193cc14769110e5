// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution modes and value shape helpers.

use serde_json::Value;

/// The requested shape of a lookup answer.
///
/// The mode decides how contributions from successive datasources are
/// combined: scalar resolution stops at the first hit, list and mapping
/// resolution keep walking the hierarchy and accumulate.
///
/// # Examples
///
/// ```
/// use stacksource::domain::ResolutionMode;
///
/// let mode = ResolutionMode::Scalar;
/// assert_eq!(mode, ResolutionMode::Scalar);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionMode {
    /// First matching datasource wins; iteration stops immediately.
    Scalar,
    /// Every matching datasource contributes one element, in hierarchy order.
    List,
    /// Every matching datasource contributes a mapping, merged as it arrives.
    Mapping,
}

/// Returns a human-readable name for the shape of a JSON value.
///
/// Used to build [`Error::TypeMismatch`](crate::domain::Error::TypeMismatch)
/// messages that name both the expected and the offending shape.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stacksource::domain::value_kind;
///
/// assert_eq!(value_kind(&json!({"a": 1})), "mapping");
/// assert_eq!(value_kind(&json!([1, 2])), "sequence");
/// assert_eq!(value_kind(&json!("x")), "string");
/// ```
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_names() {
        assert_eq!(value_kind(&Value::Null), "null");
        assert_eq!(value_kind(&json!(true)), "boolean");
        assert_eq!(value_kind(&json!(1.5)), "number");
        assert_eq!(value_kind(&json!("s")), "string");
        assert_eq!(value_kind(&json!([])), "sequence");
        assert_eq!(value_kind(&json!({})), "mapping");
    }

    #[test]
    fn test_resolution_mode_is_copy() {
        let mode = ResolutionMode::List;
        let copy = mode;
        assert_eq!(mode, copy);
    }
}
