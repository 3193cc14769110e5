// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchy engine trait definition.
//!
//! This backend does not own the lookup hierarchy; a surrounding
//! configuration-resolution engine supplies the ordered datasource list,
//! interpolates template expressions against the request scope, and decides
//! how mappings merge. `HierarchyEngine` is that boundary. The crate ships
//! [`StaticHierarchy`](crate::adapters::StaticHierarchy) as a
//! self-contained implementation for embedding and tests.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Request-scoped interpolation context: variable name to value.
pub type Scope = HashMap<String, String>;

/// The boundary to the surrounding configuration-resolution engine.
///
/// Implementations must be `Send + Sync`; one engine is shared by all
/// concurrent lookups.
pub trait HierarchyEngine: Send + Sync {
    /// Returns the datasource identifiers to try, most specific first.
    ///
    /// An `order_override` names a datasource to try before the configured
    /// hierarchy. Identifiers are returned already interpolated against
    /// `scope`.
    fn datasources(&self, scope: &Scope, order_override: Option<&str>) -> Vec<String>;

    /// Substitutes template expressions in `raw` against `scope`.
    ///
    /// Applied to every value a datasource contributes before it is combined
    /// into the answer, and to the configured region name before a
    /// connection is ensured.
    fn interpolate(&self, raw: &Value, scope: &Scope) -> Value;

    /// Combines a new mapping contribution into the accumulated answer.
    ///
    /// The merge policy belongs to the engine; the resolver only guarantees
    /// it is applied in hierarchy order.
    fn merge(&self, new: Map<String, Value>, acc: Map<String, Value>) -> Map<String, Value>;

    /// Interpolates a bare string, returning a string.
    ///
    /// This is a convenience wrapper over
    /// [`interpolate`](HierarchyEngine::interpolate) for values that are
    /// strings by construction, such as the configured region name.
    fn interpolate_str(&self, raw: &str, scope: &Scope) -> String {
        match self.interpolate(&Value::String(raw.to_string()), scope) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Passthrough;

    impl HierarchyEngine for Passthrough {
        fn datasources(&self, _scope: &Scope, _order_override: Option<&str>) -> Vec<String> {
            vec![]
        }

        fn interpolate(&self, raw: &Value, _scope: &Scope) -> Value {
            raw.clone()
        }

        fn merge(&self, new: Map<String, Value>, mut acc: Map<String, Value>) -> Map<String, Value> {
            acc.extend(new);
            acc
        }
    }

    #[test]
    fn test_interpolate_str_default_impl() {
        let engine = Passthrough;
        let scope = Scope::new();
        assert_eq!(engine.interpolate_str("eu-west-1", &scope), "eu-west-1");
    }

    #[test]
    fn test_hierarchy_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn HierarchyEngine>();
    }
}
