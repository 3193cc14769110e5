// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-contained hierarchy engine.
//!
//! When this backend is embedded without a surrounding resolution engine
//! (in tests, demos, or a standalone deployment), `StaticHierarchy` supplies
//! the three engine behaviors: a fixed datasource list, `%{var}`
//! interpolation against the request scope, and a shallow last-write-wins
//! mapping merge.

use crate::ports::{HierarchyEngine, Scope};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\{(\w+)\}").expect("placeholder pattern should compile"));

/// A hierarchy engine with a fixed datasource list.
///
/// Datasource identifiers and contributed values are interpolated with
/// `%{var}` placeholders; a variable absent from the scope interpolates to
/// the empty string. The mapping merge is shallow: keys from later
/// datasources overwrite earlier ones. Engines with deep-merge or
/// conflict-reporting policies implement
/// [`HierarchyEngine`] themselves.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use stacksource::adapters::StaticHierarchy;
/// use stacksource::ports::HierarchyEngine;
///
/// let engine = StaticHierarchy::new(vec![
///     "cfstack/%{environment}-app/outputs".to_string(),
///     "cfstack/common/outputs".to_string(),
/// ]);
///
/// let mut scope = HashMap::new();
/// scope.insert("environment".to_string(), "prod".to_string());
///
/// let datasources = engine.datasources(&scope, None);
/// assert_eq!(datasources[0], "cfstack/prod-app/outputs");
/// ```
pub struct StaticHierarchy {
    hierarchy: Vec<String>,
}

impl StaticHierarchy {
    /// Creates an engine over the given datasource identifiers, most
    /// specific first.
    pub fn new(hierarchy: Vec<String>) -> Self {
        Self { hierarchy }
    }

    fn substitute(raw: &str, scope: &Scope) -> String {
        PLACEHOLDER
            .replace_all(raw, |captures: &Captures<'_>| {
                scope.get(&captures[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}

impl HierarchyEngine for StaticHierarchy {
    fn datasources(&self, scope: &Scope, order_override: Option<&str>) -> Vec<String> {
        let mut datasources = Vec::with_capacity(self.hierarchy.len() + 1);
        if let Some(first) = order_override {
            datasources.push(Self::substitute(first, scope));
        }
        datasources.extend(self.hierarchy.iter().map(|d| Self::substitute(d, scope)));
        datasources
    }

    fn interpolate(&self, raw: &Value, scope: &Scope) -> Value {
        match raw {
            Value::String(s) => Value::String(Self::substitute(s, scope)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.interpolate(v, scope)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.interpolate(v, scope)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn merge(&self, new: Map<String, Value>, mut acc: Map<String, Value>) -> Map<String, Value> {
        acc.extend(new);
        acc
    }
}
