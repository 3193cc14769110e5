// SPDX-License-Identifier: MIT OR Apache-2.0

//! Datasource identifier classification.
//!
//! A hierarchy is a list of datasource identifier strings. Only two shapes
//! belong to this backend; everything else is somebody else's level and is
//! skipped without comment.

use once_cell::sync::Lazy;
use regex::Regex;

static OUTPUTS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cfstack/([^/]+)/outputs$").expect("outputs pattern should compile")
});

static RESOURCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cfstack/([^/]+)/resources/([^/]+)$").expect("resource pattern should compile")
});

/// A parsed datasource identifier.
///
/// Produced per hierarchy level by [`DatasourceRef::parse`]; transient and
/// never persisted. The closed set of variants lets the resolver match
/// exhaustively instead of dispatching on raw strings.
///
/// # Examples
///
/// ```
/// use stacksource::domain::DatasourceRef;
///
/// match DatasourceRef::parse("cfstack/myapp/outputs") {
///     DatasourceRef::Outputs { stack } => assert_eq!(stack, "myapp"),
///     _ => panic!("expected an outputs reference"),
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasourceRef {
    /// A reference to the published outputs of a stack.
    Outputs {
        /// The stack whose outputs are consulted
        stack: String,
    },
    /// A reference to the metadata of one resource within a stack.
    Resource {
        /// The stack containing the resource
        stack: String,
        /// The logical id of the resource
        resource: String,
    },
    /// An identifier that belongs to some other backend.
    Unmatched,
}

impl DatasourceRef {
    /// Classifies a datasource identifier string.
    ///
    /// `cfstack/<stack>/outputs` yields [`DatasourceRef::Outputs`] and
    /// `cfstack/<stack>/resources/<resource>` yields
    /// [`DatasourceRef::Resource`]. Anything else is [`DatasourceRef::Unmatched`],
    /// which is not an error: most levels of a hierarchy are expected to be
    /// irrelevant to this backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacksource::domain::DatasourceRef;
    ///
    /// assert_eq!(
    ///     DatasourceRef::parse("cfstack/myapp/resources/web1"),
    ///     DatasourceRef::Resource {
    ///         stack: "myapp".to_string(),
    ///         resource: "web1".to_string(),
    ///     }
    /// );
    /// assert_eq!(DatasourceRef::parse("classes/foo"), DatasourceRef::Unmatched);
    /// ```
    pub fn parse(identifier: &str) -> Self {
        if let Some(captures) = OUTPUTS_PATTERN.captures(identifier) {
            return DatasourceRef::Outputs {
                stack: captures[1].to_string(),
            };
        }
        if let Some(captures) = RESOURCE_PATTERN.captures(identifier) {
            return DatasourceRef::Resource {
                stack: captures[1].to_string(),
                resource: captures[2].to_string(),
            };
        }
        DatasourceRef::Unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outputs_reference() {
        assert_eq!(
            DatasourceRef::parse("cfstack/myapp/outputs"),
            DatasourceRef::Outputs {
                stack: "myapp".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_resource_reference() {
        assert_eq!(
            DatasourceRef::parse("cfstack/myapp/resources/web1"),
            DatasourceRef::Resource {
                stack: "myapp".to_string(),
                resource: "web1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unrelated_identifier() {
        assert_eq!(DatasourceRef::parse("classes/foo"), DatasourceRef::Unmatched);
    }

    #[test]
    fn test_parse_requires_full_match() {
        assert_eq!(
            DatasourceRef::parse("prefix/cfstack/myapp/outputs"),
            DatasourceRef::Unmatched
        );
        assert_eq!(
            DatasourceRef::parse("cfstack/myapp/outputs/extra"),
            DatasourceRef::Unmatched
        );
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert_eq!(DatasourceRef::parse("cfstack//outputs"), DatasourceRef::Unmatched);
        assert_eq!(
            DatasourceRef::parse("cfstack/myapp/resources/"),
            DatasourceRef::Unmatched
        );
    }

    #[test]
    fn test_parse_stack_names_with_dashes() {
        assert_eq!(
            DatasourceRef::parse("cfstack/prod-app-v2/outputs"),
            DatasourceRef::Outputs {
                stack: "prod-app-v2".to_string(),
            }
        );
    }
}
