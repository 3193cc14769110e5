// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack service connection trait definition.
//!
//! This module defines the `StackApi` trait, a live connection to the remote
//! infrastructure-description service bound to exactly one region. The
//! connection registry owns one implementation per region for the remaining
//! process lifetime.

use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// One published output of a stack.
///
/// Outputs are key/value pairs a stack exposes for cross-stack or external
/// consumption; the remote service reports values as strings.
///
/// # Examples
///
/// ```
/// use stacksource::ports::StackOutput;
///
/// let output = StackOutput {
///     key: "db_host".to_string(),
///     value: "db.internal.example".to_string(),
/// };
/// assert_eq!(output.key, "db_host");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    /// The output name
    pub key: String,
    /// The output value
    pub value: String,
}

/// An authenticated connection to the remote stack service, bound to one
/// region.
///
/// Implementations must be `Send + Sync`: connections are shared across
/// concurrent lookups through the registry. Both query methods block the
/// calling thread for the duration of the remote call.
///
/// # Errors
///
/// A stack or resource that does not exist surfaces as
/// [`Error::StackNotFound`](crate::domain::Error::StackNotFound) or
/// [`Error::ResourceNotFound`](crate::domain::Error::ResourceNotFound); the
/// resolver converts those into cached negative results. Any other failure
/// (network, auth, throttling) is returned as-is and propagates to the
/// caller.
pub trait StackApi: Send + Sync {
    /// Returns the region this connection is bound to.
    fn region(&self) -> &str;

    /// Fetches all published outputs of `stack`.
    ///
    /// The full output set is returned so the caller can cache it whole; a
    /// later lookup for a different key on the same stack is then served
    /// from cache.
    fn stack_outputs(&self, stack: &str) -> Result<Vec<StackOutput>>;

    /// Fetches the raw metadata payload of one resource within `stack`.
    ///
    /// The payload is an opaque string here; the resolver parses it as JSON
    /// and extracts the reserved sub-object.
    fn resource_metadata(&self, stack: &str, resource: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;

    struct FixedApi;

    impl StackApi for FixedApi {
        fn region(&self) -> &str {
            "eu-west-1"
        }

        fn stack_outputs(&self, stack: &str) -> Result<Vec<StackOutput>> {
            if stack == "myapp" {
                Ok(vec![StackOutput {
                    key: "db_host".to_string(),
                    value: "db.internal".to_string(),
                }])
            } else {
                Err(Error::StackNotFound {
                    stack: stack.to_string(),
                })
            }
        }

        fn resource_metadata(&self, _stack: &str, _resource: &str) -> Result<String> {
            Ok("{}".to_string())
        }
    }

    #[test]
    fn test_stack_api_region() {
        let api = FixedApi;
        assert_eq!(api.region(), "eu-west-1");
    }

    #[test]
    fn test_stack_api_outputs() {
        let api = FixedApi;
        let outputs = api.stack_outputs("myapp").unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].key, "db_host");
    }

    #[test]
    fn test_stack_api_missing_stack() {
        let api = FixedApi;
        let err = api.stack_outputs("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stack_output_serde_roundtrip() {
        let output = StackOutput {
            key: "k".to_string(),
            value: "v".to_string(),
        };
        let json = serde_json::to_string(&output).unwrap();
        let back: StackOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_stack_api_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn StackApi>();
    }
}
