// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack service connector trait definition.
//!
//! The connector is the factory side of connection management: it knows the
//! service's deployment regions and how to build an authenticated
//! [`StackApi`] connection for one of them. The connection registry drives
//! it; tests substitute a mock to run the whole resolver offline.

use crate::domain::{CredentialStrategy, Result};
use crate::ports::StackApi;
use std::sync::Arc;

/// A factory for connections to the remote stack service.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stacksource::domain::{CredentialStrategy, Result};
/// use stacksource::ports::{StackApi, StackConnector, StackOutput};
///
/// struct SingleRegion;
///
/// struct Conn;
/// impl StackApi for Conn {
///     fn region(&self) -> &str {
///         "eu-west-1"
///     }
///     fn stack_outputs(&self, _stack: &str) -> Result<Vec<StackOutput>> {
///         Ok(vec![])
///     }
///     fn resource_metadata(&self, _stack: &str, _resource: &str) -> Result<String> {
///         Ok("{}".to_string())
///     }
/// }
///
/// impl StackConnector for SingleRegion {
///     fn list_regions(&self) -> Result<Vec<String>> {
///         Ok(vec!["eu-west-1".to_string()])
///     }
///     fn connect(
///         &self,
///         _region: &str,
///         _credentials: &CredentialStrategy,
///     ) -> Result<Arc<dyn StackApi>> {
///         Ok(Arc::new(Conn))
///     }
/// }
/// ```
pub trait StackConnector: Send + Sync {
    /// Returns the authoritative list of region names the service is
    /// deployed in.
    ///
    /// Region validation depends on this call succeeding: if the list cannot
    /// be obtained the error propagates and no unvalidated region is ever
    /// accepted.
    fn list_regions(&self) -> Result<Vec<String>>;

    /// Builds an authenticated connection bound to `region`.
    ///
    /// Called at most once per region per process by the registry; the
    /// region has already been validated against
    /// [`list_regions`](StackConnector::list_regions) when this runs.
    fn connect(&self, region: &str, credentials: &CredentialStrategy) -> Result<Arc<dyn StackApi>>;
}
