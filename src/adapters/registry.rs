// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-region connection registry.
//!
//! Lookups can arrive from agents in different regions, so connections are
//! keyed by region and created lazily on first use. A connection, once
//! created, lives for the rest of the process; there is no teardown path.

use crate::domain::{CredentialStrategy, Error, Result};
use crate::ports::{StackApi, StackConnector};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Maps a region to its live connection, creating at most one per region.
///
/// The fast path is a read lock and a map hit, with no network I/O. First use
/// of a region takes a creation mutex, validates the region against the
/// service's own region list, and connects; a concurrent first use of the
/// same region waits and then finds the connection already present. Two
/// connections for one region would break the 1:1 region-to-connection
/// assumption the credential sharing relies on, so exactly-once creation is
/// a correctness requirement here, not an optimization.
///
/// The creation mutex is coarse: first-time creation of *different* regions
/// is serialized too. Creation happens a handful of times per process
/// lifetime, so the simplicity wins.
pub struct ConnectionRegistry {
    connector: Box<dyn StackConnector>,
    credentials: CredentialStrategy,
    connections: RwLock<HashMap<String, Arc<dyn StackApi>>>,
    create_lock: Mutex<()>,
    regions: OnceCell<Vec<String>>,
}

impl ConnectionRegistry {
    /// Creates a registry that builds connections through `connector` using
    /// `credentials`.
    ///
    /// The credential strategy is fixed for the registry's lifetime and
    /// shared read-only by every connection it creates.
    pub fn new(connector: Box<dyn StackConnector>, credentials: CredentialStrategy) -> Self {
        Self {
            connector,
            credentials,
            connections: RwLock::new(HashMap::new()),
            create_lock: Mutex::new(()),
            regions: OnceCell::new(),
        }
    }

    /// Returns the connection for `region`, creating it on first use.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if `region` is not in the service's region
    /// list; whatever the connector reports if the list cannot be fetched
    /// or the connection cannot be built. No connection is stored on any
    /// error path.
    pub fn ensure(&self, region: &str) -> Result<Arc<dyn StackApi>> {
        if let Some(connection) = self
            .connections
            .read()
            .expect("connection map lock poisoned")
            .get(region)
        {
            return Ok(Arc::clone(connection));
        }

        let _guard = self.create_lock.lock().expect("creation lock poisoned");

        // A concurrent caller may have created the connection while we
        // waited for the lock.
        if let Some(connection) = self
            .connections
            .read()
            .expect("connection map lock poisoned")
            .get(region)
        {
            return Ok(Arc::clone(connection));
        }

        if !self.is_valid_region(region)? {
            warn!(region, "refusing to connect to unrecognized region");
            return Err(Error::InvalidRegion {
                region: region.to_string(),
            });
        }

        debug!(region, "creating persistent connection");
        let connection = self.connector.connect(region, &self.credentials)?;

        self.connections
            .write()
            .expect("connection map lock poisoned")
            .insert(region.to_string(), Arc::clone(&connection));

        Ok(connection)
    }

    /// Returns whether `region` names a recognized deployment region.
    ///
    /// The authoritative list is fetched from the connector once per
    /// process and reused. If the list cannot be obtained the error
    /// propagates; an unvalidated region is never accepted.
    pub fn is_valid_region(&self, region: &str) -> Result<bool> {
        let regions = self
            .regions
            .get_or_try_init(|| self.connector.list_regions())?;
        Ok(regions.iter().any(|name| name == region))
    }

    /// Returns the number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .expect("connection map lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StackOutput;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingApi {
        region: String,
    }

    impl StackApi for CountingApi {
        fn region(&self) -> &str {
            &self.region
        }

        fn stack_outputs(&self, _stack: &str) -> Result<Vec<StackOutput>> {
            Ok(vec![])
        }

        fn resource_metadata(&self, _stack: &str, _resource: &str) -> Result<String> {
            Ok("{}".to_string())
        }
    }

    struct CountingConnector {
        connects: Arc<AtomicUsize>,
        region_list_calls: Arc<AtomicUsize>,
        fail_region_list: bool,
    }

    impl CountingConnector {
        fn new() -> Self {
            Self {
                connects: Arc::new(AtomicUsize::new(0)),
                region_list_calls: Arc::new(AtomicUsize::new(0)),
                fail_region_list: false,
            }
        }
    }

    impl StackConnector for CountingConnector {
        fn list_regions(&self) -> Result<Vec<String>> {
            self.region_list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_region_list {
                return Err(Error::Remote {
                    message: "region list unavailable".to_string(),
                    source: None,
                });
            }
            Ok(vec!["eu-west-1".to_string(), "us-east-1".to_string()])
        }

        fn connect(
            &self,
            region: &str,
            _credentials: &CredentialStrategy,
        ) -> Result<Arc<dyn StackApi>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(CountingApi {
                region: region.to_string(),
            }))
        }
    }

    fn registry_with(connector: CountingConnector) -> ConnectionRegistry {
        ConnectionRegistry::new(Box::new(connector), CredentialStrategy::Ambient)
    }

    #[test]
    fn test_ensure_creates_connection_once() {
        let connector = CountingConnector::new();
        let connects = Arc::clone(&connector.connects);
        let registry = registry_with(connector);

        let first = registry.ensure("eu-west-1").unwrap();
        let second = registry.ensure("eu-west-1").unwrap();

        assert_eq!(first.region(), "eu-west-1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn test_ensure_rejects_invalid_region() {
        let registry = registry_with(CountingConnector::new());

        let err = registry.ensure("mars-north-1").err().unwrap();
        assert!(matches!(err, Error::InvalidRegion { region } if region == "mars-north-1"));
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_ensure_separate_regions() {
        let registry = registry_with(CountingConnector::new());

        registry.ensure("eu-west-1").unwrap();
        registry.ensure("us-east-1").unwrap();

        assert_eq!(registry.connection_count(), 2);
    }

    #[test]
    fn test_region_list_fetched_once() {
        let connector = CountingConnector::new();
        let list_calls = Arc::clone(&connector.region_list_calls);
        let registry = registry_with(connector);

        registry.ensure("eu-west-1").unwrap();
        registry.ensure("us-east-1").unwrap();
        assert!(registry.is_valid_region("eu-west-1").unwrap());

        assert_eq!(list_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_region_list_failure_is_loud() {
        let mut connector = CountingConnector::new();
        connector.fail_region_list = true;
        let registry = registry_with(connector);

        let err = registry.ensure("eu-west-1").err().unwrap();
        assert!(matches!(err, Error::Remote { .. }));
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_concurrent_first_use_single_connect() {
        use std::thread;

        let connector = CountingConnector::new();
        let connects = Arc::clone(&connector.connects);
        let registry = Arc::new(registry_with(connector));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || registry.ensure("eu-west-1").unwrap()));
        }

        let connections: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for connection in &connections[1..] {
            assert!(Arc::ptr_eq(&connections[0], connection));
        }
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(registry.connection_count(), 1);
    }
}
