// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared mock connector for integration tests.
//!
//! The mock holds fixture data for outputs and metadata and counts every
//! remote call, so tests can assert cache behavior and connection reuse
//! without any network.

use stacksource::domain::{CredentialStrategy, Error, Result};
use stacksource::ports::{StackApi, StackConnector, StackOutput};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Remote-call counters shared between a connector and its connections.
#[derive(Default)]
pub struct CallCounters {
    pub connects: AtomicUsize,
    pub region_lists: AtomicUsize,
    pub output_fetches: AtomicUsize,
    pub metadata_fetches: AtomicUsize,
}

/// A stack service fixture with canned regions, outputs, and metadata.
pub struct MockConnector {
    regions: Vec<String>,
    outputs: HashMap<String, Vec<StackOutput>>,
    metadata: HashMap<(String, String), String>,
    pub counters: Arc<CallCounters>,
}

#[allow(dead_code)]
impl MockConnector {
    pub fn new() -> Self {
        Self {
            regions: vec!["eu-west-1".to_string(), "us-east-1".to_string()],
            outputs: HashMap::new(),
            metadata: HashMap::new(),
            counters: Arc::new(CallCounters::default()),
        }
    }

    pub fn with_regions(mut self, regions: &[&str]) -> Self {
        self.regions = regions.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_output(mut self, stack: &str, key: &str, value: &str) -> Self {
        self.outputs
            .entry(stack.to_string())
            .or_default()
            .push(StackOutput {
                key: key.to_string(),
                value: value.to_string(),
            });
        self
    }

    pub fn with_metadata(mut self, stack: &str, resource: &str, payload: &str) -> Self {
        self.metadata
            .insert((stack.to_string(), resource.to_string()), payload.to_string());
        self
    }
}

impl StackConnector for MockConnector {
    fn list_regions(&self) -> Result<Vec<String>> {
        self.counters.region_lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.regions.clone())
    }

    fn connect(
        &self,
        region: &str,
        _credentials: &CredentialStrategy,
    ) -> Result<Arc<dyn StackApi>> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockApi {
            region: region.to_string(),
            outputs: self.outputs.clone(),
            metadata: self.metadata.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct MockApi {
    region: String,
    outputs: HashMap<String, Vec<StackOutput>>,
    metadata: HashMap<(String, String), String>,
    counters: Arc<CallCounters>,
}

impl StackApi for MockApi {
    fn region(&self) -> &str {
        &self.region
    }

    fn stack_outputs(&self, stack: &str) -> Result<Vec<StackOutput>> {
        self.counters.output_fetches.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .get(stack)
            .cloned()
            .ok_or_else(|| Error::StackNotFound {
                stack: stack.to_string(),
            })
    }

    fn resource_metadata(&self, stack: &str, resource: &str) -> Result<String> {
        self.counters.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        self.metadata
            .get(&(stack.to_string(), resource.to_string()))
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound {
                stack: stack.to_string(),
                resource: resource.to_string(),
            })
    }
}
