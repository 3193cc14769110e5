// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stack resolver.
//!
//! This module provides the `StackResolver`, which answers a single lookup
//! by walking the datasource hierarchy in order: classify each identifier,
//! query the matching cache/remote path, optionally coerce metadata, and
//! combine contributions according to the requested resolution mode.

use crate::adapters::{ConnectionRegistry, Fetched, TtlCache};
use crate::domain::{
    coerce_metadata, value_kind, BackendSettings, DatasourceRef, Error, ResolutionMode, Result,
};
use crate::ports::{HierarchyEngine, Scope, StackApi, StackConnector, StackOutput};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// The metadata sub-object reserved for key/value overrides.
const METADATA_NAMESPACE: &str = "hiera";

/// Shared cache of stack output sets, keyed by region and stack.
pub type OutputCache = TtlCache<Fetched<Vec<StackOutput>>>;
/// Shared cache of raw resource metadata payloads, keyed by region, stack
/// and resource.
pub type MetadataCache = TtlCache<Fetched<String>>;

/// Resolves keys against stack outputs and resource metadata.
///
/// One resolver serves many concurrent lookups; the connection registry and
/// the two TTL caches are the only shared state, so a cache warmed by one
/// caller benefits the others. Several resolvers can share the same caches
/// and registry by building them through [`StackResolver::builder`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use stacksource::domain::{BackendSettings, CredentialStrategy, ResolutionMode, Result};
/// use stacksource::adapters::StaticHierarchy;
/// use stacksource::ports::{Scope, StackApi, StackConnector, StackOutput};
/// use stacksource::service::StackResolver;
///
/// struct FixtureApi;
/// impl StackApi for FixtureApi {
///     fn region(&self) -> &str {
///         "eu-west-1"
///     }
///     fn stack_outputs(&self, _stack: &str) -> Result<Vec<StackOutput>> {
///         Ok(vec![StackOutput {
///             key: "db_host".to_string(),
///             value: "db.internal".to_string(),
///         }])
///     }
///     fn resource_metadata(&self, _stack: &str, _resource: &str) -> Result<String> {
///         Ok("{}".to_string())
///     }
/// }
///
/// struct FixtureConnector;
/// impl StackConnector for FixtureConnector {
///     fn list_regions(&self) -> Result<Vec<String>> {
///         Ok(vec!["eu-west-1".to_string()])
///     }
///     fn connect(
///         &self,
///         _region: &str,
///         _credentials: &CredentialStrategy,
///     ) -> Result<Arc<dyn StackApi>> {
///         Ok(Arc::new(FixtureApi))
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let resolver = StackResolver::builder(BackendSettings::new("eu-west-1"))
///     .connector(Box::new(FixtureConnector))
///     .engine(Arc::new(StaticHierarchy::new(vec![
///         "cfstack/myapp/outputs".to_string(),
///     ])))
///     .build()?;
///
/// let answer = resolver.lookup("db_host", &Scope::new(), None, ResolutionMode::Scalar)?;
/// assert_eq!(answer, Some(serde_json::json!("db.internal")));
/// # Ok(())
/// # }
/// ```
pub struct StackResolver {
    settings: BackendSettings,
    engine: Arc<dyn HierarchyEngine>,
    registry: Arc<ConnectionRegistry>,
    output_cache: Arc<OutputCache>,
    metadata_cache: Arc<MetadataCache>,
}

impl StackResolver {
    /// Creates a builder for a resolver with the given settings.
    pub fn builder(settings: BackendSettings) -> StackResolverBuilder {
        StackResolverBuilder::new(settings)
    }

    /// Resolves `key` against the datasource hierarchy.
    ///
    /// The configured region is interpolated against `scope` and a
    /// connection is ensured for it before any datasource is tried. An
    /// `order_override` names a datasource the engine should try first.
    ///
    /// Returns `Ok(None)` when no datasource contributed a value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] for an unrecognized region,
    /// [`Error::TypeMismatch`] when a contribution does not fit `mode`, and
    /// any remote failure other than not-found, which is converted into a
    /// cached negative result instead.
    pub fn lookup(
        &self,
        key: &str,
        scope: &Scope,
        order_override: Option<&str>,
        mode: ResolutionMode,
    ) -> Result<Option<Value>> {
        // Lookups can come from agents in different regions; the configured
        // region may be a template interpolated per request.
        let region = self.engine.interpolate_str(&self.settings.region, scope);
        let api = self.registry.ensure(&region)?;

        let mut scalar: Option<Value> = None;
        let mut list: Vec<Value> = Vec::new();
        let mut mapping: Map<String, Value> = Map::new();
        let mut contributed = false;

        for identifier in self.engine.datasources(scope, order_override) {
            let (raw, is_metadata) = match DatasourceRef::parse(&identifier) {
                DatasourceRef::Outputs { stack } => {
                    debug!(region = %region, stack = %stack, key, "trying stack outputs");
                    (self.output_query(api.as_ref(), &region, &stack, key)?, false)
                }
                DatasourceRef::Resource { stack, resource } => {
                    debug!(
                        region = %region,
                        stack = %stack,
                        resource = %resource,
                        key,
                        "trying resource metadata"
                    );
                    (
                        self.metadata_query(api.as_ref(), &region, &stack, &resource, key)?,
                        true,
                    )
                }
                DatasourceRef::Unmatched => continue,
            };

            let Some(mut value) = raw else {
                continue;
            };

            if is_metadata && self.settings.parse_metadata {
                value = coerce_metadata(value);
            }
            let value = self.engine.interpolate(&value, scope);
            contributed = true;

            match mode {
                ResolutionMode::Scalar => {
                    scalar = Some(value);
                    break;
                }
                ResolutionMode::List => match value {
                    Value::Null | Value::Object(_) => {
                        return Err(Error::TypeMismatch {
                            key: key.to_string(),
                            expected: "sequence or scalar".to_string(),
                            actual: value_kind(&value).to_string(),
                        });
                    }
                    other => list.push(other),
                },
                ResolutionMode::Mapping => match value {
                    Value::Object(map) => {
                        mapping = self.engine.merge(map, mapping);
                    }
                    other => {
                        return Err(Error::TypeMismatch {
                            key: key.to_string(),
                            expected: "mapping".to_string(),
                            actual: value_kind(&other).to_string(),
                        });
                    }
                },
            }
        }

        Ok(match mode {
            ResolutionMode::Scalar => scalar,
            ResolutionMode::List => contributed.then(|| Value::Array(list)),
            ResolutionMode::Mapping => contributed.then(|| Value::Object(mapping)),
        })
    }

    /// Looks up `key` among the outputs of `stack`, fetching and caching the
    /// whole output set on a miss.
    fn output_query(
        &self,
        api: &dyn StackApi,
        region: &str,
        stack: &str,
        key: &str,
    ) -> Result<Option<Value>> {
        let cache_key = format!("{region}/{stack}");

        let outputs = match self.output_cache.get(&cache_key) {
            Some(cached) => cached,
            None => {
                debug!(stack, "stack outputs not cached, fetching");
                let fetched = match api.stack_outputs(stack) {
                    Ok(outputs) => Fetched::Found(outputs),
                    Err(e) if e.is_not_found() => {
                        debug!(stack, "stack outputs unavailable, caching negative result");
                        Fetched::NotFound
                    }
                    Err(e) => return Err(e),
                };
                self.output_cache.put(&cache_key, fetched.clone());
                fetched
            }
        };

        match outputs {
            Fetched::Found(outputs) => Ok(outputs
                .into_iter()
                .find(|output| output.key == key)
                .map(|output| Value::String(output.value))),
            Fetched::NotFound => Ok(None),
        }
    }

    /// Looks up `key` in the reserved metadata sub-object of one resource,
    /// fetching and caching the raw payload on a miss.
    fn metadata_query(
        &self,
        api: &dyn StackApi,
        region: &str,
        stack: &str,
        resource: &str,
        key: &str,
    ) -> Result<Option<Value>> {
        let cache_key = format!("{region}/{stack}/{resource}");

        let metadata = match self.metadata_cache.get(&cache_key) {
            Some(cached) => cached,
            None => {
                debug!(stack, resource, "resource metadata not cached, fetching");
                let fetched = match api.resource_metadata(stack, resource) {
                    Ok(raw) => Fetched::Found(raw),
                    Err(e) if e.is_not_found() => {
                        debug!(
                            stack,
                            resource, "resource metadata unavailable, caching negative result"
                        );
                        Fetched::NotFound
                    }
                    Err(e) => return Err(e),
                };
                self.metadata_cache.put(&cache_key, fetched.clone());
                fetched
            }
        };

        // The cache stores the opaque raw payload; the string-vs-structured
        // distinction is handled here and nowhere else.
        match metadata {
            Fetched::Found(raw) => {
                let data: Value = serde_json::from_str(&raw).map_err(|e| Error::Parse {
                    message: format!("metadata for '{stack}/{resource}' is not valid JSON"),
                    source: Some(Box::new(e)),
                })?;
                Ok(data
                    .get(METADATA_NAMESPACE)
                    .and_then(|overrides| overrides.get(key))
                    .cloned())
            }
            Fetched::NotFound => Ok(None),
        }
    }
}

/// Builder for constructing a [`StackResolver`].
///
/// The connector and engine are required; caches and registry default to
/// fresh instances sized by the settings' TTL, and can be replaced with
/// shared ones so several resolvers reuse warmed state.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use stacksource::domain::BackendSettings;
/// use stacksource::adapters::StaticHierarchy;
/// use stacksource::ports::StackConnector;
/// use stacksource::service::StackResolver;
///
/// # fn connector() -> Box<dyn StackConnector> { unimplemented!() }
/// # fn main() -> stacksource::domain::Result<()> {
/// let resolver = StackResolver::builder(BackendSettings::new("eu-west-1"))
///     .connector(connector())
///     .engine(Arc::new(StaticHierarchy::new(vec![])))
///     .build()?;
/// # let _ = resolver;
/// # Ok(())
/// # }
/// ```
pub struct StackResolverBuilder {
    settings: BackendSettings,
    connector: Option<Box<dyn StackConnector>>,
    engine: Option<Arc<dyn HierarchyEngine>>,
    registry: Option<Arc<ConnectionRegistry>>,
    output_cache: Option<Arc<OutputCache>>,
    metadata_cache: Option<Arc<MetadataCache>>,
}

impl StackResolverBuilder {
    /// Creates a builder with the given settings.
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings,
            connector: None,
            engine: None,
            registry: None,
            output_cache: None,
            metadata_cache: None,
        }
    }

    /// Sets the connector used to validate regions and build connections.
    pub fn connector(mut self, connector: Box<dyn StackConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the hierarchy engine.
    pub fn engine(mut self, engine: Arc<dyn HierarchyEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Uses an existing connection registry instead of building one.
    ///
    /// Takes precedence over [`connector`](StackResolverBuilder::connector).
    pub fn registry(mut self, registry: Arc<ConnectionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses a shared output cache instead of a fresh one.
    pub fn output_cache(mut self, cache: Arc<OutputCache>) -> Self {
        self.output_cache = Some(cache);
        self
    }

    /// Uses a shared metadata cache instead of a fresh one.
    pub fn metadata_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.metadata_cache = Some(cache);
        self
    }

    /// Builds the resolver.
    ///
    /// # Errors
    ///
    /// [`Error::MissingConfig`] if neither a registry nor a connector was
    /// provided, or no engine was set.
    pub fn build(self) -> Result<StackResolver> {
        let ttl = self.settings.cache_ttl;

        let registry = match (self.registry, self.connector) {
            (Some(registry), _) => registry,
            (None, Some(connector)) => Arc::new(ConnectionRegistry::new(
                connector,
                self.settings.credentials.clone(),
            )),
            (None, None) => {
                return Err(Error::MissingConfig {
                    key: "connector".to_string(),
                })
            }
        };

        let engine = self.engine.ok_or_else(|| Error::MissingConfig {
            key: "hierarchy engine".to_string(),
        })?;

        Ok(StackResolver {
            settings: self.settings,
            engine,
            registry,
            output_cache: self
                .output_cache
                .unwrap_or_else(|| Arc::new(TtlCache::new(ttl))),
            metadata_cache: self
                .metadata_cache
                .unwrap_or_else(|| Arc::new(TtlCache::new(ttl))),
        })
    }
}
