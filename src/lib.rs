// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hierarchical configuration backend for cloud stack data.
//!
//! This crate resolves configuration keys against a remote
//! infrastructure-description service: the published outputs of deployed
//! stacks and the metadata annotations attached to individual stack
//! resources. A surrounding hierarchy engine supplies an ordered list of
//! datasource identifiers (most specific first) and this backend tries each
//! one in turn, short-circuiting or accumulating according to the requested
//! resolution mode.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and pure logic (`DatasourceRef`, metadata
//!   coercion, errors, settings)
//! - **Ports**: Trait definitions that define interfaces (`StackApi`,
//!   `StackConnector`, `HierarchyEngine`)
//! - **Adapters**: The shared TTL cache, the per-region connection registry,
//!   a self-contained hierarchy engine, and an HTTP remote adapter
//! - **Service**: The `StackResolver` that orchestrates everything
//!
//! # Features
//!
//! - **Hierarchy walking**: scalar (first match wins), list (accumulate all
//!   matches), and mapping (merge all matches) resolution modes
//! - **Bounded caching**: remote results, including negative ones, are cached
//!   with a time-to-live and shared across concurrent lookups
//! - **Connection reuse**: at most one remote connection per region, created
//!   lazily and validated against the service's own region list
//! - **Credential strategies**: explicit key pair, named profile, or ambient
//!   instance credentials, in that priority order
//!
//! # Feature Flags
//!
//! - `http`: Enable the blocking HTTP remote adapter (`reqwest`)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stacksource::prelude::*;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # fn connector() -> Box<dyn StackConnector> { unimplemented!() }
//! # fn main() -> stacksource::domain::Result<()> {
//! let mut config = HashMap::new();
//! config.insert("region".to_string(), "eu-west-1".to_string());
//! let settings = BackendSettings::from_map(&config)?;
//!
//! let engine = Arc::new(StaticHierarchy::new(vec![
//!     "cfstack/%{environment}-app/outputs".to_string(),
//!     "cfstack/common/outputs".to_string(),
//! ]));
//!
//! let resolver = StackResolver::builder(settings)
//!     .connector(connector())
//!     .engine(engine)
//!     .build()?;
//!
//! let mut scope = HashMap::new();
//! scope.insert("environment".to_string(), "prod".to_string());
//! let answer = resolver.lookup("db_host", &scope, None, ResolutionMode::Scalar)?;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        BackendSettings, CredentialStrategy, DatasourceRef, Error, ResolutionMode, Result,
    };
    pub use crate::ports::{HierarchyEngine, Scope, StackApi, StackConnector, StackOutput};

    #[cfg(feature = "http")]
    pub use crate::adapters::HttpConnector;
    pub use crate::adapters::{ConnectionRegistry, Fetched, StaticHierarchy, TtlCache};

    pub use crate::service::{StackResolver, StackResolverBuilder};
}
