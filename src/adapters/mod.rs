// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing concrete implementations.
//!
//! This module contains the shared TTL cache, the per-region connection
//! registry, a self-contained hierarchy engine, and the feature-gated HTTP
//! adapter for the remote stack service.

#[cfg(feature = "http")]
pub mod http;
pub mod registry;
pub mod static_hierarchy;
pub mod ttl_cache;

// Re-export adapters
#[cfg(feature = "http")]
pub use http::{HttpConnector, HttpStackApi};
pub use registry::ConnectionRegistry;
pub use static_hierarchy::StaticHierarchy;
pub use ttl_cache::{Fetched, TtlCache};
