// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the resolver.
//!
//! This module contains the `StackResolver`, the orchestrator that walks the
//! datasource hierarchy and combines contributions into an answer.

pub mod resolver;

// Re-export commonly used types
pub use resolver::{StackResolver, StackResolverBuilder};
