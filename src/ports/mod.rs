// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) that define the
//! interfaces for the remote stack service and for the surrounding hierarchy
//! engine. These traits are implemented by adapters in the adapters layer
//! (and by mocks in tests).

pub mod connector;
pub mod hierarchy;
pub mod stack_api;

// Re-export commonly used types
pub use connector::StackConnector;
pub use hierarchy::{HierarchyEngine, Scope};
pub use stack_api::{StackApi, StackOutput};
