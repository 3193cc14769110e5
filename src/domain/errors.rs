// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the backend.
//!
//! This module defines the error types that can occur when resolving keys
//! against the remote stack service. All errors use `thiserror` for proper
//! error handling and conversion.

use thiserror::Error;

/// The main error type for lookup operations.
///
/// This enum represents all possible errors that can occur while resolving a
/// key against the datasource hierarchy. It is marked as `#[non_exhaustive]`
/// to allow for future additions without breaking backwards compatibility.
///
/// The two not-found variants are special: the resolver catches them,
/// records a negative cache entry, and moves on to the next datasource.
/// Every other remote failure propagates to the caller untouched; this
/// backend performs no retry or backoff of its own.
///
/// # Examples
///
/// ```
/// use stacksource::domain::errors::Error;
///
/// fn require_region() -> Result<String, Error> {
///     Err(Error::MissingConfig {
///         key: "region".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required configuration key was absent at initialization.
    #[error("missing required configuration key: {key}")]
    MissingConfig {
        /// The configuration key that was missing
        key: String,
    },

    /// A region name was supplied that the remote service does not recognize.
    ///
    /// Proceeding with an unrecognized region would produce a malformed
    /// endpoint and opaque network failures, so connection creation refuses
    /// it up front.
    #[error("'{region}' is not a recognized deployment region")]
    InvalidRegion {
        /// The offending region name
        region: String,
    },

    /// A datasource yielded a value incompatible with the requested
    /// resolution mode.
    #[error("type mismatch for key '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// The key being resolved
        key: String,
        /// The shape the resolution mode required
        expected: String,
        /// The shape the datasource actually produced
        actual: String,
    },

    /// The remote service reported that a stack does not exist.
    #[error("stack '{stack}' not found")]
    StackNotFound {
        /// The stack that could not be found
        stack: String,
    },

    /// The remote service reported that a resource does not exist within a
    /// stack (or the stack itself is gone).
    #[error("resource '{resource}' not found in stack '{stack}'")]
    ResourceNotFound {
        /// The stack that was queried
        stack: String,
        /// The resource that could not be found
        resource: String,
    },

    /// Any other failure talking to the remote service (network, auth,
    /// throttling). Never retried here.
    #[error("remote service error: {message}")]
    Remote {
        /// The error message
        message: String,
        /// The underlying transport error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A payload from the remote service could not be parsed.
    #[error("failed to parse remote payload: {message}")]
    Parse {
        /// The error message
        message: String,
        /// The underlying parsing error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Returns `true` for the not-found variants that the resolver converts
    /// into cached negative results instead of propagating.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacksource::domain::errors::Error;
    ///
    /// let err = Error::StackNotFound { stack: "myapp".to_string() };
    /// assert!(err.is_not_found());
    ///
    /// let err = Error::Remote { message: "connection reset".to_string(), source: None };
    /// assert!(!err.is_not_found());
    /// ```
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::StackNotFound { .. } | Error::ResourceNotFound { .. }
        )
    }
}

/// A specialized Result type for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;
