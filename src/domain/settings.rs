// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend settings and credential strategy.
//!
//! Process configuration is assumed to be parsed into a flat key/value map
//! before this backend runs; [`BackendSettings::from_map`] consumes that map
//! once at initialization. The credential fallthrough of the settings map is
//! resolved here into a named strategy so the priority order is visible and
//! testable rather than buried in an if-chain.

use crate::domain::errors::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

/// The default expiration window for cached remote results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// How connections authenticate against the remote service.
///
/// Exactly one strategy is selected at initialization, in priority order:
/// an explicit key pair wins over a named profile, and a profile wins over
/// ambient instance credentials. The selection is immutable for the process
/// lifetime and shared read-only by every connection.
///
/// # Examples
///
/// ```
/// use stacksource::domain::CredentialStrategy;
///
/// let strategy = CredentialStrategy::resolve(
///     Some("AKIDEXAMPLE"),
///     Some("secret"),
///     Some("ops"),
/// );
/// // Explicit keys win over the profile.
/// assert!(matches!(strategy, CredentialStrategy::Explicit { .. }));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// An explicit access key id and secret access key.
    Explicit {
        /// The access key id
        access_key_id: String,
        /// The secret access key
        secret_access_key: String,
    },
    /// A named credentials profile resolved by the connector.
    Profile {
        /// The profile name
        name: String,
    },
    /// No explicit secret material; the transport relies on whatever the
    /// execution environment provides (an instance role, typically).
    Ambient,
}

impl CredentialStrategy {
    /// Selects a strategy from the optional settings values.
    ///
    /// Both halves of the key pair must be present for the explicit strategy
    /// to apply; a lone access key id falls through to the profile, and a
    /// missing profile falls through to ambient credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacksource::domain::CredentialStrategy;
    ///
    /// assert_eq!(
    ///     CredentialStrategy::resolve(None, None, Some("ops")),
    ///     CredentialStrategy::Profile { name: "ops".to_string() }
    /// );
    /// assert_eq!(
    ///     CredentialStrategy::resolve(Some("AKID"), None, None),
    ///     CredentialStrategy::Ambient
    /// );
    /// ```
    pub fn resolve(
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        profile: Option<&str>,
    ) -> Self {
        match (access_key_id, secret_access_key, profile) {
            (Some(id), Some(secret), _) => CredentialStrategy::Explicit {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
            },
            (_, _, Some(name)) => CredentialStrategy::Profile {
                name: name.to_string(),
            },
            _ => CredentialStrategy::Ambient,
        }
    }
}

/// Validated backend settings.
///
/// Constructed once at startup and shared by reference; the region value may
/// itself be a template expression interpolated per lookup against the
/// request scope.
#[derive(Clone, Debug)]
pub struct BackendSettings {
    /// The region to connect to. May contain interpolation placeholders.
    pub region: String,
    /// How connections authenticate.
    pub credentials: CredentialStrategy,
    /// Whether stringified metadata primitives are converted back to native
    /// values on metadata lookups.
    pub parse_metadata: bool,
    /// Expiration window for cached remote results.
    pub cache_ttl: Duration,
}

impl BackendSettings {
    /// Creates settings with a region and defaults for everything else:
    /// ambient credentials, no metadata coercion, 60-second cache TTL.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacksource::domain::{BackendSettings, CredentialStrategy};
    ///
    /// let settings = BackendSettings::new("eu-west-1");
    /// assert_eq!(settings.region, "eu-west-1");
    /// assert_eq!(settings.credentials, CredentialStrategy::Ambient);
    /// assert!(!settings.parse_metadata);
    /// ```
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: CredentialStrategy::Ambient,
            parse_metadata: false,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Builds settings from an already-parsed configuration map.
    ///
    /// Recognized keys: `region` (required), `access_key_id` and
    /// `secret_access_key`, `profile`, `parse_metadata` (boolean, default
    /// false), `cache_ttl` (seconds, default 60). A missing `region` is a
    /// configuration error raised here, before any lookup runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use stacksource::domain::{BackendSettings, CredentialStrategy};
    ///
    /// let mut map = HashMap::new();
    /// map.insert("region".to_string(), "eu-west-1".to_string());
    /// map.insert("profile".to_string(), "ops".to_string());
    /// map.insert("parse_metadata".to_string(), "true".to_string());
    ///
    /// let settings = BackendSettings::from_map(&map).unwrap();
    /// assert_eq!(settings.credentials, CredentialStrategy::Profile { name: "ops".to_string() });
    /// assert!(settings.parse_metadata);
    /// ```
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let region = map.get("region").ok_or_else(|| Error::MissingConfig {
            key: "region".to_string(),
        })?;

        let credentials = CredentialStrategy::resolve(
            map.get("access_key_id").map(String::as_str),
            map.get("secret_access_key").map(String::as_str),
            map.get("profile").map(String::as_str),
        );

        let parse_metadata = match map.get("parse_metadata") {
            Some(raw) => parse_flag(raw),
            None => false,
        };

        let cache_ttl = match map.get("cache_ttl") {
            Some(raw) => {
                let seconds = raw.parse::<u64>().map_err(|e| Error::Parse {
                    message: format!("cache_ttl '{raw}' is not a number of seconds"),
                    source: Some(Box::new(e)),
                })?;
                Duration::from_secs(seconds)
            }
            None => DEFAULT_CACHE_TTL,
        };

        Ok(Self {
            region: region.clone(),
            credentials,
            parse_metadata,
            cache_ttl,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}
