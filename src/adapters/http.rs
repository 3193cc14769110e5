// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking HTTP adapter for the remote stack service.
//!
//! This adapter speaks a JSON description protocol over HTTP:
//!
//! - `GET {base}/regions` returns the deployment region list
//! - `GET {base}/{region}/stacks/{stack}/outputs` returns published outputs
//! - `GET {base}/{region}/stacks/{stack}/resources/{id}/metadata` returns the raw
//!   metadata payload of one resource
//!
//! A 404, or a 400 whose body carries a `ValidationError` marker, means the
//! stack or resource does not exist; everything else propagates as a remote
//! error. All requests block the calling thread.

use crate::domain::{CredentialStrategy, Error, Result};
use crate::ports::{StackApi, StackConnector, StackOutput};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable consulted for ambient credentials.
pub const ENV_ACCESS_KEY_ID: &str = "STACKSOURCE_ACCESS_KEY_ID";
/// Environment variable consulted for the ambient secret.
pub const ENV_SECRET_ACCESS_KEY: &str = "STACKSOURCE_SECRET_ACCESS_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct RegionsResponse {
    regions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    access_key_id: String,
    secret_access_key: String,
}

/// Connector for a stack service reachable over HTTP.
///
/// # Examples
///
/// ```rust,no_run
/// use stacksource::adapters::HttpConnector;
/// use stacksource::domain::CredentialStrategy;
/// use stacksource::ports::StackConnector;
///
/// # fn main() -> stacksource::domain::Result<()> {
/// let connector = HttpConnector::new("https://stacks.example.com")?;
/// let regions = connector.list_regions()?;
/// let api = connector.connect(&regions[0], &CredentialStrategy::Ambient)?;
/// # let _ = api;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpConnector {
    base_url: String,
    client: Client,
    credentials_file: Option<PathBuf>,
}

impl HttpConnector {
    /// Creates a connector for the service at `base_url`.
    ///
    /// A trailing slash on the base URL is tolerated and stripped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Remote {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credentials_file: None,
        })
    }

    /// Overrides the credentials file consulted for profile credentials.
    ///
    /// By default profiles are read from `credentials.json` in the user's
    /// configuration directory for this crate.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    fn credentials_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.credentials_file {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", "stacksource").ok_or_else(|| {
            Error::MissingConfig {
                key: "credentials file location".to_string(),
            }
        })?;
        Ok(dirs.config_dir().join("credentials.json"))
    }

    /// Resolves a credential strategy to an optional basic-auth key pair.
    ///
    /// Ambient credentials fall back to the environment; absent there, the
    /// request is sent unauthenticated and the transport's own identity (an
    /// instance role, typically) is assumed to apply.
    fn resolve_credentials(
        &self,
        credentials: &CredentialStrategy,
    ) -> Result<Option<(String, String)>> {
        match credentials {
            CredentialStrategy::Explicit {
                access_key_id,
                secret_access_key,
            } => Ok(Some((access_key_id.clone(), secret_access_key.clone()))),
            CredentialStrategy::Profile { name } => {
                let path = self.credentials_path()?;
                let raw = std::fs::read_to_string(&path).map_err(|_| Error::MissingConfig {
                    key: format!("credentials file {}", path.display()),
                })?;
                let profiles: HashMap<String, ProfileEntry> =
                    serde_json::from_str(&raw).map_err(|e| Error::Parse {
                        message: format!("credentials file {} is not valid JSON", path.display()),
                        source: Some(Box::new(e)),
                    })?;
                let entry = profiles.get(name).ok_or_else(|| Error::MissingConfig {
                    key: format!("credentials profile '{name}'"),
                })?;
                Ok(Some((
                    entry.access_key_id.clone(),
                    entry.secret_access_key.clone(),
                )))
            }
            CredentialStrategy::Ambient => {
                match (
                    std::env::var(ENV_ACCESS_KEY_ID),
                    std::env::var(ENV_SECRET_ACCESS_KEY),
                ) {
                    (Ok(id), Ok(secret)) => Ok(Some((id, secret))),
                    _ => Ok(None),
                }
            }
        }
    }
}

impl StackConnector for HttpConnector {
    fn list_regions(&self) -> Result<Vec<String>> {
        let url = format!("{}/regions", self.base_url);
        debug!(%url, "fetching region list");

        let response = self.client.get(&url).send().map_err(remote_error)?;
        let response = check_status(response, None, None)?;
        let body: RegionsResponse = response.json().map_err(|e| Error::Parse {
            message: "region list payload is not valid JSON".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(body.regions)
    }

    fn connect(&self, region: &str, credentials: &CredentialStrategy) -> Result<Arc<dyn StackApi>> {
        let auth = self.resolve_credentials(credentials)?;
        Ok(Arc::new(HttpStackApi {
            base_url: self.base_url.clone(),
            region: region.to_string(),
            client: self.client.clone(),
            auth,
        }))
    }
}

/// A connection to one region of an HTTP stack service.
#[derive(Debug)]
pub struct HttpStackApi {
    base_url: String,
    region: String,
    client: Client,
    auth: Option<(String, String)>,
}

impl HttpStackApi {
    fn get(&self, url: &str) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some((id, secret)) = &self.auth {
            request = request.basic_auth(id, Some(secret));
        }
        request.send().map_err(remote_error)
    }
}

impl StackApi for HttpStackApi {
    fn region(&self) -> &str {
        &self.region
    }

    fn stack_outputs(&self, stack: &str) -> Result<Vec<StackOutput>> {
        let url = format!("{}/{}/stacks/{}/outputs", self.base_url, self.region, stack);
        debug!(%url, "fetching stack outputs");

        let response = check_status(self.get(&url)?, Some(stack), None)?;
        response.json().map_err(|e| Error::Parse {
            message: format!("outputs payload for stack '{stack}' is not valid JSON"),
            source: Some(Box::new(e)),
        })
    }

    fn resource_metadata(&self, stack: &str, resource: &str) -> Result<String> {
        let url = format!(
            "{}/{}/stacks/{}/resources/{}/metadata",
            self.base_url, self.region, stack, resource
        );
        debug!(%url, "fetching resource metadata");

        let response = check_status(self.get(&url)?, Some(stack), Some(resource))?;
        response.text().map_err(|e| Error::Remote {
            message: format!("failed to read metadata payload for '{stack}/{resource}'"),
            source: Some(Box::new(e)),
        })
    }
}

fn remote_error(e: reqwest::Error) -> Error {
    Error::Remote {
        message: format!("request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Maps not-found style responses onto the not-found error variants and any
/// other non-success status onto a remote error.
fn check_status(
    response: Response,
    stack: Option<&str>,
    resource: Option<&str>,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let validation_failed =
        status == StatusCode::NOT_FOUND || (status == StatusCode::BAD_REQUEST && body.contains("ValidationError"));

    if validation_failed {
        if let Some(stack) = stack {
            return Err(match resource {
                Some(resource) => Error::ResourceNotFound {
                    stack: stack.to_string(),
                    resource: resource.to_string(),
                },
                None => Error::StackNotFound {
                    stack: stack.to_string(),
                },
            });
        }
    }

    Err(Error::Remote {
        message: format!("unexpected status {status}: {body}"),
        source: None,
    })
}
