//! Waypoint HTTP Client
//!
//! Typed access to the hosted services Waypoint depends on:
//! - the extension data service, a key/value document store with
//!   optimistic concurrency (see [`ExtensionDataClient`])
//! - the organization's project, pipeline and environment listings
//!
//! The store is consumed through the [`DocumentStore`] trait so the metadata
//! reader and writer can run against [`InMemoryDocumentStore`] in tests.
//!
//! # Example
//!
//! ```no_run
//! use waypoint_client::{DevOpsClient, ExtensionDataClient, StoreScope, DocumentStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DevOpsClient::new("https://dev.azure.com/contoso", "token");
//!     let store = ExtensionDataClient::new(client, StoreScope::new("contoso", "waypoint"));
//!
//!     let doc = store.get_document("P:pipeline-metadata:7", "2").await?;
//!     println!("{:?}", doc);
//!     Ok(())
//! }
//! ```

pub mod catalog;
mod documents;
mod environments;
pub mod error;
pub mod memory;
mod pipelines;
mod projects;
pub mod store;

pub use catalog::PipelineCatalog;
pub use documents::{ExtensionDataClient, StoreScope};
pub use error::{ClientError, Result};
pub use memory::InMemoryDocumentStore;
pub use store::DocumentStore;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

/// HTTP client for an organization's REST API
///
/// Holds the organization URL and the bearer token every request is
/// authenticated with. Endpoint groups live in their own modules.
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    /// Organization URL (e.g., "https://dev.azure.com/contoso")
    base_url: String,
    /// Bearer token (a pipeline's System.AccessToken or a PAT)
    token: String,
    /// HTTP client instance
    client: Client,
}

impl DevOpsClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The organization URL
    /// * `token` - Bearer token used for every request
    ///
    /// # Example
    /// ```
    /// use waypoint_client::DevOpsClient;
    ///
    /// let client = DevOpsClient::new("https://dev.azure.com/contoso/", "token");
    /// assert_eq!(client.base_url(), "https://dev.azure.com/contoso");
    /// ```
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the organization URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Building
    // =============================================================================

    /// Build an endpoint URL by appending path segments to the organization URL
    ///
    /// Segments are percent-encoded, so collection names and project names
    /// can be passed through verbatim.
    fn endpoint<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!(
                "Invalid organization URL '{}': {}",
                self.base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!(
                    "Organization URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// 409 and 412 are reported as [`ClientError::Conflict`], the only
    /// failure a caller is expected to recover from.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(match status {
                StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                    ClientError::Conflict(error_text)
                }
                _ => ClientError::api_error(status.as_u16(), error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = DevOpsClient::new("https://dev.azure.com/contoso/", "t");
        assert_eq!(client.base_url(), "https://dev.azure.com/contoso");
    }

    #[test]
    fn test_endpoint_appends_encoded_segments() {
        let client = DevOpsClient::new("https://dev.azure.com/contoso", "t");
        let url = client
            .endpoint(["my project", "_apis", "pipelines"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/contoso/my%20project/_apis/pipelines"
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let client = DevOpsClient::new("not a url", "t");
        let err = client.endpoint(["_apis"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
