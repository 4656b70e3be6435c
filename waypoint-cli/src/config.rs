//! Configuration module
//!
//! Connection settings shared by every command.

use anyhow::{Context, bail};
use reqwest::Url;
use waypoint_client::{DevOpsClient, ExtensionDataClient, StoreScope};

const HOSTED_HOST: &str = "dev.azure.com";
const LEGACY_HOST_SUFFIX: &str = ".visualstudio.com";
const STORE_HOST_LABEL: &str = "extmgmt";

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Organization URL (e.g., "https://dev.azure.com/contoso")
    pub organization_url: String,

    /// Bearer token sent with every request
    pub token: String,

    /// Explicit extension data service URL, overriding the derived one
    pub store_url: Option<String>,

    /// Extension publisher owning the document store
    pub publisher: String,

    /// Extension id owning the document store
    pub extension_id: String,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token.trim().is_empty() {
            bail!("token cannot be empty");
        }

        if !is_http_url(&self.organization_url) {
            bail!("organization URL must start with http:// or https://");
        }

        if let Some(store_url) = &self.store_url {
            if !is_http_url(store_url) {
                bail!("store URL must start with http:// or https://");
            }
        }

        if self.publisher.is_empty() {
            bail!("publisher cannot be empty");
        }

        if self.extension_id.is_empty() {
            bail!("extension id cannot be empty");
        }

        self.store_url().map(|_| ())
    }

    pub fn client(&self) -> DevOpsClient {
        DevOpsClient::new(&self.organization_url, &self.token)
    }

    /// URL of the extension data service
    ///
    /// Hosted organizations serve extension data from a separate host:
    /// `dev.azure.com/{org}` becomes `extmgmt.dev.azure.com/{org}` and
    /// `{org}.visualstudio.com` becomes `{org}.extmgmt.visualstudio.com`.
    /// Any other URL (an on-premises server) serves it itself.
    pub fn store_url(&self) -> anyhow::Result<String> {
        if let Some(store_url) = &self.store_url {
            return Ok(store_url.clone());
        }

        let mut url = Url::parse(&self.organization_url)
            .with_context(|| format!("Invalid organization URL '{}'", self.organization_url))?;
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        let store_host = if host == HOSTED_HOST {
            Some(format!("{STORE_HOST_LABEL}.{HOSTED_HOST}"))
        } else if let Some(org) = host.strip_suffix(LEGACY_HOST_SUFFIX) {
            (!org.ends_with(STORE_HOST_LABEL))
                .then(|| format!("{org}.{STORE_HOST_LABEL}{LEGACY_HOST_SUFFIX}"))
        } else {
            None
        };

        if let Some(store_host) = store_host {
            url.set_host(Some(&store_host))
                .with_context(|| format!("Cannot derive store host from '{}'", host))?;
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    /// Document store client scoped to the extension
    pub fn store(&self) -> anyhow::Result<ExtensionDataClient> {
        Ok(ExtensionDataClient::new(
            DevOpsClient::new(self.store_url()?, &self.token),
            StoreScope::new(&self.publisher, &self.extension_id),
        ))
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
