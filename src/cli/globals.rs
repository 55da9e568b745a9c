use crate::access::{AccessClient, ClientConfig, FileTokenStore};
use anyhow::{Context, Result, anyhow};
use std::{path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: Option<Url>,
    pub store_path: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url: None,
            store_path: store_path.into(),
            timeout: crate::access::client::DEFAULT_TIMEOUT,
        }
    }

    /// # Errors
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn set_api_url(&mut self, api_url: &str) -> Result<()> {
        let url = Url::parse(api_url.trim()).with_context(|| format!("invalid API URL: {api_url}"))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("unsupported API URL scheme: {scheme}")),
        }
        if url.host().is_none() {
            return Err(anyhow!("invalid API URL: no host specified"));
        }
        self.api_url = Some(url);
        Ok(())
    }

    /// Fresh handle on the origin's token file; nothing is cached between calls.
    #[must_use]
    pub fn store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.store_path)
    }

    /// # Errors
    /// Returns an error if no API URL was configured or the client cannot be built.
    pub fn client(&self) -> Result<AccessClient> {
        let base_url = self
            .api_url
            .clone()
            .context("missing required argument: --api-url")?;
        let config = ClientConfig::new(base_url).with_timeout(self.timeout);
        Ok(AccessClient::new(config)?)
    }
}
