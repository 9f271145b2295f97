//! The remote catalog of publishable Go versions.

use crate::error::Result;
use crate::version;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The go.dev download listing, sorted by the server from newest to oldest.
pub const DEFAULT_CATALOG_URL: &str = "https://go.dev/dl/?mode=json&include=all";

#[derive(Debug, Deserialize)]
struct Release {
    version: String,
    // present in the feed but unused: unstable releases are listed too.
    #[serde(default)]
    #[allow(dead_code)]
    stable: bool,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// All known versions, newest first, with the synthetic `tip` entry at
    /// the front.
    async fn versions(&self) -> Result<Vec<String>>;
}

/// The production [`Catalog`] that queries go.dev over HTTP.
pub struct GoDevCatalog {
    client: Client,
    url: String,
}

impl GoDevCatalog {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Catalog for GoDevCatalog {
    async fn versions(&self) -> Result<Vec<String>> {
        debug!("fetching version catalog from {}", self.url);

        let releases: Vec<Release> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut versions = Vec::with_capacity(releases.len() + 1);
        versions.push(version::TIP.to_string());
        for release in releases {
            let v = release.version.strip_prefix("go").unwrap_or(&release.version);
            versions.push(v.to_string());
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_versions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dl/")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"version":"go1.20","stable":true},{"version":"go1.20rc3","stable":false},{"version":"go1.19.5"}]"#,
            )
            .create_async()
            .await;

        let url = format!("{}/dl/?mode=json&include=all", server.url());
        let catalog = GoDevCatalog::new(&url, Duration::from_secs(5)).unwrap();
        let versions = catalog.versions().await.unwrap();

        mock.assert_async().await;
        assert_eq!(versions, vec!["tip", "1.20", "1.20rc3", "1.19.5"]);
    }

    #[tokio::test]
    async fn test_versions_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dl/")
            .match_query(mockito::Matcher::Any)
            .with_body("not json")
            .create_async()
            .await;

        let url = format!("{}/dl/", server.url());
        let catalog = GoDevCatalog::new(&url, Duration::from_secs(5)).unwrap();
        assert!(catalog.versions().await.is_err());
    }
}
