use std::future::Future;
use std::time::Duration;

use crate::catalog::error::CatalogError;

pub const DEFAULT_BASE_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";

/// Read-only access to the catalog service, one call per group.
pub trait CatalogSource: Send + Sync {
    /// Raw payload for `group`; non-success statuses are errors.
    fn fetch_group(
        &self,
        group: &str,
    ) -> impl Future<Output = Result<String, CatalogError>> + Send;
}

pub struct CelestrakSource {
    client: reqwest::Client,
    base_url: String,
}

impl CelestrakSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sat-o-view/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CatalogSource for CelestrakSource {
    async fn fetch_group(&self, group: &str) -> Result<String, CatalogError> {
        log::info!("Fetching data for group: {}", group);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("GROUP", group), ("FORMAT", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                group: group.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
