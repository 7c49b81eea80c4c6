//! Overpass API client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::OverpassQuery;
use crate::models::OverpassResponse;

pub const DEFAULT_ENDPOINT: &str = "http://overpass-api.de/api/interpreter";

pub(crate) const USER_AGENT: &str = concat!("poimap/", env!("CARGO_PKG_VERSION"));

/// Issues Overpass queries. One request per call; failures are returned as-is.
pub struct OverpassClient {
    client: Client,
    endpoint: Url,
}

impl OverpassClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid Overpass endpoint {}", endpoint))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, endpoint })
    }

    /// Request URL carrying the query in the `data` parameter
    pub fn request_url(&self, query: &OverpassQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("data", &query.to_string());
        url
    }

    pub async fn fetch(&self, query: &OverpassQuery) -> Result<OverpassResponse> {
        info!(
            "Querying Overpass for {}={} in {}",
            query.key, query.value, query.area
        );
        debug!("Overpass query:\n{}", query);

        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .context("Overpass request failed")?
            .error_for_status()
            .context("Overpass returned an error status")?;

        let data: OverpassResponse = response
            .json()
            .await
            .context("Failed to parse Overpass response")?;

        if let Some(remark) = &data.remark {
            warn!("Overpass remark: {}", remark);
        }
        info!("Received {} elements", data.elements.len());

        Ok(data)
    }
}
