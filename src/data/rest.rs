use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

use super::types::{StockDetailsResponse, StockInfo, TierDetailsResponse};

/// Client for the IPO data API. Thin pass-through queries, no caching:
/// the engine treats every response as an immutable snapshot.
pub struct IpoRest {
    client: Client,
    base_url: String,
}

impl IpoRest {
    pub fn new(base_url: &str, request_timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(request_timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full stock list, newest subscription deadline first.
    pub async fn get_stocks(&self) -> Result<Vec<StockInfo>> {
        let url = format!("{}/api/stocks", self.base_url);
        let resp = self.client.get(&url).send().await.context("GET stocks failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET stocks failed ({}): {}", status, body);
        }
        resp.json().await.context("failed to parse stock list")
    }

    /// Look up one stock by code. `Ok(None)` when the API reports 404.
    pub async fn get_stock_by_code(&self, code: &str) -> Result<Option<StockInfo>> {
        Ok(self.get_stock_details(code).await?.map(|d| d.stock_info))
    }

    /// Subscription details plus raw tier results for a stock.
    pub async fn get_stock_details(&self, code: &str) -> Result<Option<StockDetailsResponse>> {
        let url = format!("{}/api/stock-details/{}", self.base_url, code);
        self.get_optional(&url, "stock details").await
    }

    /// Pre-joined tier rows for the strategy comparator.
    pub async fn get_tier_details(&self, code: &str) -> Result<Option<TierDetailsResponse>> {
        let url = format!("{}/api/tier-details/{}", self.base_url, code);
        self.get_optional(&url, "tier details").await
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<Option<T>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {what} failed"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} failed ({}): {}", what, status, body);
        }
        let parsed = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {what} response"))?;
        Ok(Some(parsed))
    }
}
