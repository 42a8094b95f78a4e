use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;

const USER_AGENT: &str = concat!("floorbook/", env!("CARGO_PKG_VERSION"));

/// One page of Reservoir ask orders plus the cursor for the next page.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersPage {
    #[serde(default)]
    pub orders: Vec<Value>,
    #[serde(default)]
    pub continuation: Option<String>,
}

/// One page of Reservoir trades plus the cursor for the next page.
#[derive(Debug, Default, Deserialize)]
pub struct TradesPage {
    #[serde(default)]
    pub trades: Vec<Value>,
    #[serde(default)]
    pub continuation: Option<String>,
}

/// Thin Reservoir API client. Owns the key and the page size; pagination
/// policy (how many pages, what to do with a cursor) belongs to the caller.
pub struct ReservoirClient {
    http: reqwest::Client,
    base: String,
    api_key: String,
    page_limit: usize,
}

impl ReservoirClient {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let env_name = cfg.reservoir.api_key_env.trim();
        let api_key = std::env::var(env_name)
            .with_context(|| format!("missing API key env var: {env_name}"))?;
        let http = build_http(cfg)?;
        Ok(Self {
            http,
            base: cfg.reservoir.api_base.trim_end_matches('/').to_string(),
            api_key,
            page_limit: cfg.reservoir.page_limit,
        })
    }

    pub async fn open_asks(
        &self,
        contract: &str,
        continuation: Option<&str>,
    ) -> anyhow::Result<OrdersPage> {
        let url = format!("{}/orders/asks/v3", self.base);
        let mut query: Vec<(&str, String)> = vec![
            ("contracts", contract.to_string()),
            ("limit", self.page_limit.to_string()),
        ];
        if let Some(c) = continuation {
            query.push(("continuation", c.to_string()));
        }
        let resp = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("asks request for {contract}"))?;
        resp.json().await.context("decode asks page")
    }

    pub async fn trades(
        &self,
        contract: &str,
        continuation: Option<&str>,
    ) -> anyhow::Result<TradesPage> {
        let url = format!("{}/trades/v1", self.base);
        let mut query: Vec<(&str, String)> = vec![
            ("contract", contract.to_string()),
            ("limit", self.page_limit.to_string()),
        ];
        if let Some(c) = continuation {
            query.push(("continuation", c.to_string()));
        }
        let resp = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("trades request for {contract}"))?;
        resp.json().await.context("decode trades page")
    }

    /// Lowest current ask for the collection, rounded to an integer ETH
    /// value (the ask report band is [floor, 3*floor]).
    pub async fn floor_price(&self, contract: &str) -> anyhow::Result<i64> {
        let url = format!("{}/collections/v5", self.base);
        let resp = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .query(&[("id", contract)])
            .send()
            .await
            .with_context(|| format!("collection request for {contract}"))?;
        let body: Value = resp.json().await.context("decode collection")?;
        let price = body
            .get("collections")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("floorAsk"))
            .and_then(|f| f.get("price"))
            .and_then(Value::as_f64)
            .with_context(|| format!("no floor ask for {contract}"))?;
        Ok(price.round() as i64)
    }
}

#[derive(Debug, Deserialize)]
struct LooksRareEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// Venue-native LooksRare order API; only the bid side is consumed.
pub struct LooksRareClient {
    http: reqwest::Client,
    base: String,
}

impl LooksRareClient {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http(cfg)?,
            base: cfg.looksrare.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// One page of bids for a collection. `cursor` and `strategy` are
    /// independent filters: the single-item pass cursors on the last order
    /// hash, the collection pass filters by strategy contract instead.
    pub async fn bids(
        &self,
        collection: &str,
        cursor: Option<&str>,
        strategy: Option<&str>,
    ) -> anyhow::Result<Vec<Value>> {
        let url = format!("{}/orders", self.base);
        let mut query: Vec<(&str, String)> = vec![
            ("isOrderAsk", "false".to_string()),
            ("collection", collection.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("pagination[cursor]", c.to_string()));
        }
        if let Some(s) = strategy {
            query.push(("strategy", s.to_string()));
        }
        let resp = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("bids request for {collection}"))?;
        let envelope: LooksRareEnvelope = resp.json().await.context("decode bids page")?;
        Ok(envelope.data)
    }
}

fn build_http(cfg: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_millis(cfg.reservoir.http_connect_timeout_ms))
        .timeout(Duration::from_millis(cfg.reservoir.http_timeout_ms))
        .build()
        .context("build http client")
}
