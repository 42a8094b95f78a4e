use anyhow::Context as _;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{LooksRareClient, ReservoirClient};
use crate::config::Config;
use crate::marketplace::Marketplace;
use crate::parse::{self, PriceBuckets, RunState};
use crate::registry::ProjectRegistry;
use crate::types::{Ask, Bid, Trade};

/// LooksRare collection-offer strategy contract, used as the filter for the
/// second bid pass.
pub const COLLECTION_OFFER_STRATEGY: &str = "0x86F909F70813CdB1Bc733f4D97Dc6b03B8e7E8F3";

/// Accumulated state for one ask run: dedup set, price buckets seeded over
/// [floor, 3*floor], and the accepted records. Owned by the run, discarded
/// with it; nothing leaks across runs.
pub struct AskRun {
    targets: Vec<Marketplace>,
    pub min_price: i64,
    pub max_price: i64,
    pub state: RunState,
    pub buckets: PriceBuckets,
    pub accepted: Vec<Ask>,
}

impl AskRun {
    pub fn new(targets: Vec<Marketplace>, floor_price: i64) -> Self {
        let min_price = floor_price;
        let max_price = floor_price * 3;
        Self {
            targets,
            min_price,
            max_price,
            state: RunState::new(),
            buckets: PriceBuckets::seeded(min_price, max_price),
            accepted: Vec::new(),
        }
    }

    pub fn apply_page(&mut self, orders: &[Value]) -> anyhow::Result<()> {
        parse::parse_asks(
            orders,
            &self.targets,
            &mut self.state,
            &mut self.buckets,
            &mut self.accepted,
            self.min_price,
            self.max_price,
        )
    }
}

pub struct BidRun {
    registry: ProjectRegistry,
    pub state: RunState,
    pub accepted: Vec<Bid>,
}

impl BidRun {
    pub fn new(registry: ProjectRegistry) -> Self {
        Self {
            registry,
            state: RunState::new(),
            accepted: Vec::new(),
        }
    }

    pub fn apply_page(&mut self, bids: &[Value]) -> anyhow::Result<()> {
        parse::parse_bids(bids, &self.registry, &mut self.state, &mut self.accepted)
    }
}

pub struct TradeRun {
    targets: Vec<Marketplace>,
    registry: ProjectRegistry,
    pub state: RunState,
    pub accepted: Vec<Trade>,
}

impl TradeRun {
    pub fn new(targets: Vec<Marketplace>, registry: ProjectRegistry) -> Self {
        Self {
            targets,
            registry,
            state: RunState::new(),
            accepted: Vec::new(),
        }
    }

    pub fn apply_page(&mut self, trades: &[Value]) -> anyhow::Result<()> {
        parse::parse_trades(
            trades,
            &self.targets,
            &self.registry,
            &mut self.state,
            &mut self.accepted,
        )
    }
}

/// Pages through open asks, carrying the continuation cursor forward, for at
/// most `run.max_pages` pages. Stops early once the API stops returning a
/// cursor.
pub async fn run_asks(
    cfg: &Config,
    client: &ReservoirClient,
    contract: &str,
    targets: &[Marketplace],
) -> anyhow::Result<AskRun> {
    let floor = client
        .floor_price(contract)
        .await
        .context("fetch floor price")?;
    info!(floor, contract, "seeding ask buckets over [floor, 3*floor]");

    let mut run = AskRun::new(targets.to_vec(), floor);
    let mut continuation: Option<String> = None;
    for page in 0..cfg.run.max_pages {
        let asks = client
            .open_asks(contract, continuation.as_deref())
            .await
            .with_context(|| format!("fetch ask page {page}"))?;
        continuation = asks.continuation;
        run.apply_page(&asks.orders)
            .with_context(|| format!("parse ask page {page}"))?;
        debug!(
            page,
            page_len = asks.orders.len(),
            accepted = run.accepted.len(),
            "applied ask page"
        );
        if continuation.is_none() {
            break;
        }
    }
    info!(accepted = run.accepted.len(), "ask run complete");
    Ok(run)
}

/// Two bid passes against the venue API, merged through one dedup set:
/// single-item bids paged by last-hash cursor, then collection-wide bids
/// filtered by the collection-offer strategy.
pub async fn run_bids(
    cfg: &Config,
    client: &LooksRareClient,
    registry: &ProjectRegistry,
    contract: &str,
) -> anyhow::Result<BidRun> {
    let mut run = BidRun::new(registry.clone());

    let mut cursor: Option<String> = None;
    for page in 0..cfg.run.max_pages {
        let bids = client
            .bids(contract, cursor.as_deref(), None)
            .await
            .with_context(|| format!("fetch single-bid page {page}"))?;
        cursor = bids
            .last()
            .and_then(|b| b.get("hash"))
            .and_then(Value::as_str)
            .map(str::to_string);
        run.apply_page(&bids)
            .with_context(|| format!("parse single-bid page {page}"))?;
        debug!(page, accepted = run.accepted.len(), "applied single-bid page");
        if cursor.is_none() {
            break;
        }
    }

    for page in 0..cfg.run.max_pages {
        let bids = client
            .bids(contract, None, Some(COLLECTION_OFFER_STRATEGY))
            .await
            .with_context(|| format!("fetch collection-bid page {page}"))?;
        let before = run.accepted.len();
        run.apply_page(&bids)
            .with_context(|| format!("parse collection-bid page {page}"))?;
        debug!(
            page,
            accepted = run.accepted.len(),
            "applied collection-bid page"
        );
        // The collection feed has no cursor; once a page adds nothing new
        // the feed is exhausted.
        if run.accepted.len() == before {
            break;
        }
    }

    info!(accepted = run.accepted.len(), "bid run complete");
    Ok(run)
}

pub async fn run_trades(
    cfg: &Config,
    client: &ReservoirClient,
    registry: &ProjectRegistry,
    contract: &str,
    targets: &[Marketplace],
) -> anyhow::Result<TradeRun> {
    let mut run = TradeRun::new(targets.to_vec(), registry.clone());
    let mut continuation: Option<String> = None;
    for page in 0..cfg.run.max_pages {
        let trades = client
            .trades(contract, continuation.as_deref())
            .await
            .with_context(|| format!("fetch trade page {page}"))?;
        continuation = trades.continuation;
        run.apply_page(&trades.trades)
            .with_context(|| format!("parse trade page {page}"))?;
        debug!(
            page,
            page_len = trades.trades.len(),
            accepted = run.accepted.len(),
            "applied trade page"
        );
        if continuation.is_none() {
            break;
        }
    }
    info!(accepted = run.accepted.len(), "trade run complete");
    Ok(run)
}
