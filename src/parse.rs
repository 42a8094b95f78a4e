use std::collections::{BTreeMap, HashSet};

use anyhow::Context as _;
use serde_json::Value;

use crate::marketplace::Marketplace;
use crate::registry::ProjectRegistry;
use crate::types::{Ask, Bid, BidKind, Trade, NFT_ID_NA};

/// LooksRare standard-sale strategy contract. Bids carrying it target a
/// single token; every other strategy is a collection-wide offer.
pub const SINGLE_ITEM_STRATEGY: &str = "0x56244Bb70CbD3EA9Dc8007399F61dFC065190031";

/// Per-run dedup bookkeeping. Created empty at run start, grows for the
/// run's duration, discarded with the run; never persisted.
#[derive(Debug, Default)]
pub struct RunState {
    seen: HashSet<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Returns false when the id was already seen this run.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Count of accepted asks per rounded integer ETH price.
///
/// Seeded to zero over [floor, 3*floor] so the report covers the whole
/// band, but open-ended: prices outside the seeded range create their
/// bucket on first hit.
#[derive(Debug, Default)]
pub struct PriceBuckets {
    counts: BTreeMap<i64, u64>,
}

impl PriceBuckets {
    pub fn seeded(min: i64, max: i64) -> Self {
        let mut counts = BTreeMap::new();
        for price in min..=max {
            counts.insert(price, 0);
        }
        Self { counts }
    }

    pub fn record(&mut self, price: i64) {
        *self.counts.entry(price).or_insert(0) += 1;
    }

    pub fn count_at(&self, price: i64) -> u64 {
        self.counts.get(&price).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Buckets in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.counts.iter().map(|(&p, &c)| (p, c))
    }
}

/// Third colon-delimited segment of a composite token-set id
/// (`token:<contract>:<tokenId>`).
pub fn parse_nft_id(token_set_id: &str) -> anyhow::Result<&str> {
    token_set_id
        .splitn(3, ':')
        .nth(2)
        .with_context(|| format!("token set id {token_set_id:?} has no token segment"))
}

/// Renders an 18-decimal fixed-point integer string as a decimal ETH
/// string, exactly (no float round-trip).
pub fn wei_to_eth_string(wei: &str) -> anyhow::Result<String> {
    const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
    let v: u128 = wei
        .trim()
        .parse()
        .with_context(|| format!("bad fixed-point price {wei:?}"))?;
    let whole = v / WEI_PER_ETH;
    let frac = v % WEI_PER_ETH;
    if frac == 0 {
        return Ok(whole.to_string());
    }
    let frac = format!("{frac:018}");
    Ok(format!("{whole}.{}", frac.trim_end_matches('0')))
}

/// Applies one page of raw ask records.
///
/// A record is accepted only if its marketplace is in `targets`, its
/// token-set id is unseen this run, and its rounded price lies in
/// [min_price, max_price] inclusive. Rejected records are dropped silently;
/// an unrecognized `kind` on a record without a source name is a hard
/// failure.
pub fn parse_asks(
    orders: &[Value],
    targets: &[Marketplace],
    state: &mut RunState,
    buckets: &mut PriceBuckets,
    out: &mut Vec<Ask>,
    min_price: i64,
    max_price: i64,
) -> anyhow::Result<()> {
    for ask in orders {
        let marketplace = match req_str(ask, "source.name") {
            Ok(name) => match Marketplace::parse(&name) {
                Ok(m) => m,
                // Foreign venue; can never match the target set.
                Err(_) => continue,
            },
            Err(_) => {
                let kind = req_str(ask, "kind").context("ask record")?;
                Marketplace::parse(&kind).context("ask record kind")?
            }
        };

        let token_set_id = req_str(ask, "tokenSetId").context("ask record")?;
        let price = req_f64(ask, "price").context("ask record")?;
        let order = Ask {
            project_name: req_str(ask, "metadata.data.collectionName").context("ask record")?,
            nft_id: parse_nft_id(&token_set_id)?.to_string(),
            currency: "ETH".to_string(),
            price,
            marketplace,
            created_at: req_str(ask, "createdAt").context("ask record")?,
            expires_on: req_str(ask, "expiration").context("ask record")?,
            maker: req_str(ask, "maker").context("ask record")?,
        };

        // Ties round to even, matching the upstream tooling this feeds.
        let value = price.round_ties_even() as i64;
        if !targets.contains(&marketplace)
            || state.is_seen(&token_set_id)
            || value < min_price
            || value > max_price
        {
            continue;
        }

        buckets.record(value);
        out.push(order);
        state.mark_seen(&token_set_id);
    }
    Ok(())
}

/// Applies one page of LooksRare bid records. Identity key is the order
/// hash; bids carry no price filter.
pub fn parse_bids(
    bids: &[Value],
    registry: &ProjectRegistry,
    state: &mut RunState,
    out: &mut Vec<Bid>,
) -> anyhow::Result<()> {
    for bid in bids {
        let contract = req_str(bid, "collectionAddress").context("bid record")?;
        let project_name = registry
            .name_from_contract(&contract)
            .with_context(|| format!("bid collection {contract}"))?
            .to_string();

        let raw_price = req_str(bid, "price").context("bid record")?;
        let price = wei_to_eth_string(&raw_price).context("bid record")?;

        let strategy = req_str(bid, "strategy").context("bid record")?;
        let kind = if strategy == SINGLE_ITEM_STRATEGY {
            BidKind::Single
        } else {
            BidKind::Collection
        };

        let hash = req_str(bid, "hash").context("bid record")?;
        if state.is_seen(&hash) {
            continue;
        }

        let nft_id = match kind {
            BidKind::Single => req_str(bid, "tokenId").context("bid record")?,
            BidKind::Collection => NFT_ID_NA.to_string(),
        };

        out.push(Bid {
            project_name,
            nft_id,
            currency: "ETH".to_string(),
            price,
            marketplace: Marketplace::LooksRare,
            created_at: req_i64(bid, "startTime").context("bid record")?,
            maker: req_str(bid, "signer").context("bid record")?,
            kind,
        });
        state.mark_seen(&hash);
    }
    Ok(())
}

/// Applies one page of trade records. The order source is kept raw; the
/// target filter matches it against the canonical names. The usd price is
/// optional by design: a missing or non-numeric value yields a zero fee
/// rather than an error.
pub fn parse_trades(
    trades: &[Value],
    targets: &[Marketplace],
    registry: &ProjectRegistry,
    state: &mut RunState,
    out: &mut Vec<Trade>,
) -> anyhow::Result<()> {
    for trade in trades {
        let contract = req_str(trade, "token.contract").context("trade record")?;
        let project_name = registry
            .name_from_contract(&contract)
            .with_context(|| format!("trade token contract {contract}"))?
            .to_string();

        let marketplace = req_str(trade, "orderSource").context("trade record")?;
        let fee = opt_f64(trade, "usdPrice")
            .map(|usd| usd * Marketplace::fee_rate(&marketplace))
            .unwrap_or(0.0);

        let parsed = Trade {
            project_name,
            nft_id: req_str(trade, "token.tokenId").context("trade record")?,
            currency: "ETH".to_string(),
            price: req_f64(trade, "price").context("trade record")?,
            marketplace,
            timestamp: req_i64(trade, "timestamp").context("trade record")?,
            buyer: req_str(trade, "from").context("trade record")?,
            seller: req_str(trade, "to").context("trade record")?,
            currency_label: "ETH".to_string(),
            tx_id: req_str(trade, "txHash").context("trade record")?,
            side: req_str(trade, "orderSide").context("trade record")?,
            fee,
        };

        let trade_id = req_str(trade, "id").context("trade record")?;
        let targeted = targets.iter().any(|m| m.as_str() == parsed.marketplace);
        if !targeted || state.is_seen(&trade_id) {
            continue;
        }

        out.push(parsed);
        state.mark_seen(&trade_id);
    }
    Ok(())
}

fn lookup<'a>(v: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = v;
    for part in path.split('.') {
        cur = cur.get(part)?;
    }
    Some(cur)
}

fn req_str(v: &Value, path: &str) -> anyhow::Result<String> {
    let val = lookup(v, path).with_context(|| format!("missing field {path:?}"))?;
    if let Some(s) = val.as_str() {
        return Ok(s.to_string());
    }
    if val.is_number() {
        return Ok(val.to_string());
    }
    anyhow::bail!("field {path:?} is not a string")
}

fn req_f64(v: &Value, path: &str) -> anyhow::Result<f64> {
    let val = lookup(v, path).with_context(|| format!("missing field {path:?}"))?;
    if let Some(x) = val.as_f64() {
        return Ok(x);
    }
    if let Some(s) = val.as_str() {
        if let Ok(x) = s.parse::<f64>() {
            return Ok(x);
        }
    }
    anyhow::bail!("field {path:?} is not a number")
}

fn req_i64(v: &Value, path: &str) -> anyhow::Result<i64> {
    let val = lookup(v, path).with_context(|| format!("missing field {path:?}"))?;
    if let Some(x) = val.as_i64() {
        return Ok(x);
    }
    if let Some(s) = val.as_str() {
        if let Ok(x) = s.parse::<i64>() {
            return Ok(x);
        }
    }
    anyhow::bail!("field {path:?} is not an integer")
}

fn opt_f64(v: &Value, path: &str) -> Option<f64> {
    let val = lookup(v, path)?;
    if let Some(x) = val.as_f64() {
        return Some(x);
    }
    val.as_str()?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nft_id_is_third_segment() {
        let id = parse_nft_id("token:0xabc:1234").unwrap();
        assert_eq!(id, "1234");
        assert!(parse_nft_id("token:0xabc").is_err());
    }

    #[test]
    fn nft_id_keeps_extra_colons() {
        // Only the first two delimiters split; the rest is the token ref.
        assert_eq!(parse_nft_id("a:b:c:d").unwrap(), "c:d");
    }

    #[test]
    fn wei_conversion_trims_trailing_zeros() {
        assert_eq!(wei_to_eth_string("250000000000000000").unwrap(), "0.25");
        assert_eq!(wei_to_eth_string("1000000000000000000").unwrap(), "1");
        assert_eq!(wei_to_eth_string("1").unwrap(), "0.000000000000000001");
        assert!(wei_to_eth_string("12.5").is_err());
    }

    #[test]
    fn buckets_seed_and_open_range() {
        let mut b = PriceBuckets::seeded(2, 6);
        assert_eq!(b.iter().count(), 5);
        assert_eq!(b.total(), 0);
        b.record(4);
        b.record(90);
        assert_eq!(b.count_at(4), 1);
        assert_eq!(b.count_at(90), 1);
        assert_eq!(b.total(), 2);
    }
}
