use std::collections::HashMap;

use assert_approx_eq::assert_approx_eq;
use serde_json::{json, Value};

use floorbook::marketplace::Marketplace;
use floorbook::parse::{parse_trades, RunState};
use floorbook::registry::ProjectRegistry;

const PUNKS: &str = "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb";

fn registry() -> ProjectRegistry {
    let mut entries = HashMap::new();
    entries.insert("CryptoPunks".to_string(), PUNKS.to_string());
    ProjectRegistry::from_entries(&entries).unwrap()
}

fn trade_record(id: &str, source: &str, usd_price: Option<f64>) -> Value {
    let mut v = json!({
        "id": id,
        "token": {"contract": PUNKS, "tokenId": "42"},
        "price": 65.5,
        "orderSource": source,
        "timestamp": 1_650_000_000,
        "from": "0x3333333333333333333333333333333333333333",
        "to": "0x4444444444444444444444444444444444444444",
        "txHash": "0xdeadbeef",
        "orderSide": "ask",
    });
    if let Some(usd) = usd_price {
        v["usdPrice"] = json!(usd);
    }
    v
}

fn apply(trades: &[Value], state: &mut RunState) -> anyhow::Result<Vec<floorbook::types::Trade>> {
    let mut out = Vec::new();
    parse_trades(
        trades,
        &Marketplace::ALL,
        &registry(),
        state,
        &mut out,
    )?;
    Ok(out)
}

#[test]
fn fee_follows_the_marketplace_rate_table() {
    let mut state = RunState::new();
    let out = apply(
        &[
            trade_record("t1", "OpenSea", Some(1000.0)),
            trade_record("t2", "LooksRare", Some(1000.0)),
            trade_record("t3", "X2Y2", Some(1000.0)),
        ],
        &mut state,
    )
    .unwrap();
    assert_approx_eq!(out[0].fee, 25.0, 1e-12);
    assert_approx_eq!(out[1].fee, 20.0, 1e-12);
    assert_approx_eq!(out[2].fee, 5.0, 1e-12);
}

#[test]
fn unrecognized_source_has_zero_fee_rate() {
    assert_approx_eq!(Marketplace::fee_rate("Blur"), 0.0, 1e-12);
}

#[test]
fn missing_usd_price_defaults_fee_to_zero() {
    let mut state = RunState::new();
    let out = apply(&[trade_record("t1", "OpenSea", None)], &mut state).unwrap();
    assert_eq!(out.len(), 1);
    assert_approx_eq!(out[0].fee, 0.0, 1e-12);
}

#[test]
fn non_numeric_usd_price_is_swallowed_too() {
    let mut record = trade_record("t1", "OpenSea", None);
    record["usdPrice"] = json!("n/a");
    let mut state = RunState::new();
    let out = apply(&[record], &mut state).unwrap();
    assert_approx_eq!(out[0].fee, 0.0, 1e-12);
}

#[test]
fn trade_id_dedups_and_target_filter_applies() {
    let mut state = RunState::new();
    let out = apply(
        &[
            trade_record("t1", "OpenSea", Some(10.0)),
            trade_record("t1", "OpenSea", Some(10.0)),
            trade_record("t2", "Blur", Some(10.0)),
        ],
        &mut state,
    )
    .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].tx_id, "0xdeadbeef");
}

#[test]
fn token_contract_is_checksum_normalized_before_lookup() {
    let mut record = trade_record("t1", "OpenSea", Some(10.0));
    record["token"]["contract"] = json!(PUNKS.to_ascii_uppercase().replacen("0X", "0x", 1));
    let mut state = RunState::new();
    let out = apply(&[record], &mut state).unwrap();
    assert_eq!(out[0].project_name, "CryptoPunks");
}

#[test]
fn order_source_is_kept_raw() {
    let mut state = RunState::new();
    let out = apply(&[trade_record("t1", "OpenSea", Some(10.0))], &mut state).unwrap();
    assert_eq!(out[0].marketplace, "OpenSea");
    assert_eq!(out[0].side, "ask");
    assert_eq!(out[0].currency, "ETH");
    assert_eq!(out[0].currency_label, "ETH");
}
