use floorbook::marketplace::Marketplace;
use floorbook::store::Store;
use floorbook::types::{Ask, Bid, BidKind, Trade, NFT_ID_NA};

fn ask() -> Ask {
    Ask {
        project_name: "CryptoPunks".to_string(),
        nft_id: "1".to_string(),
        currency: "ETH".to_string(),
        price: 65.5,
        marketplace: Marketplace::OpenSea,
        created_at: "2022-01-01T00:00:00Z".to_string(),
        expires_on: "2022-02-01T00:00:00Z".to_string(),
        maker: "0x1111111111111111111111111111111111111111".to_string(),
    }
}

fn bid() -> Bid {
    Bid {
        project_name: "CryptoPunks".to_string(),
        nft_id: NFT_ID_NA.to_string(),
        currency: "ETH".to_string(),
        price: "0.25".to_string(),
        marketplace: Marketplace::LooksRare,
        created_at: 1_650_000_000,
        maker: "0x2222222222222222222222222222222222222222".to_string(),
        kind: BidKind::Collection,
    }
}

fn trade() -> Trade {
    Trade {
        project_name: "CryptoPunks".to_string(),
        nft_id: "42".to_string(),
        currency: "ETH".to_string(),
        price: 65.5,
        marketplace: "OpenSea".to_string(),
        timestamp: 1_650_000_000,
        buyer: "0x3333333333333333333333333333333333333333".to_string(),
        seller: "0x4444444444444444444444444444444444444444".to_string(),
        currency_label: "ETH".to_string(),
        tx_id: "0xdeadbeef".to_string(),
        side: "ask".to_string(),
        fee: 25.0,
    }
}

#[tokio::test]
async fn each_record_kind_lands_in_its_table() {
    let store = Store::open_in_memory().await.unwrap();

    store.insert_asks(&[ask(), ask()]).await.unwrap();
    store.insert_bids(&[bid()]).await.unwrap();
    store.insert_trades(&[trade()]).await.unwrap();

    assert_eq!(store.count("asks").await.unwrap(), 2);
    assert_eq!(store.count("bids").await.unwrap(), 1);
    assert_eq!(store.count("trades").await.unwrap(), 1);
}

#[tokio::test]
async fn trade_row_carries_both_currency_columns() {
    let store = Store::open_in_memory().await.unwrap();
    store.insert_trades(&[trade()]).await.unwrap();

    let (currency, currency_label): (String, String) =
        sqlx::query_as("SELECT currency, currency_label FROM trades")
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(currency, "ETH");
    assert_eq!(currency_label, "ETH");
}

#[tokio::test]
async fn inserting_nothing_is_a_no_op() {
    let store = Store::open_in_memory().await.unwrap();
    store.insert_asks(&[]).await.unwrap();
    assert_eq!(store.count("asks").await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_table_name_is_rejected() {
    let store = Store::open_in_memory().await.unwrap();
    assert!(store.count("orders; DROP TABLE asks").await.is_err());
}
