use std::path::Path;

use anyhow::Context as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::types::{Ask, Bid, Trade};

const CREATE_ASKS: &str = "CREATE TABLE IF NOT EXISTS asks (
    project_name TEXT NOT NULL,
    nft_id TEXT NOT NULL,
    currency TEXT NOT NULL,
    price REAL NOT NULL,
    marketplace TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_on TEXT NOT NULL,
    maker TEXT NOT NULL
)";

const CREATE_BIDS: &str = "CREATE TABLE IF NOT EXISTS bids (
    project_name TEXT NOT NULL,
    nft_id TEXT NOT NULL,
    currency TEXT NOT NULL,
    price TEXT NOT NULL,
    marketplace TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    maker TEXT NOT NULL,
    bid_kind TEXT NOT NULL
)";

const CREATE_TRADES: &str = "CREATE TABLE IF NOT EXISTS trades (
    project_name TEXT NOT NULL,
    nft_id TEXT NOT NULL,
    currency TEXT NOT NULL,
    price REAL NOT NULL,
    marketplace TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    buyer TEXT NOT NULL,
    seller TEXT NOT NULL,
    currency_label TEXT NOT NULL,
    tx_id TEXT NOT NULL,
    side TEXT NOT NULL,
    fee REAL NOT NULL
)";

/// SQLite-backed store: one table per record kind, one INSERT per record.
/// The first failed insert aborts the caller; there is no retry and no
/// partial-commit recovery.
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts)
            .await
            .with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::with_pool(pool).await
    }

    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .context("open in-memory sqlite db")?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        for ddl in [CREATE_ASKS, CREATE_BIDS, CREATE_TRADES] {
            sqlx::query(ddl)
                .execute(&pool)
                .await
                .context("create table")?;
        }
        Ok(Self { pool })
    }

    pub async fn insert_asks(&self, asks: &[Ask]) -> anyhow::Result<()> {
        for ask in asks {
            sqlx::query(
                "INSERT INTO asks (project_name, nft_id, currency, price, marketplace, \
                 created_at, expires_on, maker) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&ask.project_name)
            .bind(&ask.nft_id)
            .bind(&ask.currency)
            .bind(ask.price)
            .bind(ask.marketplace.as_str())
            .bind(&ask.created_at)
            .bind(&ask.expires_on)
            .bind(&ask.maker)
            .execute(&self.pool)
            .await
            .context("insert ask")?;
        }
        Ok(())
    }

    pub async fn insert_bids(&self, bids: &[Bid]) -> anyhow::Result<()> {
        for bid in bids {
            sqlx::query(
                "INSERT INTO bids (project_name, nft_id, currency, price, marketplace, \
                 created_at, maker, bid_kind) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&bid.project_name)
            .bind(&bid.nft_id)
            .bind(&bid.currency)
            .bind(&bid.price)
            .bind(bid.marketplace.as_str())
            .bind(bid.created_at)
            .bind(&bid.maker)
            .bind(bid.kind.as_str())
            .execute(&self.pool)
            .await
            .context("insert bid")?;
        }
        Ok(())
    }

    pub async fn insert_trades(&self, trades: &[Trade]) -> anyhow::Result<()> {
        for trade in trades {
            sqlx::query(
                "INSERT INTO trades (project_name, nft_id, currency, price, marketplace, \
                 timestamp, buyer, seller, currency_label, tx_id, side, fee) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&trade.project_name)
            .bind(&trade.nft_id)
            .bind(&trade.currency)
            .bind(trade.price)
            .bind(&trade.marketplace)
            .bind(trade.timestamp)
            .bind(&trade.buyer)
            .bind(&trade.seller)
            .bind(&trade.currency_label)
            .bind(&trade.tx_id)
            .bind(&trade.side)
            .bind(trade.fee)
            .execute(&self.pool)
            .await
            .context("insert trade")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count(&self, table: &str) -> anyhow::Result<i64> {
        anyhow::ensure!(
            matches!(table, "asks" | "bids" | "trades"),
            "unknown table {table:?}"
        );
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("count {table}"))?;
        Ok(n)
    }
}
