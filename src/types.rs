use crate::marketplace::Marketplace;

/// Sentinel nft id for collection-wide bids (no single token attached).
pub const NFT_ID_NA: &str = "N/A";

/// A sell-side listing offering one NFT at a price.
#[derive(Clone, Debug, PartialEq)]
pub struct Ask {
    pub project_name: String,
    pub nft_id: String,
    pub currency: String,
    pub price: f64,
    pub marketplace: Marketplace,
    pub created_at: String,
    pub expires_on: String,
    pub maker: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BidKind {
    Single,
    Collection,
}

impl BidKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BidKind::Single => "single",
            BidKind::Collection => "collection",
        }
    }
}

/// A buy-side offer for one NFT or for any NFT in a collection.
///
/// `price` is a decimal ETH string rendered from the venue's 18-decimal
/// fixed-point integer.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub project_name: String,
    pub nft_id: String,
    pub currency: String,
    pub price: String,
    pub marketplace: Marketplace,
    pub created_at: i64,
    pub maker: String,
    pub kind: BidKind,
}

/// A completed sale. `marketplace` is the order source as reported by the
/// API, kept raw (not re-normalized) so unknown venues still round-trip.
#[derive(Clone, Debug, PartialEq)]
pub struct Trade {
    pub project_name: String,
    pub nft_id: String,
    pub currency: String,
    pub price: f64,
    pub marketplace: String,
    pub timestamp: i64,
    pub buyer: String,
    pub seller: String,
    pub currency_label: String,
    pub tx_id: String,
    pub side: String,
    pub fee: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Asks,
    AskDistribution,
    Bids,
    Trades,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Asks => "asks",
            DataType::AskDistribution => "ask_distribution",
            DataType::Bids => "bids",
            DataType::Trades => "trades",
        }
    }

    /// Case-insensitive alias table for the `--data-type` flag.
    pub fn parse(input: &str) -> Result<Self, UnknownDataType> {
        match input.trim().to_ascii_lowercase().as_str() {
            "a" | "ask" | "asks" => Ok(DataType::Asks),
            "ask_distribution" | "ask-distribution" | "ask distribution" => {
                Ok(DataType::AskDistribution)
            }
            "b" | "bid" | "bids" => Ok(DataType::Bids),
            "t" | "trade" | "trades" => Ok(DataType::Trades),
            _ => Err(UnknownDataType(input.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown data type {0:?} (expected asks, ask_distribution, bids, or trades)")]
pub struct UnknownDataType(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_aliases_are_case_insensitive() {
        assert_eq!(DataType::parse("Asks").unwrap(), DataType::Asks);
        assert_eq!(DataType::parse("T").unwrap(), DataType::Trades);
        assert_eq!(
            DataType::parse("ask distribution").unwrap(),
            DataType::AskDistribution
        );
        assert!(DataType::parse("floor").is_err());
    }
}
