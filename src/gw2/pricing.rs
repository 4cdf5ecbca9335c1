use async_trait::async_trait;
use futures::future::join_all;

use super::client::{ApiError, Gw2Client};
use super::coin::Coins;
use super::tables::MaterialEntry;

/// Anything that can quote the current lowest sell-listing price of an item.
#[async_trait]
pub trait PriceSource: Sync {
    async fn sell_price(&self, item_id: u32) -> Result<u64, ApiError>;
}

#[async_trait]
impl PriceSource for Gw2Client {
    async fn sell_price(&self, item_id: u32) -> Result<u64, ApiError> {
        Ok(self.price(item_id).await?.sells.unit_price)
    }
}

/// Fraction of the gross value that is kept, in whole percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Discount(u8);

impl Discount {
    /// What a seller keeps after the 5% listing fee and 10% exchange fee.
    pub const TRADING_POST: Discount = Discount(85);
    pub const NINETY: Discount = Discount(90);
    pub const NINETY_FIVE: Discount = Discount(95);

    pub fn as_percent(self) -> u8 {
        self.0
    }

    /// `floor(total * pct / 100)`, exact in integer arithmetic.
    pub fn apply(self, total: u64) -> u64 {
        (u128::from(total) * u128::from(self.0) / 100) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TradingPostFees {
    pub listing: Coins,
    pub exchange: Coins,
    pub proceeds: Coins,
}

/// Fees for selling at `price`: 5% up front to list, 10% when it sells.
/// Each fee is at least 1 copper.
pub fn trading_post_fees(price: Coins) -> TradingPostFees {
    let listing = (price.0 / 20).max(1);
    let exchange = (price.0 / 10).max(1);
    TradingPostFees {
        listing: Coins(listing),
        exchange: Coins(exchange),
        proceeds: Coins(price.0.saturating_sub(listing + exchange)),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub item_id: u32,
    pub unit_sell_price: u64,
    pub quantity: u64,
}

impl PriceQuote {
    pub fn subtotal(&self) -> u64 {
        self.unit_sell_price.saturating_mul(self.quantity)
    }
}

#[derive(Debug)]
pub struct Aggregate {
    pub quotes: Vec<PriceQuote>,
    pub failed: Vec<u32>,
    pub total: Coins,
    pub discount: Discount,
    pub discounted: Coins,
}

#[derive(Debug, PartialEq)]
pub enum PriceError {
    NoItems,
    /// Every lookup failed; carries how many were attempted.
    AllFailed(usize),
}

impl std::fmt::Display for PriceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceError::NoItems => write!(f, "There are no items to price"),
            PriceError::AllFailed(n) => write!(
                f,
                "Could not fetch prices for any of the {n} items, the trading post may be unavailable"
            ),
        }
    }
}

impl std::error::Error for PriceError {}

/// Quotes every entry concurrently and sums `unit_price * quantity`.
///
/// A failed lookup only drops that entry from the total. The call fails when
/// no lookup succeeds.
pub async fn aggregate<S: PriceSource + ?Sized>(
    source: &S,
    entries: &[MaterialEntry],
    discount: Discount,
) -> Result<Aggregate, PriceError> {
    if entries.is_empty() {
        return Err(PriceError::NoItems);
    }

    let lookups = entries.iter().map(|entry| async move {
        let result = source.sell_price(entry.item_id).await;
        (entry, result)
    });

    let mut quotes = Vec::with_capacity(entries.len());
    let mut failed = Vec::new();

    for (entry, result) in join_all(lookups).await {
        match result {
            Ok(unit_sell_price) => quotes.push(PriceQuote {
                item_id: entry.item_id,
                unit_sell_price,
                quantity: entry.quantity,
            }),
            Err(e) => {
                tracing::warn!("price lookup for {} ({}) failed: {e}", entry.name, entry.item_id);
                failed.push(entry.item_id);
            }
        }
    }

    if quotes.is_empty() {
        return Err(PriceError::AllFailed(entries.len()));
    }

    let total = quotes
        .iter()
        .fold(0u64, |acc, q| acc.saturating_add(q.subtotal()));

    Ok(Aggregate {
        quotes,
        failed,
        total: Coins(total),
        discount,
        discounted: Coins(discount.apply(total)),
    })
}
