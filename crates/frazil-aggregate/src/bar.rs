//! Bar data structures and merge rules.

use frazil_types::{QuoteTick, TradeTick};
use serde::{Deserialize, Serialize};

/// An OHLCV bar built from executed trades.
///
/// Merge rule per incoming trade: `open` is set by the first trade of the
/// bucket and never overwritten; `high`/`low` are running extrema; `close`
/// tracks the most recent trade (arrival order); `volume` sums all sizes;
/// `orderflow` sums signed sizes (buys positive, sells negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeBar {
    /// Bucket start, in milliseconds since the day's UTC midnight.
    pub bucket_start: i64,
    /// Price of the first trade in the bucket.
    pub open: f64,
    /// Highest trade price in the bucket.
    pub high: f64,
    /// Lowest trade price in the bucket.
    pub low: f64,
    /// Price of the most recent trade in the bucket.
    pub close: f64,
    /// Sum of trade sizes.
    pub volume: f64,
    /// Sum of signed trade sizes.
    pub orderflow: f64,
}

impl TradeBar {
    /// Opens a bar from the first trade of its bucket.
    #[must_use]
    pub fn open_with(bucket_start: i64, trade: &TradeTick) -> Self {
        Self {
            bucket_start,
            open: trade.price,
            high: trade.price,
            low: trade.price,
            close: trade.price,
            volume: trade.size,
            orderflow: trade.signed_size(),
        }
    }

    /// Applies a subsequent trade to the bar.
    pub fn apply(&mut self, trade: &TradeTick) {
        self.high = self.high.max(trade.price);
        self.low = self.low.min(trade.price);
        self.close = trade.price;
        self.volume += trade.size;
        self.orderflow += trade.signed_size();
    }
}

/// An OHLC bar built from quote updates, bid and ask tracked independently.
///
/// Volume fields hold the *last* observed size in the bucket rather than a
/// sum: quotes describe resting book state, not flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteBar {
    /// Bucket start, in milliseconds since the day's UTC midnight.
    pub bucket_start: i64,
    /// First bid price in the bucket.
    pub open_bid: f64,
    /// Highest bid price in the bucket.
    pub high_bid: f64,
    /// Lowest bid price in the bucket.
    pub low_bid: f64,
    /// Most recent bid price in the bucket.
    pub close_bid: f64,
    /// Last observed bid size.
    pub bid_volume: f64,
    /// First ask price in the bucket.
    pub open_ask: f64,
    /// Highest ask price in the bucket.
    pub high_ask: f64,
    /// Lowest ask price in the bucket.
    pub low_ask: f64,
    /// Most recent ask price in the bucket.
    pub close_ask: f64,
    /// Last observed ask size.
    pub ask_volume: f64,
}

impl QuoteBar {
    /// Opens a bar from the first quote of its bucket.
    #[must_use]
    pub fn open_with(bucket_start: i64, quote: &QuoteTick) -> Self {
        Self {
            bucket_start,
            open_bid: quote.bid_price,
            high_bid: quote.bid_price,
            low_bid: quote.bid_price,
            close_bid: quote.bid_price,
            bid_volume: quote.bid_size,
            open_ask: quote.ask_price,
            high_ask: quote.ask_price,
            low_ask: quote.ask_price,
            close_ask: quote.ask_price,
            ask_volume: quote.ask_size,
        }
    }

    /// Applies a subsequent quote to the bar.
    pub fn apply(&mut self, quote: &QuoteTick) {
        self.high_bid = self.high_bid.max(quote.bid_price);
        self.low_bid = self.low_bid.min(quote.bid_price);
        self.close_bid = quote.bid_price;
        self.bid_volume = quote.bid_size;

        self.high_ask = self.high_ask.max(quote.ask_price);
        self.low_ask = self.low_ask.min(quote.ask_price);
        self.close_ask = quote.ask_price;
        self.ask_volume = quote.ask_size;
    }
}
