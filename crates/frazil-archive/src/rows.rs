//! CSV row serialization for bars and normalized ticks.
//!
//! Rows carry no header; each archive member is pure data, one record per
//! line, matching what downstream backtest and charting consumers read.

use frazil_aggregate::{QuoteBar, TradeBar};
use frazil_types::{Event, QuoteTick, TradeTick};

/// Serializes a trade bar: `bucket,open,high,low,close,volume,orderflow`.
#[must_use]
pub fn trade_bar(bar: &TradeBar) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        bar.bucket_start, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.orderflow
    )
}

/// Serializes a quote bar:
/// `bucket,open_bid,high_bid,low_bid,close_bid,bid_volume,open_ask,high_ask,low_ask,close_ask,ask_volume`.
#[must_use]
pub fn quote_bar(bar: &QuoteBar) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{}",
        bar.bucket_start,
        bar.open_bid,
        bar.high_bid,
        bar.low_bid,
        bar.close_bid,
        bar.bid_volume,
        bar.open_ask,
        bar.high_ask,
        bar.low_ask,
        bar.close_ask,
        bar.ask_volume
    )
}

/// Serializes a normalized quote tick: `offset,bid_price,bid_size,ask_price,ask_size`.
#[must_use]
pub fn quote_tick(quote: &QuoteTick) -> String {
    format!(
        "{},{},{},{},{}",
        quote.offset_ms, quote.bid_price, quote.bid_size, quote.ask_price, quote.ask_size
    )
}

/// Serializes a normalized trade tick: `offset,price,size,side`.
#[must_use]
pub fn trade_tick(trade: &TradeTick) -> String {
    format!(
        "{},{},{},{}",
        trade.offset_ms, trade.price, trade.size, trade.side
    )
}

/// Serializes a normalized event of either type.
#[must_use]
pub fn event(event: &Event) -> String {
    match event {
        Event::Quote(q) => quote_tick(q),
        Event::Trade(t) => trade_tick(t),
    }
}
