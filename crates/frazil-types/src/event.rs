//! Normalized tick event representation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Milliseconds in one UTC day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// The two feed types published per day by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Top-of-book quote updates.
    Quote,
    /// Executed trades.
    Trade,
}

impl EventType {
    /// Returns the type as the string used in URLs and archive names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Trade => "trade",
        }
    }

    /// Returns both feed types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Quote, Self::Trade]
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggressor side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buyer was the aggressor.
    Buy,
    /// Seller was the aggressor.
    Sell,
}

impl Side {
    /// Returns the side as it appears in the source CSV.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }

    /// Returns the orderflow sign for this side (+1 buy, -1 sell).
    #[must_use]
    pub const fn sign(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Self::Buy),
            "Sell" => Ok(Self::Sell),
            _ => Err(()),
        }
    }
}

/// A normalized top-of-book quote update.
///
/// `offset_ms` is the millisecond offset from the event's own UTC midnight,
/// so it always lies in `[0, MS_PER_DAY)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteTick {
    /// Milliseconds since UTC midnight of the event's date.
    pub offset_ms: i64,
    /// Best bid price.
    pub bid_price: f64,
    /// Size available at the best bid.
    pub bid_size: f64,
    /// Best ask price.
    pub ask_price: f64,
    /// Size available at the best ask.
    pub ask_size: f64,
}

/// A normalized executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    /// Milliseconds since UTC midnight of the event's date.
    pub offset_ms: i64,
    /// Execution price.
    pub price: f64,
    /// Executed size.
    pub size: f64,
    /// Aggressor side.
    pub side: Side,
}

impl TradeTick {
    /// Returns the signed size for orderflow accumulation.
    #[must_use]
    pub fn signed_size(&self) -> f64 {
        self.side.sign() * self.size
    }
}

/// A normalized event from either feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Quote update.
    Quote(QuoteTick),
    /// Executed trade.
    Trade(TradeTick),
}

impl Event {
    /// Returns the millisecond-of-day offset of the event.
    #[must_use]
    pub const fn offset_ms(&self) -> i64 {
        match self {
            Self::Quote(q) => q.offset_ms,
            Self::Trade(t) => t.offset_ms,
        }
    }

    /// Returns the feed type the event belongs to.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Quote(_) => EventType::Quote,
            Self::Trade(_) => EventType::Trade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_strings() {
        assert_eq!(EventType::Quote.as_str(), "quote");
        assert_eq!(EventType::Trade.as_str(), "trade");
        assert_eq!(EventType::all().len(), 2);
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("Buy".parse::<Side>(), Ok(Side::Buy));
        assert_eq!("Sell".parse::<Side>(), Ok(Side::Sell));
        assert!("buy".parse::<Side>().is_err());
        assert!("".parse::<Side>().is_err());
    }

    #[test]
    fn test_signed_size() {
        let buy = TradeTick {
            offset_ms: 0,
            price: 100.0,
            size: 5.0,
            side: Side::Buy,
        };
        let sell = TradeTick {
            side: Side::Sell,
            ..buy
        };
        assert!((buy.signed_size() - 5.0).abs() < 1e-12);
        assert!((sell.signed_size() + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_event_offset() {
        let e = Event::Quote(QuoteTick {
            offset_ms: 1234,
            bid_price: 7063.5,
            bid_size: 585_783.0,
            ask_price: 7064.0,
            ask_size: 142_932.0,
        });
        assert_eq!(e.offset_ms(), 1234);
        assert_eq!(e.event_type(), EventType::Quote);
    }
}
