//! Per-resolution streaming aggregation with ordered flush.

use std::collections::BTreeMap;

use frazil_types::{Event, EventType, QuoteTick, Resolution, TradeTick};

use crate::{QuoteBar, TradeBar};

/// Aligns a millisecond offset to the start of its bucket.
///
/// Buckets are closed-open and left-inclusive: an event at exactly the
/// bucket boundary belongs to the bucket it starts.
#[must_use]
pub const fn bucket_key(offset_ms: i64, bucket_ms: i64) -> i64 {
    offset_ms / bucket_ms * bucket_ms
}

/// Streaming trade aggregator for a single resolution.
///
/// Owns the `bucket key -> bar` map for one (date, trade, resolution)
/// triple. The map is a `BTreeMap` so the flush order is ascending by
/// bucket start regardless of insertion order.
#[derive(Debug)]
pub struct TradeAggregator {
    resolution: Resolution,
    bucket_ms: i64,
    bars: BTreeMap<i64, TradeBar>,
}

impl TradeAggregator {
    /// Creates an aggregator for the given resolution.
    ///
    /// Returns `None` for the tick passthrough resolution, which has no
    /// bucket width.
    #[must_use]
    pub fn new(resolution: Resolution) -> Option<Self> {
        let bucket_ms = resolution.millis()?;
        Some(Self {
            resolution,
            bucket_ms,
            bars: BTreeMap::new(),
        })
    }

    /// Returns the resolution being aggregated to.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Applies one trade to its bucket's bar, creating the bar on first use.
    pub fn on_event(&mut self, trade: &TradeTick) {
        let key = bucket_key(trade.offset_ms, self.bucket_ms);
        self.bars
            .entry(key)
            .and_modify(|bar| bar.apply(trade))
            .or_insert_with(|| TradeBar::open_with(key, trade));
    }

    /// Flushes the finalized bars in ascending bucket order.
    ///
    /// Buckets that received no events do not appear; gaps are not
    /// zero-filled.
    #[must_use]
    pub fn into_bars(self) -> Vec<TradeBar> {
        self.bars.into_values().collect()
    }
}

/// Streaming quote aggregator for a single resolution.
#[derive(Debug)]
pub struct QuoteAggregator {
    resolution: Resolution,
    bucket_ms: i64,
    bars: BTreeMap<i64, QuoteBar>,
}

impl QuoteAggregator {
    /// Creates an aggregator for the given resolution.
    ///
    /// Returns `None` for the tick passthrough resolution.
    #[must_use]
    pub fn new(resolution: Resolution) -> Option<Self> {
        let bucket_ms = resolution.millis()?;
        Some(Self {
            resolution,
            bucket_ms,
            bars: BTreeMap::new(),
        })
    }

    /// Returns the resolution being aggregated to.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Applies one quote to its bucket's bar, creating the bar on first use.
    pub fn on_event(&mut self, quote: &QuoteTick) {
        let key = bucket_key(quote.offset_ms, self.bucket_ms);
        self.bars
            .entry(key)
            .and_modify(|bar| bar.apply(quote))
            .or_insert_with(|| QuoteBar::open_with(key, quote));
    }

    /// Flushes the finalized bars in ascending bucket order.
    #[must_use]
    pub fn into_bars(self) -> Vec<QuoteBar> {
        self.bars.into_values().collect()
    }
}

/// One aggregator per bar resolution for a single (date, type) pipeline.
///
/// Every event is fanned out to all aggregators of its type synchronously
/// before the next line is requested, keeping aggregation order-dependent
/// state consistent across resolutions.
#[derive(Debug)]
pub enum AggregatorSet {
    /// Trade aggregators, one per bar resolution.
    Trade(Vec<TradeAggregator>),
    /// Quote aggregators, one per bar resolution.
    Quote(Vec<QuoteAggregator>),
}

impl AggregatorSet {
    /// Creates the aggregator set for the given event type, covering every
    /// bar resolution in the registry.
    #[must_use]
    pub fn for_event_type(event_type: EventType) -> Self {
        match event_type {
            EventType::Trade => Self::Trade(
                Resolution::bar_resolutions()
                    .iter()
                    .filter_map(|r| TradeAggregator::new(*r))
                    .collect(),
            ),
            EventType::Quote => Self::Quote(
                Resolution::bar_resolutions()
                    .iter()
                    .filter_map(|r| QuoteAggregator::new(*r))
                    .collect(),
            ),
        }
    }

    /// Fans one event out to every aggregator of its type.
    ///
    /// A pipeline only ever feeds the type it was created for; an event of
    /// the other type is a wiring bug. Debug builds assert on it, release
    /// builds drop the event.
    pub fn on_event(&mut self, event: &Event) {
        match (self, event) {
            (Self::Trade(aggs), Event::Trade(t)) => {
                for agg in aggs {
                    agg.on_event(t);
                }
            }
            (Self::Quote(aggs), Event::Quote(q)) => {
                for agg in aggs {
                    agg.on_event(q);
                }
            }
            _ => debug_assert!(false, "mismatched event type for aggregator set"),
        }
    }

    /// Flushes every aggregator, yielding per-resolution bars in ascending
    /// bucket order.
    #[must_use]
    pub fn flush(self) -> FlushedSet {
        match self {
            Self::Trade(aggs) => FlushedSet::Trade(
                aggs.into_iter()
                    .map(|a| (a.resolution(), a.into_bars()))
                    .collect(),
            ),
            Self::Quote(aggs) => FlushedSet::Quote(
                aggs.into_iter()
                    .map(|a| (a.resolution(), a.into_bars()))
                    .collect(),
            ),
        }
    }
}

/// Finalized per-resolution bars produced by [`AggregatorSet::flush`].
#[derive(Debug)]
pub enum FlushedSet {
    /// Trade bars per resolution.
    Trade(Vec<(Resolution, Vec<TradeBar>)>),
    /// Quote bars per resolution.
    Quote(Vec<(Resolution, Vec<QuoteBar>)>),
}
