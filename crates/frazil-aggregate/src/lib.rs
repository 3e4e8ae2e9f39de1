//! OHLCV aggregation for the frazil tick archiver.
//!
//! This crate provides tick-to-bar aggregation:
//!
//! - [`TradeBar`] / [`QuoteBar`] - Bar data structures and merge rules
//! - [`TradeAggregator`] / [`QuoteAggregator`] - Per-resolution streaming aggregators
//! - [`AggregatorSet`] - Fan-out across all bar resolutions for one pipeline

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;

pub use aggregator::{AggregatorSet, FlushedSet, QuoteAggregator, TradeAggregator, bucket_key};
pub use bar::{QuoteBar, TradeBar};
