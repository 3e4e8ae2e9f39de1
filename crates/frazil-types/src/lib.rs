//! Core types for the frazil tick archiver.
//!
//! This crate provides the fundamental data structures used throughout frazil:
//!
//! - [`Event`] - A normalized quote or trade event
//! - [`EventType`] - The two published feed types (quote / trade)
//! - [`Resolution`] - Bar resolution registry, including tick passthrough
//! - [`DateRange`] - Inclusive day range for data retrieval

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod event;
mod resolution;

pub use date_range::{COMPACT_DATE_FORMAT, DateRange, DayIterator, parse_compact_date};
pub use error::{DateRangeError, FrazilError, Result};
pub use event::{Event, EventType, QuoteTick, Side, TradeTick, MS_PER_DAY};
pub use resolution::{Resolution, ResolutionParseError};
