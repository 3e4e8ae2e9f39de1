//! Archive output for the frazil tick archiver.
//!
//! This crate persists pipeline output:
//!
//! - [`archive_path`] / [`ensure_layout`] - Output tree layout
//! - [`ArchiveWriter`] - Zip with one CSV member, written row by row
//! - [`rows`] - CSV row serialization for bars and raw ticks
//! - [`remove_archives`] - Failure/cancellation cleanup across resolutions

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod path;
pub mod rows;
mod writer;

pub use path::{archive_path, ensure_layout, member_name};
pub use writer::{ArchiveWriter, remove_archives, write_archive};
