//! HTTP client and data fetching for the frazil tick archiver.
//!
//! This crate provides the download half of the pipeline:
//!
//! - [`url::object_url`] - Constructs per-day object URLs
//! - [`DownloadClient`] - HTTP client with connection pooling and retries
//! - [`LineAssembler`] - Reassembles complete lines from arbitrary byte chunks
//! - [`parse_line`] - Normalizes a CSV row into a typed [`frazil_types::Event`]

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod lines;
mod parse;
pub mod url;

pub use client::{ClientConfig, DownloadClient, DownloadError};
pub use lines::LineAssembler;
pub use parse::{ParseError, parse_line};
