//! Pipeline coordination for the frazil tick archiver.
//!
//! This crate wires the download, reassembly, normalization, aggregation,
//! and archiving stages together:
//!
//! - [`PipelineConfig`] - Read-only configuration shared by all pipelines
//! - [`run_pipeline`] - One (date, type) pipeline with cleanup on failure
//! - [`Coordinator`] - Concurrent execution across a date range
//! - [`RunReport`] - Final success/failure summary for operators

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod coordinator;
mod pipeline;
mod report;

pub use config::PipelineConfig;
pub use coordinator::Coordinator;
pub use pipeline::{MAX_MALFORMED_EVENTS, Outcome, run_pipeline};
pub use report::{PipelineFailure, RunReport};
