//! Core Module - Scraping Pipeline
//!
//! Table extraction, enrichment, pagination, aggregation, publishing and
//! the per-account run loop.

pub mod aggregator;
pub mod enricher;
pub mod extractor;
pub mod paginator;
pub mod publisher;
pub mod runner;

pub use aggregator::*;
pub use enricher::*;
pub use extractor::*;
pub use paginator::*;
pub use publisher::*;
pub use runner::{AccountRunner, RunJob};
