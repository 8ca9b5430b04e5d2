//! Analysis modules.
//!
//! Reduction of benchmark trials into per-phase summaries.

pub mod aggregator;

pub use aggregator::*;
