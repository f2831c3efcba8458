//! Analysis modules.
//!
//! Statistics over a classified record collection.

pub mod aggregator;

pub use aggregator::*;
