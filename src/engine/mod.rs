//! Rebalancing and capital-allocation decisions.
//!
//! Everything here is integer fixed-point arithmetic over [`alloy`] signed
//! 256-bit integers. Collaborators (chain reads, prices) come in as trait
//! objects so each step can run against mocks.

pub mod allocator;
pub mod error;
pub mod normalize;
pub mod reserve;
pub mod sizing;
pub mod swap;
pub mod valuation;

pub use error::{ErrorKind, Result, StageContext, StrategyError};
pub use sizing::Strategy;
pub use valuation::TvlManager;
