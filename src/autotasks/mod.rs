//! One module per scheduled job. Each `run` takes its collaborators as trait
//! objects and returns what it executed.

pub mod add_liquidity;
pub mod deploy_excess_reserves;
pub mod depeg_sentinel;
pub mod harvest;
pub mod positions;
