pub mod amount;
pub mod config;
pub mod position;

pub use amount::{FixedPoint, RebalanceAmount, TokenAmount};
pub use config::{Config, ConfigFile, ReservePool, ReservePools, SizingConfig, SwapConfig};
pub use position::{Position, PositionDelta, PositionToken, TargetValues, TargetWeight};
