use alloy::primitives::Address;
use thiserror::Error;

use crate::model::amount::AmountError;

pub type Result<T, E = StrategyError> = std::result::Result<T, E>;

/// Broad class of a [`StrategyError`], used by callers to branch without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Deployment or config defect. Never retried.
    Configuration,
    /// A collaborator returned inconsistent data (e.g. mismatched lengths).
    InputShape,
    /// Nothing to do this run. The CLI treats it as a successful no-op.
    NothingToDo,
    /// Negative price, slippage or computed amount, or arithmetic overflow.
    Bounds,
    /// RPC or HTTP failure.
    Collaborator,
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Reserve pool {0} is not configured")]
    UnconfiguredReservePool(Address),

    #[error("No balance for underlyer {0}")]
    MissingBalance(Address),

    #[error("Depeg threshold for {0} is not configured")]
    UnconfiguredDepegThreshold(Address),

    #[error("Curve pool {0} is not configured")]
    UnconfiguredCurvePool(Address),

    #[error("Token {token} is not held by position `{position}`")]
    TokenNotInPosition { token: Address, position: String },

    #[error("Length mismatch: {left} {what} vs {right}")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("No price returned for {0}")]
    MissingPrice(Address),

    #[error("Sentinel payload has no request")]
    MissingSentinelRequest,

    #[error("{0}")]
    NothingToDo(String),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("{stage}")]
    Stage {
        stage: String,
        #[source]
        source: Box<StrategyError>,
    },

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl StrategyError {
    pub fn nothing_to_do(msg: impl Into<String>) -> Self {
        StrategyError::NothingToDo(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StrategyError::UnconfiguredReservePool(_)
            | StrategyError::MissingBalance(_)
            | StrategyError::UnconfiguredDepegThreshold(_)
            | StrategyError::UnconfiguredCurvePool(_)
            | StrategyError::TokenNotInPosition { .. } => ErrorKind::Configuration,
            StrategyError::LengthMismatch { .. }
            | StrategyError::MissingPrice(_)
            | StrategyError::MissingSentinelRequest => ErrorKind::InputShape,
            StrategyError::NothingToDo(_) => ErrorKind::NothingToDo,
            StrategyError::Negative(_)
            | StrategyError::Overflow(_)
            | StrategyError::Amount(_) => ErrorKind::Bounds,
            StrategyError::Stage { source, .. } => source.kind(),
            StrategyError::Collaborator(_) => ErrorKind::Collaborator,
        }
    }

    pub fn is_nothing_to_do(&self) -> bool {
        self.kind() == ErrorKind::NothingToDo
    }

    /// Innermost error beneath any stage wrappers.
    pub fn root(&self) -> &StrategyError {
        match self {
            StrategyError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach a stage description to a failure, keeping the cause as `source()`.
pub trait StageContext<T> {
    fn stage(self, stage: &str) -> Result<T>;
}

impl<T, E: Into<StrategyError>> StageContext<T> for std::result::Result<T, E> {
    fn stage(self, stage: &str) -> Result<T> {
        self.map_err(|e| StrategyError::Stage {
            stage: stage.to_string(),
            source: Box::new(e.into()),
        })
    }
}

/// Check that two collaborator-provided arrays line up.
pub fn ensure_same_len(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(StrategyError::LengthMismatch { what, left, right });
    }
    Ok(())
}
