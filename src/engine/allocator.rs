use alloy::primitives::I256;

use crate::model::amount::WEIGHT_DECIMALS;
use crate::model::position::{
    Position, PositionDelta, TargetValues, TargetWeight, lookup_or_zero,
};

use super::error::{Result, StrategyError};
use super::normalize::ten_pow;
use super::valuation::nav;

/// Target USD value per weighted name: `weight * nav / 10^WEIGHT_DECIMALS`.
///
/// Weights that do not sum to exactly one leave part of NAV unallocated (or
/// over-allocate it); that is accepted.
pub fn target_values(positions: &[Position], weights: &[TargetWeight]) -> Result<TargetValues> {
    let nav = nav(positions)?;
    let scale = ten_pow(WEIGHT_DECIMALS)?;

    weights
        .iter()
        .map(|w| {
            let value = w
                .weight
                .checked_mul(nav)
                .ok_or(StrategyError::Overflow("target value"))?
                / scale;
            Ok((w.name.clone(), value))
        })
        .collect()
}

/// `target - current` over the union of position and target names.
///
/// Positions come first in their own order, then targets with no position.
/// A missing side counts as zero.
pub fn position_deltas(positions: &[Position], targets: &TargetValues) -> Vec<PositionDelta> {
    let mut names: Vec<&str> = Vec::with_capacity(positions.len() + targets.len());
    for name in positions.iter().map(|p| p.name.as_str()).chain(targets.names()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let current = lookup_or_zero(positions.iter().map(|p| (p.name.as_str(), p.value)), name);
            let target = lookup_or_zero(targets.iter(), name);
            PositionDelta {
                name: name.to_string(),
                delta: target - current,
            }
        })
        .collect()
}

/// Delta with the largest value. Ties keep the first one encountered.
pub fn largest_position_delta(deltas: &[PositionDelta]) -> Result<&PositionDelta> {
    let mut iter = deltas.iter();
    let first = iter
        .next()
        .ok_or_else(|| StrategyError::nothing_to_do("No position deltas to select from"))?;
    Ok(iter.fold(first, |best, d| if d.delta > best.delta { d } else { best }))
}

/// Position with the largest shortfall against its target.
///
/// A targeted name with no valued position yields an empty position.
pub fn next_position(positions: &[Position], weights: &[TargetWeight]) -> Result<Position> {
    let targets = target_values(positions, weights)?;
    let deltas = position_deltas(positions, &targets);
    let largest = largest_position_delta(&deltas)?;

    Ok(positions
        .iter()
        .find(|p| p.name == largest.name)
        .cloned()
        .unwrap_or_else(|| Position::empty(&largest.name)))
}
