mod common;

use std::collections::HashSet;

use alloy::primitives::I256;
use proptest::prelude::*;

use common::*;
use lp_autotasks::engine::ErrorKind;
use lp_autotasks::engine::allocator::{
    largest_position_delta, next_position, position_deltas, target_values,
};
use lp_autotasks::model::position::{Position, PositionDelta, TargetValues};

fn position(name: &str, value: i128) -> Position {
    Position {
        name: name.into(),
        value: i(value),
        tokens: vec![],
    }
}

fn delta(name: &str, delta: i128) -> PositionDelta {
    PositionDelta {
        name: name.into(),
        delta: i(delta),
    }
}

fn three_positions() -> Vec<Position> {
    vec![
        position("convex-3pool", 100),
        position("convex-frax", 100),
        position("convex-susdv2", 100),
    ]
}

// ── Target values ────────────────────────────────────────────────────

#[test]
fn test_target_values_split_nav_by_weight() {
    let targets = target_values(
        &three_positions(),
        &weights(&[("convex-3pool", "0.20"), ("convex-frax", "0.30"), ("convex-susdv2", "0.50")]),
    )
    .unwrap();

    assert_eq!(targets.get("convex-3pool"), Some(i(60)));
    assert_eq!(targets.get("convex-frax"), Some(i(90)));
    assert_eq!(targets.get("convex-susdv2"), Some(i(150)));
}

#[test]
fn test_target_values_floor_when_weights_do_not_sum_to_one() {
    let targets = target_values(&[position("a", 100)], &weights(&[("a", "0.333"), ("b", "0.333")])).unwrap();
    assert_eq!(targets.get("a"), Some(i(33)));
    assert_eq!(targets.get("b"), Some(i(33)));
}

#[test]
fn test_target_values_empty_positions() {
    let targets = target_values(&[], &weights(&[("a", "1.0")])).unwrap();
    assert_eq!(targets.get("a"), Some(I256::ZERO));
}

// ── Deltas ───────────────────────────────────────────────────────────

#[test]
fn test_position_deltas_cover_union_of_names() {
    let positions = vec![position("A", 100), position("B", 100)];
    let targets: TargetValues = [("A", i(60)), ("B", i(90)), ("C", i(150))].into_iter().collect();

    assert_eq!(
        position_deltas(&positions, &targets),
        vec![delta("A", -40), delta("B", -10), delta("C", 150)]
    );
}

#[test]
fn test_position_without_target_has_zero_target() {
    let positions = vec![position("A", 100), position("orphan", 25)];
    let targets: TargetValues = [("A", i(60))].into_iter().collect();

    assert_eq!(
        position_deltas(&positions, &targets),
        vec![delta("A", -40), delta("orphan", -25)]
    );
}

#[test]
fn test_three_pool_over_target() {
    let positions = three_positions();
    let targets = target_values(
        &positions,
        &weights(&[("convex-3pool", "0.20"), ("convex-frax", "0.30"), ("convex-susdv2", "0.50")]),
    )
    .unwrap();

    assert_eq!(
        position_deltas(&positions, &targets),
        vec![
            delta("convex-3pool", -40),
            delta("convex-frax", -10),
            delta("convex-susdv2", 50),
        ]
    );
}

// ── Largest delta ────────────────────────────────────────────────────

#[test]
fn test_largest_delta_empty_is_nothing_to_do() {
    let err = largest_position_delta(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NothingToDo);
}

#[test]
fn test_largest_delta_selects_max() {
    let deltas = vec![delta("a", -100), delta("b", 50), delta("c", -10)];
    assert_eq!(largest_position_delta(&deltas).unwrap().name, "b");
}

#[test]
fn test_largest_delta_tie_keeps_first() {
    let deltas = vec![delta("a", 5), delta("b", 7), delta("c", 7)];
    assert_eq!(largest_position_delta(&deltas).unwrap().name, "b");
}

#[test]
fn test_largest_delta_all_negative() {
    let deltas = vec![delta("a", -100), delta("b", -3)];
    assert_eq!(largest_position_delta(&deltas).unwrap().name, "b");
}

// ── Next position ────────────────────────────────────────────────────

#[test]
fn test_next_position_returns_valued_position() {
    let next = next_position(
        &three_positions(),
        &weights(&[("convex-3pool", "0.20"), ("convex-frax", "0.30"), ("convex-susdv2", "0.50")]),
    )
    .unwrap();
    assert_eq!(next, position("convex-susdv2", 100));
}

#[test]
fn test_next_position_falls_back_to_empty_position() {
    let next = next_position(
        &[position("A", 100)],
        &weights(&[("A", "0.10"), ("B", "0.90")]),
    )
    .unwrap();
    assert_eq!(next, Position::empty("B"));
}

#[test]
fn test_next_position_with_nothing_configured() {
    let err = next_position(&[], &[]).unwrap_err();
    assert!(err.is_nothing_to_do());
}

// ── Properties ───────────────────────────────────────────────────────

fn weights_summing_to_one(n: usize) -> impl Strategy<Value = Vec<i128>> {
    prop::collection::vec(1i128..1_000, n).prop_map(|raw| {
        let total: i128 = raw.iter().sum();
        let mut scaled: Vec<i128> = raw.iter().map(|r| r * 100_000_000 / total).collect();
        let assigned: i128 = scaled.iter().sum();
        scaled[0] += 100_000_000 - assigned;
        scaled
    })
}

proptest! {
    #[test]
    fn prop_targets_reconcile_with_nav(
        raw in (1usize..8).prop_flat_map(weights_summing_to_one),
        nav in 0i128..1_000_000_000_000_000_000,
    ) {
        let positions = vec![position("all", nav)];
        let weights: Vec<_> = raw
            .iter()
            .enumerate()
            .map(|(n, w)| lp_autotasks::model::position::TargetWeight { name: format!("w{n}"), weight: i(*w) })
            .collect();

        let targets = target_values(&positions, &weights).unwrap();
        let total = targets.iter().fold(I256::ZERO, |acc, (_, v)| acc + v);
        prop_assert!(total <= i(nav));
        prop_assert!(i(nav) - total <= i(weights.len() as i128));
    }

    #[test]
    fn prop_deltas_cover_every_name_once(
        position_names in prop::collection::hash_set("[a-e]", 0..5),
        target_names in prop::collection::hash_set("[c-h]", 0..5),
    ) {
        let positions: Vec<Position> = position_names.iter().map(|n| position(n, 10)).collect();
        let targets: TargetValues = target_names.iter().map(|n| (n.clone(), i(5))).collect();

        let deltas = position_deltas(&positions, &targets);
        let expected: HashSet<&String> = position_names.iter().chain(target_names.iter()).collect();

        prop_assert_eq!(deltas.len(), expected.len());
        let seen: HashSet<&String> = deltas.iter().map(|d| &d.name).collect();
        prop_assert_eq!(seen, expected);
    }
}
