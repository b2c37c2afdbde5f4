mod common;

use std::collections::HashMap;

use alloy::primitives::{Address, I256};
use proptest::prelude::*;

use common::*;
use lp_autotasks::engine::ErrorKind;
use lp_autotasks::engine::reserve::{
    COMPARISON_DECIMALS, excess_reserve_ids, largest_token_amount, normalize_rebalance_amounts,
    pair_rebalance_amounts, underlyers_with_net_excess,
};
use lp_autotasks::model::amount::{RebalanceAmount, TokenAmount};
use lp_autotasks::model::config::ReservePools;

fn ra(address: Address, amount: I256) -> RebalanceAmount {
    RebalanceAmount::new(address, amount)
}

fn balances(entries: &[(Address, I256)]) -> HashMap<Address, I256> {
    entries.iter().copied().collect()
}

// ── Net excess ───────────────────────────────────────────────────────

#[test]
fn test_net_excess_keeps_only_positive_surplus() {
    let amounts = [ra(R0, units(100, 18)), ra(R1, units(-50, 6))];
    let balances = balances(&[(U0, units(80, 18)), (U1, units(200, 6))]);

    let excess = underlyers_with_net_excess(&amounts, &balances, &reserve_pools()).unwrap();
    assert_eq!(excess, vec![TokenAmount::new(U1, units(250, 6))]);
}

#[test]
fn test_net_excess_exactly_covered_is_dropped() {
    let amounts = [ra(R0, units(80, 18))];
    let balances = balances(&[(U0, units(80, 18)), (U1, I256::ZERO)]);

    let excess = underlyers_with_net_excess(&amounts, &balances, &reserve_pools()).unwrap();
    assert!(excess.is_empty());
}

#[test]
fn test_net_excess_preserves_input_order() {
    let amounts = [ra(R1, units(-1, 6)), ra(R0, units(-1, 18))];
    let balances = balances(&[(U0, units(1, 18)), (U1, units(1, 6))]);

    let excess = underlyers_with_net_excess(&amounts, &balances, &reserve_pools()).unwrap();
    assert_eq!(
        excess,
        vec![
            TokenAmount::new(U1, units(2, 6)),
            TokenAmount::new(U0, units(2, 18)),
        ]
    );
}

#[test]
fn test_net_excess_unconfigured_pool() {
    let stranger = addr(0x77);
    let amounts = [ra(stranger, i(-1))];
    let err = underlyers_with_net_excess(&amounts, &HashMap::new(), &reserve_pools()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains(&stranger.to_string()));
}

#[test]
fn test_net_excess_missing_balance() {
    let amounts = [ra(R0, i(-1))];
    let balances = balances(&[(U1, i(10))]);
    let err = underlyers_with_net_excess(&amounts, &balances, &reserve_pools()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains(&U0.to_string()));
}

proptest! {
    #[test]
    fn prop_net_excess_is_strictly_positive(
        rebalance in prop::collection::vec((any::<bool>(), -1_000_000i128..1_000_000), 0..8),
        b0 in 0i128..1_000_000,
        b1 in 0i128..1_000_000,
    ) {
        let amounts: Vec<_> = rebalance
            .iter()
            .map(|(first, a)| ra(if *first { R0 } else { R1 }, i(*a)))
            .collect();
        let balances = balances(&[(U0, i(b0)), (U1, i(b1))]);

        let excess = underlyers_with_net_excess(&amounts, &balances, &reserve_pools()).unwrap();
        prop_assert!(excess.len() <= amounts.len());
        prop_assert!(excess.iter().all(|ta| ta.amount > I256::ZERO));
    }
}

// ── Largest token amount ─────────────────────────────────────────────

#[tokio::test]
async fn test_largest_token_amount_compares_normalized() {
    let chain = MockChain::new().with_decimals(U0, 18).with_decimals(U1, 6);
    let amounts = [
        TokenAmount::new(U0, units(300, 18)),
        TokenAmount::new(U1, units(400, 6)),
    ];

    let largest = largest_token_amount(&amounts, COMPARISON_DECIMALS, &chain).await.unwrap();
    assert_eq!(largest, TokenAmount::new(U1, units(400, 18)));
}

#[tokio::test]
async fn test_largest_token_amount_tie_keeps_first() {
    let chain = MockChain::new().with_decimals(U0, 18).with_decimals(U1, 6);
    let amounts = [
        TokenAmount::new(U0, units(5, 18)),
        TokenAmount::new(U1, units(5, 6)),
    ];

    let largest = largest_token_amount(&amounts, COMPARISON_DECIMALS, &chain).await.unwrap();
    assert_eq!(largest.address, U0);
}

#[tokio::test]
async fn test_largest_token_amount_empty_is_nothing_to_do() {
    let chain = MockChain::new();
    let err = largest_token_amount(&[], COMPARISON_DECIMALS, &chain).await.unwrap_err();
    assert!(err.is_nothing_to_do());
}

#[tokio::test]
async fn test_largest_token_amount_decimals_failure() {
    let chain = MockChain::new().with_decimals(U0, 18);
    let amounts = [TokenAmount::new(U1, i(1))];

    let err = largest_token_amount(&amounts, COMPARISON_DECIMALS, &chain).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Collaborator);
}

// ── Excess reserve ids ───────────────────────────────────────────────

#[test]
fn test_excess_reserve_ids_selects_negative_amounts() {
    let amounts = [ra(R0, i(-1)), ra(R1, i(5))];
    assert_eq!(excess_reserve_ids(&amounts, &reserve_pools()).unwrap(), vec![0]);

    let amounts = [ra(R1, i(-7)), ra(R0, i(-1))];
    assert_eq!(excess_reserve_ids(&amounts, &reserve_pools()).unwrap(), vec![1, 0]);
}

#[test]
fn test_excess_reserve_ids_zero_is_not_excess() {
    let amounts = [ra(R0, I256::ZERO), ra(R1, I256::ZERO)];
    assert!(excess_reserve_ids(&amounts, &reserve_pools()).unwrap().is_empty());
}

#[test]
fn test_excess_reserve_ids_unconfigured_pool() {
    let amounts = [ra(addr(0x42), i(-1))];
    let err = excess_reserve_ids(&amounts, &reserve_pools()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ── Rebalance amount plumbing ────────────────────────────────────────

#[test]
fn test_normalize_rebalance_amounts_to_widest_decimals() {
    let amounts = [ra(R0, units(-3, 18)), ra(R1, units(2, 6))];
    let normalized = normalize_rebalance_amounts(&amounts, &reserve_pools()).unwrap();

    assert_eq!(normalized, vec![ra(R0, units(-3, 18)), ra(R1, units(2, 18))]);
}

#[test]
fn test_normalize_rebalance_amounts_without_pools() {
    let empty = ReservePools::new(vec![]);
    assert!(normalize_rebalance_amounts(&[], &empty).unwrap().is_empty());

    let err = normalize_rebalance_amounts(&[ra(R0, i(1))], &empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_pair_rebalance_amounts() {
    let paired = pair_rebalance_amounts(vec![R0, R1], vec![i(-1), i(2)]).unwrap();
    assert_eq!(paired, vec![ra(R0, i(-1)), ra(R1, i(2))]);

    let err = pair_rebalance_amounts(vec![R0, R1], vec![i(-1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputShape);
}
