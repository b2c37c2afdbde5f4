use std::collections::{HashMap, HashSet};
use std::path::Path;

use alloy::primitives::{Address, I256};
use thiserror::Error;

use crate::model::amount::{
    FixedPoint, POSITION_ADD_PCT_DECIMALS, PRICE_DECIMALS, SLIPPAGE_DECIMALS, USD_DECIMALS,
    WEIGHT_DECIMALS,
};
use crate::model::config::{
    Config, ConfigFile, ReservePool, ReservePools, SizingConfig, SwapConfig, SwapEntry,
};
use crate::model::position::TargetWeight;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` is not a valid address: `{value}`")]
    InvalidAddress { field: String, value: String },

    #[error("`{field}` is not a valid decimal: `{value}`")]
    InvalidDecimal { field: String, value: String },

    #[error("`{field}` cannot be negative")]
    Negative { field: String },

    #[error("`{field}` = {value} is outside 0..=76")]
    DecimalsOutOfRange { field: String, value: i64 },

    #[error("Duplicate reserve pool {address}")]
    DuplicateReservePool { address: Address },

    #[error("Duplicate reserve pool id {id}")]
    DuplicateReserveId { id: u64 },

    #[error("Duplicate target weight `{name}`")]
    DuplicateTargetWeight { name: String },

    #[error("Duplicate swap key `{key}`")]
    DuplicateSwap { key: String },

    #[error("Curve pool {pool} token {token} has no depeg threshold")]
    MissingDepegThreshold { pool: Address, token: Address },
}

/// Load and fully validate a config file.
pub fn load_config(path: &Path) -> Result<Config, Vec<ConfigError>> {
    let contents = std::fs::read_to_string(path).map_err(|e| vec![ConfigError::Io(e)])?;
    let file: ConfigFile =
        serde_json::from_str(&contents).map_err(|e| vec![ConfigError::Json(e)])?;
    validate(&file)
}

/// Validate a parsed config file, collecting all errors.
pub fn validate(file: &ConfigFile) -> Result<Config, Vec<ConfigError>> {
    let mut errors = Vec::new();

    let lp_safe = address(&mut errors, "lp_safe", &file.lp_safe);
    let lp_account = address(&mut errors, "lp_account", &file.lp_account);
    let meta_pool_token = address(&mut errors, "meta_pool_token", &file.meta_pool_token);
    let tvl_manager = address(&mut errors, "tvl_manager", &file.tvl_manager);

    let reserve_pools = reserve_pools(&mut errors, file);
    let target_weights = target_weights(&mut errors, file);
    let swaps = swaps(&mut errors, &file.swaps);

    let mut depeg_thresholds = HashMap::new();
    for (token, threshold) in &file.depeg_thresholds {
        let field = format!("depeg_thresholds.{token}");
        let token = address(&mut errors, &field, token);
        let threshold = decimal(&mut errors, &field, threshold, PRICE_DECIMALS);
        if let (Some(token), Some(threshold)) = (token, threshold) {
            depeg_thresholds.insert(token, threshold);
        }
    }

    let mut curve_pools = HashMap::new();
    for (pool, tokens) in &file.curve_pools {
        let field = format!("curve_pools.{pool}");
        let Some(pool) = address(&mut errors, &field, pool) else {
            continue;
        };
        let tokens: Vec<Address> = tokens
            .iter()
            .filter_map(|t| address(&mut errors, &field, t))
            .collect();
        for token in &tokens {
            if !depeg_thresholds.contains_key(token) {
                errors.push(ConfigError::MissingDepegThreshold { pool, token: *token });
            }
        }
        curve_pools.insert(pool, tokens);
    }

    let sizing = sizing(&mut errors, file);

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every `Option` above is `Some` when no error was recorded.
    match (lp_safe, lp_account, meta_pool_token, tvl_manager, sizing) {
        (Some(lp_safe), Some(lp_account), Some(meta_pool_token), Some(tvl_manager), Some(sizing)) => {
            Ok(Config {
                lp_safe,
                lp_account,
                meta_pool_token,
                tvl_manager,
                reserve_pools,
                target_weights,
                swaps,
                depeg_thresholds,
                curve_pools,
                sizing,
            })
        }
        _ => Err(errors),
    }
}

fn reserve_pools(errors: &mut Vec<ConfigError>, file: &ConfigFile) -> ReservePools {
    let mut pools = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, entry) in file.reserve_pools.iter().enumerate() {
        let field = format!("reserve_pools[{i}]");
        let pool_address = address(errors, &format!("{field}.address"), &entry.address);
        let underlyer = address(errors, &format!("{field}.underlyer"), &entry.underlyer);
        let decimals = decimals(errors, &format!("{field}.underlyer_decimals"), entry.underlyer_decimals);

        if !seen_ids.insert(entry.id) {
            errors.push(ConfigError::DuplicateReserveId { id: entry.id });
        }

        if let (Some(address), Some(underlyer), Some(underlyer_decimals)) = (pool_address, underlyer, decimals) {
            if pools.iter().any(|p: &ReservePool| p.address == address) {
                errors.push(ConfigError::DuplicateReservePool { address });
                continue;
            }
            pools.push(ReservePool {
                address,
                underlyer,
                underlyer_decimals,
                id: entry.id,
            });
        }
    }

    ReservePools::new(pools)
}

fn target_weights(errors: &mut Vec<ConfigError>, file: &ConfigFile) -> Vec<TargetWeight> {
    let mut weights: Vec<TargetWeight> = Vec::new();

    for entry in &file.target_weights {
        let field = format!("target_weights.{}", entry.name);
        if weights.iter().any(|w| w.name == entry.name) {
            errors.push(ConfigError::DuplicateTargetWeight { name: entry.name.clone() });
            continue;
        }
        if let Some(weight) = decimal(errors, &field, &entry.weight, WEIGHT_DECIMALS) {
            weights.push(TargetWeight {
                name: entry.name.clone(),
                weight: weight.value,
            });
        }
    }

    weights
}

fn swaps(errors: &mut Vec<ConfigError>, entries: &[SwapEntry]) -> Vec<SwapConfig> {
    let mut swaps: Vec<SwapConfig> = Vec::new();

    for entry in entries {
        let field = format!("swaps.{}", entry.key);
        if swaps.iter().any(|s| s.key == entry.key) {
            errors.push(ConfigError::DuplicateSwap { key: entry.key.clone() });
            continue;
        }
        let token = address(errors, &format!("{field}.token"), &entry.token);
        let in_decimals = decimals(errors, &format!("{field}.in_token_decimals"), entry.in_token_decimals);
        let out_decimals = decimals(errors, &format!("{field}.out_token_decimals"), entry.out_token_decimals);
        let slippage = decimal(errors, &format!("{field}.slippage"), &entry.slippage, SLIPPAGE_DECIMALS);

        if let (Some(token), Some(in_token_decimals), Some(out_token_decimals), Some(_)) =
            (token, in_decimals, out_decimals, slippage)
        {
            swaps.push(SwapConfig {
                key: entry.key.clone(),
                name: entry.name.clone(),
                token,
                in_token_decimals,
                out_token_decimals,
                slippage: entry.slippage.trim().to_string(),
            });
        }
    }

    swaps
}

fn sizing(errors: &mut Vec<ConfigError>, file: &ConfigFile) -> Option<SizingConfig> {
    let entry = &file.sizing;
    let pct = decimal(errors, "sizing.position_add_pct", &entry.position_add_pct, POSITION_ADD_PCT_DECIMALS);
    let max = decimal(errors, "sizing.max_add_liquidity", &entry.max_add_liquidity, USD_DECIMALS);
    let min_swap = decimal(errors, "sizing.min_swap_usd", &entry.min_swap_usd, USD_DECIMALS);

    Some(SizingConfig {
        position_add_pct: pct?,
        max_add_liquidity: max?.value,
        min_swap_usd: min_swap?.value,
    })
}

// ── Field parsers ────────────────────────────────────────────────────

fn address(errors: &mut Vec<ConfigError>, field: &str, value: &str) -> Option<Address> {
    match value.trim().parse::<Address>() {
        Ok(a) => Some(a),
        Err(_) => {
            errors.push(ConfigError::InvalidAddress {
                field: field.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}

fn decimals(errors: &mut Vec<ConfigError>, field: &str, value: i64) -> Option<u8> {
    if value < 0 {
        errors.push(ConfigError::Negative { field: field.to_string() });
        return None;
    }
    // 10^77 no longer fits a signed 256-bit integer.
    match u8::try_from(value) {
        Ok(d) if d <= 76 => Some(d),
        _ => {
            errors.push(ConfigError::DecimalsOutOfRange {
                field: field.to_string(),
                value,
            });
            None
        }
    }
}

fn decimal(
    errors: &mut Vec<ConfigError>,
    field: &str,
    value: &str,
    decimals: u8,
) -> Option<FixedPoint> {
    match FixedPoint::parse(value, decimals) {
        Ok(v) if v.value < I256::ZERO => {
            errors.push(ConfigError::Negative { field: field.to_string() });
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(ConfigError::InvalidDecimal {
                field: field.to_string(),
                value: value.to_string(),
            });
            None
        }
    }
}

/// CLI entry point for the `validate-config` subcommand.
pub fn run(path: &Path) -> anyhow::Result<()> {
    match load_config(path) {
        Ok(config) => {
            println!(
                "Config '{}' is valid. {} reserve pools, {} target weights, {} swaps, {} curve pools.",
                path.display(),
                config.reserve_pools.len(),
                config.target_weights.len(),
                config.swaps.len(),
                config.curve_pools.len(),
            );
            Ok(())
        }
        Err(errors) => {
            eprintln!("Validation failed with {} error(s):", errors.len());
            for (i, e) in errors.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, e);
            }
            std::process::exit(1);
        }
    }
}
