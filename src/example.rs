use alloy::primitives::Address;

use crate::model::config::{ConfigFile, ReservePoolEntry, TargetWeightEntry, mainnet};

/// Example config: mainnet stablecoin reserve pools funding three Convex
/// positions. Protocol contract addresses are placeholders.
pub fn example_config() -> ConfigFile {
    let reserve_pool = |address: &str, underlyer: Address, decimals: i64, id: u64| {
        ReservePoolEntry {
            address: address.to_string(),
            underlyer: underlyer.to_string(),
            underlyer_decimals: decimals,
            id,
        }
    };
    let weight = |name: &str, weight: &str| TargetWeightEntry {
        name: name.to_string(),
        weight: weight.to_string(),
    };

    let mut config = ConfigFile::new("0xYourMetaPoolTokenAddress", "0xYourTvlManagerAddress");
    config.reserve_pools = vec![
        reserve_pool("0xYourDaiReservePoolAddress", mainnet::DAI, 18, 0),
        reserve_pool("0xYourUsdcReservePoolAddress", mainnet::USDC, 6, 1),
        reserve_pool("0xYourUsdtReservePoolAddress", mainnet::USDT, 6, 2),
    ];
    config.target_weights = vec![
        weight("convex-3pool", "0.20"),
        weight("convex-frax", "0.30"),
        weight("convex-susdv2", "0.50"),
    ];
    config
}

/// Print an example config JSON to stdout.
pub fn run() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&example_config())?;
    println!("{json}");
    Ok(())
}
