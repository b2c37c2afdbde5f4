use alloy::primitives::I256;

use crate::chain::ChainReader;
use crate::engine::allocator::{largest_position_delta, position_deltas, target_values};
use crate::engine::error::Result;
use crate::engine::valuation::nav;
use crate::engine::Strategy;
use crate::model::amount::{USD_DECIMALS, format_amount};
use crate::model::config::Config;
use crate::model::position::{Position, PositionDelta, TargetValues, lookup_or_zero};
use crate::price::PriceSource;

/// Read-only snapshot of the portfolio against its targets.
#[derive(Debug)]
pub struct PositionsReport {
    pub positions: Vec<Position>,
    pub nav: I256,
    pub targets: TargetValues,
    pub deltas: Vec<PositionDelta>,
}

/// One line of the report, USD at `USD_DECIMALS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub value: I256,
    pub target: I256,
    pub delta: I256,
}

impl PositionsReport {
    pub fn next_position_name(&self) -> Option<&str> {
        largest_position_delta(&self.deltas).ok().map(|d| d.name.as_str())
    }

    /// One row per delta. A name with no position has value zero; a name
    /// with no target weight has target zero.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.deltas
            .iter()
            .map(|delta| ReportRow {
                name: delta.name.clone(),
                value: lookup_or_zero(
                    self.positions.iter().map(|p| (p.name.as_str(), p.value)),
                    &delta.name,
                ),
                target: lookup_or_zero(self.targets.iter(), &delta.name),
                delta: delta.delta,
            })
            .collect()
    }

    pub fn print(&self) {
        println!("NAV: ${}", usd(self.nav));
        println!();
        println!("{:<32} {:>18} {:>18} {:>18}", "POSITION", "VALUE", "TARGET", "DELTA");
        for row in self.rows() {
            println!(
                "{:<32} {:>18} {:>18} {:>18}",
                row.name,
                usd(row.value),
                usd(row.target),
                usd(row.delta)
            );
        }
        if let Some(next) = self.next_position_name() {
            println!();
            println!("Next position to add liquidity: {next}");
        }
    }
}

fn usd(value: I256) -> String {
    format_amount(value, USD_DECIMALS)
}

pub async fn run(chain: &dyn ChainReader, prices: &dyn PriceSource, config: &Config) -> Result<PositionsReport> {
    let names = chain.zap_names(config.lp_account).await?;
    let positions = Strategy::new(chain, prices, config)
        .tvl_manager()
        .index_positions(&names)
        .await?;

    let nav = nav(&positions)?;
    let targets = target_values(&positions, &config.target_weights)?;
    let deltas = position_deltas(&positions, &targets);

    Ok(PositionsReport {
        positions,
        nav,
        targets,
        deltas,
    })
}
