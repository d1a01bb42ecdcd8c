//! Liquidity gauges in which pool shares are staked to earn BAL emissions and
//! reward tokens.

use {
    alloy_primitives::{Address, B256, U256},
    anyhow::Result,
    bigdecimal::BigDecimal,
    std::collections::HashMap,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiquidityGauge {
    pub address: Address,
    pub pool_id: B256,
    /// Pool shares staked in the gauge.
    pub total_supply: BigDecimal,
    /// Staked shares weighted by their holders' boosts.
    pub working_supply: BigDecimal,
    /// Share of the BAL emissions voted to the gauge.
    pub relative_weight: BigDecimal,
    pub reward_tokens: HashMap<Address, RewardData>,
}

/// A reward token streamed to the gauge's stakers.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardData {
    /// Token atoms distributed per second.
    pub rate: U256,
    /// Unix timestamp at which the current distribution ends.
    pub period_finish: i64,
    pub decimals: u8,
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait LiquidityGaugeProvider: Send + Sync {
    /// The gauge staking shares of the pool with `pool_id`.
    async fn find_by_pool(&self, pool_id: B256) -> Result<Option<LiquidityGauge>>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticLiquidityGauges(HashMap<B256, LiquidityGauge>);

impl StaticLiquidityGauges {
    pub fn new(gauges: impl IntoIterator<Item = LiquidityGauge>) -> Self {
        Self(
            gauges
                .into_iter()
                .map(|gauge| (gauge.pool_id, gauge))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl LiquidityGaugeProvider for StaticLiquidityGauges {
    async fn find_by_pool(&self, pool_id: B256) -> Result<Option<LiquidityGauge>> {
        Ok(self.0.get(&pool_id).cloned())
    }
}
