//! Collaborators supplying the data the SDK facade computes on: pools from a
//! repository, token prices, token yields and liquidity gauges.

#[macro_use]
mod macros;

pub mod liquidity_gauges;
pub mod repository;
pub mod subgraph;
pub mod token_prices;
pub mod token_yields;

pub use {
    liquidity_gauges::{LiquidityGauge, LiquidityGaugeProvider, RewardData, StaticLiquidityGauges},
    repository::{PoolAttribute, PoolRepository, StaticPoolRepository, SubgraphPoolRepository},
    subgraph::SubgraphClient,
    token_prices::{StaticTokenPrices, TokenPrice, TokenPriceProvider},
    token_yields::{StaticTokenYields, TokenYieldProvider},
};
