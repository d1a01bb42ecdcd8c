//! Query and transact against Balancer V2 pools.
//!
//! [`Pools`] is the entry point: it finds pools in a
//! [`data_providers::PoolRepository`], aggregates their liquidity, fees and
//! APR from token prices and yields, and builds join and exit transactions
//! through the pool type's concerns.

pub mod config;
mod error;
pub mod facade;

pub use {
    config::Config,
    error::Error,
    facade::{AprBreakdown, ExitKind, Pools, Repositories, StakingApr, TokenAprs},
};
