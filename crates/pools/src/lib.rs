//! Pool-type strategy layer for Balancer V2 pools.
//!
//! A [`model::Pool`] built from an indexer record is dispatched through the
//! [`registry`] to the [`concerns`] implementing its AMM: building join and
//! exit transactions, spot prices, price impact and liquidity.

#[macro_use]
pub mod macros;

pub mod concerns;
pub mod encoding;
pub mod error;
pub mod math;
pub mod model;
pub mod registry;

pub use {
    error::{Capability, Error, InvalidInput},
    math::fixed_point::Bfp,
    model::{Pool, PoolToken, PoolType},
    registry::{ConcernSet, concerns_for},
};
