//! Capabilities a pool type can implement. Every capability is its own trait
//! so that pool types can mix shared and specific implementations; the
//! [`crate::registry`] assembles them per pool type.

mod join_exit;
pub mod liquidity;
mod not_implemented;
pub mod stable;
pub mod weighted;

pub use {
    join_exit::{InvariantMath, JoinExit, RecoveryOnly, recovery_exit},
    liquidity::{AveragePriceLiquidity, LiquidityConcern, LiquidityToken, WeightedLiquidity},
    not_implemented::NotImplemented,
};
use {
    crate::{
        encoding::vault::{exitPoolCall, joinPoolCall},
        error::Error,
        math::{self, fixed_point::Bfp},
        model::Pool,
    },
    alloy_primitives::{Address, Bytes, U256},
    bigdecimal::BigDecimal,
};

/// Slippage tolerance in basis points.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Slippage(pub u32);

impl Slippage {
    const BPS: U256 = U256::from_limbs([10_000, 0, 0, 0]);

    fn delta(self, amount: U256) -> Result<U256, math::Error> {
        amount
            .checked_mul(U256::from(self.0))
            .map(|scaled| scaled / Self::BPS)
            .ok_or(math::Error::MulOverflow)
    }

    /// Lower bound for an amount received.
    pub fn sub(self, amount: U256) -> Result<U256, math::Error> {
        Ok(amount.saturating_sub(self.delta(amount)?))
    }

    /// Upper bound for an amount paid.
    pub fn add(self, amount: U256) -> Result<U256, math::Error> {
        amount
            .checked_add(self.delta(amount)?)
            .ok_or(math::Error::AddOverflow)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct JoinParams<'a> {
    pub joiner: Address,
    pub pool: &'a Pool,
    /// The zero address joins with the native asset instead of its wrapped
    /// version.
    pub tokens_in: &'a [Address],
    /// Raw amounts in the tokens' own decimals.
    pub amounts_in: &'a [U256],
    pub slippage: Slippage,
    pub wrapped_native_asset: Address,
}

#[derive(Clone, Copy, Debug)]
pub struct ExitExactBptInParams<'a> {
    pub exiter: Address,
    pub pool: &'a Pool,
    pub bpt_in: U256,
    pub slippage: Slippage,
    pub should_unwrap_native_asset: bool,
    pub wrapped_native_asset: Address,
    /// Exit to this token only instead of proportionally.
    pub single_token_max_out: Option<Address>,
}

#[derive(Clone, Copy, Debug)]
pub struct ExitExactTokensOutParams<'a> {
    pub exiter: Address,
    pub pool: &'a Pool,
    pub tokens_out: &'a [Address],
    pub amounts_out: &'a [U256],
    pub slippage: Slippage,
    pub wrapped_native_asset: Address,
}

#[derive(Clone, Copy, Debug)]
pub struct RecoveryExitParams<'a> {
    pub exiter: Address,
    pub pool: &'a Pool,
    pub bpt_in: U256,
    pub slippage: Slippage,
    pub should_unwrap_native_asset: bool,
    pub wrapped_native_asset: Address,
}

/// A `joinPool` transaction ready to be signed.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinPoolAttributes {
    pub to: Address,
    pub function_name: &'static str,
    pub call: joinPoolCall,
    pub data: Bytes,
    /// Native asset to send along.
    pub value: U256,
    pub expected_bpt_out: U256,
    pub min_bpt_out: U256,
}

/// An `exitPool` transaction ready to be signed.
#[derive(Clone, Debug, PartialEq)]
pub struct ExitPoolAttributes {
    pub to: Address,
    pub function_name: &'static str,
    pub call: exitPoolCall,
    pub data: Bytes,
    pub expected_amounts_out: Vec<U256>,
    pub min_amounts_out: Vec<U256>,
    pub expected_bpt_in: U256,
    pub max_bpt_in: U256,
}

pub trait JoinConcern: Send + Sync {
    fn build_join(&self, params: JoinParams<'_>) -> Result<JoinPoolAttributes, Error>;
}

pub trait ExitConcern: Send + Sync {
    fn build_exit_exact_bpt_in(
        &self,
        params: ExitExactBptInParams<'_>,
    ) -> Result<ExitPoolAttributes, Error>;

    fn build_exit_exact_tokens_out(
        &self,
        params: ExitExactTokensOutParams<'_>,
    ) -> Result<ExitPoolAttributes, Error>;

    /// Proportional exit that bypasses the pool's invariant math.
    ///
    /// The resulting transaction only succeeds while the pool is in recovery
    /// mode, which is not checked here.
    fn build_recovery_exit(
        &self,
        params: RecoveryExitParams<'_>,
    ) -> Result<ExitPoolAttributes, Error>;
}

pub trait SpotPriceConcern: Send + Sync {
    /// Units of `token_out` per unit of `token_in` at the margin.
    fn calc_pool_spot_price(
        &self,
        token_in: Address,
        token_out: Address,
        pool: &Pool,
    ) -> Result<BigDecimal, Error>;
}

pub trait PriceImpactConcern: Send + Sync {
    /// BPT that a join with `token_amounts` would mint if it had no price
    /// impact. Amounts are raw and exclude the pool's own BPT.
    fn bpt_zero_price_impact(&self, pool: &Pool, token_amounts: &[U256]) -> Result<Bfp, Error>;

    fn calc_price_impact(
        &self,
        pool: &Pool,
        token_amounts: &[U256],
        bpt_amount: U256,
        is_join: bool,
    ) -> Result<Bfp, Error> {
        let bpt_zero_price_impact = self.bpt_zero_price_impact(pool, token_amounts)?;
        let ratio = Bfp::from_wei(bpt_amount).div_down(bpt_zero_price_impact)?;
        let impact = match is_join {
            true if ratio < Bfp::one() => Bfp::one().sub(ratio)?,
            false if ratio > Bfp::one() => ratio.sub(Bfp::one())?,
            _ => Bfp::zero(),
        };
        Ok(impact)
    }
}
