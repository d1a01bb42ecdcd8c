//! In-memory representation of a Balancer pool.

mod pool_type;
mod record;

pub use {
    pool_type::PoolType,
    record::{PoolRecord, TokenRecord},
};

use {
    crate::{
        error::{Error, InvalidInput},
        math::{fixed_point::Bfp, stable::AMP_PRECISION},
    },
    alloy_primitives::{Address, B256, U256},
    bigdecimal::BigDecimal,
    num::BigRational,
    number::u256_ext::U256Ext,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    pub id: B256,
    pub address: Address,
    pub pool_type: PoolType,
    pub pool_type_version: u32,
    pub swap_fee: Bfp,
    pub total_shares: Bfp,
    pub amp: Option<AmplificationParameter>,
    /// In the same order as registered in the Vault.
    pub tokens: Vec<PoolToken>,
    pub in_recovery_mode: bool,
    pub total_liquidity: BigDecimal,
    pub total_swap_volume: BigDecimal,
    pub total_swap_fee: BigDecimal,
    /// Share of token yields the protocol takes, when the subgraph knows it.
    pub protocol_yield_fee_cache: Option<Bfp>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoolToken {
    pub address: Address,
    pub decimals: u8,
    /// Balance in token units (not wei).
    pub balance: Bfp,
    pub weight: Option<Bfp>,
    pub price_rate: Bfp,
    pub symbol: Option<String>,
    pub is_exempt_from_yield_protocol_fee: bool,
}

impl PoolToken {
    /// `10^(18 - decimals)`, upscales token amounts to 18 decimals.
    pub fn decimals_scaling_factor(&self) -> U256 {
        U256::from(10).pow(U256::from(18 - self.decimals.min(18)))
    }

    /// Balance in the token's own decimals.
    pub fn raw_balance(&self) -> U256 {
        self.balance.as_uint256() / self.decimals_scaling_factor()
    }

    /// Upscales a raw token amount to 18 decimals including the price rate.
    pub fn upscale(&self, amount: U256) -> Result<Bfp, Error> {
        let upscaled = amount
            .checked_mul(self.decimals_scaling_factor())
            .ok_or(crate::math::Error::MulOverflow)?;
        Ok(Bfp::from_wei(upscaled).mul_down(self.price_rate)?)
    }

    /// Inverse of [`Self::upscale`], rounding down.
    pub fn downscale_down(&self, amount: Bfp) -> Result<U256, Error> {
        Ok(amount.div_down(self.price_rate)?.as_uint256() / self.decimals_scaling_factor())
    }

    /// Inverse of [`Self::upscale`], rounding up.
    pub fn downscale_up(&self, amount: Bfp) -> Result<U256, Error> {
        let unscaled = amount.div_up(self.price_rate)?.as_uint256();
        Ok(unscaled
            .checked_ceil_div(&self.decimals_scaling_factor())
            .unwrap_or_default())
    }

    /// Balance upscaled to 18 decimals and multiplied by the price rate, as
    /// used by the invariant math of rate aware pools.
    pub fn scaled_balance(&self) -> Result<Bfp, Error> {
        Ok(self.balance.mul_down(self.price_rate)?)
    }
}

/// Amplification of a stable pool, `factor / precision`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AmplificationParameter {
    factor: U256,
    precision: U256,
}

impl AmplificationParameter {
    pub fn try_new(factor: U256, precision: U256) -> Result<Self, InvalidInput> {
        if precision.is_zero() {
            return Err(InvalidInput::MissingAmp);
        }
        Ok(Self { factor, precision })
    }

    /// The value the stable math works with, which carries [`AMP_PRECISION`].
    pub fn with_amp_precision(&self) -> U256 {
        self.factor * U256::from(AMP_PRECISION) / self.precision
    }

    pub fn as_big_rational(&self) -> BigRational {
        BigRational::new(self.factor.to_big_int(), self.precision.to_big_int())
    }
}

impl Pool {
    pub fn token_index(&self, token: Address) -> Option<usize> {
        self.tokens.iter().position(|t| t.address == token)
    }

    pub fn token(&self, token: Address) -> Result<&PoolToken, Error> {
        self.tokens
            .iter()
            .find(|t| t.address == token)
            .ok_or_else(|| InvalidInput::TokenMismatch(token).into())
    }

    /// Index of the pool's own BPT among its tokens, only present for pools
    /// with pre-minted BPT.
    pub fn bpt_index(&self) -> Option<usize> {
        if !self.pool_type.has_phantom_bpt() {
            return None;
        }
        self.token_index(self.address)
    }

    /// The tokens the pool math operates on, that is all tokens except the
    /// pool's own BPT.
    pub fn tokens_without_bpt(&self) -> Vec<&PoolToken> {
        let bpt_index = self.bpt_index();
        self.tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != bpt_index)
            .map(|(_, token)| token)
            .collect()
    }

    pub fn token_addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|token| token.address).collect()
    }

    pub fn amplification(&self) -> Result<U256, InvalidInput> {
        self.amp
            .as_ref()
            .map(AmplificationParameter::with_amp_precision)
            .ok_or(InvalidInput::MissingAmp)
    }

    /// Weights of all pool tokens, failing if any is missing.
    pub fn weights(&self) -> Result<Vec<Bfp>, InvalidInput> {
        self.tokens
            .iter()
            .map(|token| token.weight.ok_or(InvalidInput::MissingWeight(token.address)))
            .collect()
    }
}
