//! USD liquidity of a pool from its token balances and prices.

use {
    crate::error::{Error, InvalidInput},
    alloy_primitives::Address,
    bigdecimal::BigDecimal,
    num::Zero,
};

/// A pool token with its USD price, if known. The pool's own BPT must not be
/// included.
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityToken {
    pub address: Address,
    /// In token units.
    pub balance: BigDecimal,
    pub price_rate: BigDecimal,
    pub weight: Option<BigDecimal>,
    pub price_usd: Option<BigDecimal>,
}

pub trait LiquidityConcern: Send + Sync {
    fn calc_total(&self, tokens: &[LiquidityToken]) -> Result<BigDecimal, Error>;
}

/// Values the priced share of the pool and extrapolates it to the full pool
/// by weight. Zero if no token has a price.
#[derive(Clone, Copy, Debug)]
pub struct WeightedLiquidity;

impl LiquidityConcern for WeightedLiquidity {
    fn calc_total(&self, tokens: &[LiquidityToken]) -> Result<BigDecimal, Error> {
        let mut total_weight = BigDecimal::zero();
        let mut priced_weight = BigDecimal::zero();
        let mut priced_value = BigDecimal::zero();
        for token in tokens {
            let weight = token
                .weight
                .as_ref()
                .ok_or(InvalidInput::MissingWeight(token.address))?;
            total_weight += weight;
            if let Some(price) = &token.price_usd {
                priced_value += &token.balance * price;
                priced_weight += weight;
            }
        }

        if priced_weight.is_zero() {
            return Ok(BigDecimal::zero());
        }
        Ok(priced_value * total_weight / priced_weight)
    }
}

/// Values tokens without a price at the average price of the priced ones,
/// for pools whose tokens trade close to each other. Linear pools scale the
/// balances of unpriced tokens by their price rate first.
#[derive(Clone, Copy, Debug)]
pub struct AveragePriceLiquidity {
    pub apply_price_rate: bool,
}

impl LiquidityConcern for AveragePriceLiquidity {
    fn calc_total(&self, tokens: &[LiquidityToken]) -> Result<BigDecimal, Error> {
        let mut sum_balance = BigDecimal::zero();
        let mut sum_value = BigDecimal::zero();
        for token in tokens {
            if let Some(price) = &token.price_usd {
                sum_value += &token.balance * price;
                sum_balance += &token.balance;
            }
        }

        if sum_balance > BigDecimal::zero() {
            let average_price = &sum_value / &sum_balance;
            for token in tokens.iter().filter(|token| token.price_usd.is_none()) {
                let balance = if self.apply_price_rate {
                    &token.balance * &token.price_rate
                } else {
                    token.balance.clone()
                };
                sum_value += &balance * &average_price;
            }
        }
        Ok(sum_value)
    }
}
