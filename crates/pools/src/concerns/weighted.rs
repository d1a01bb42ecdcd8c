//! Weighted, investment and liquidity bootstrapping pools.

use {
    super::{
        InvariantMath,
        PriceImpactConcern,
        SpotPriceConcern,
        join_exit::{scaled_balances, upscale},
    },
    crate::{
        error::{Error, InvalidInput},
        math::{self, fixed_point::Bfp, weighted},
        model::{Pool, PoolToken},
    },
    alloy_primitives::{Address, U256},
    bigdecimal::BigDecimal,
    num::BigRational,
    number::conversions::big_rational_to_big_decimal,
};

fn weight(token: &PoolToken) -> Result<Bfp, InvalidInput> {
    token.weight.ok_or(InvalidInput::MissingWeight(token.address))
}

fn weights(pool: &Pool) -> Result<Vec<Bfp>, InvalidInput> {
    pool.tokens_without_bpt().into_iter().map(weight).collect()
}

#[derive(Clone, Copy, Debug)]
pub struct WeightedMath;

impl InvariantMath for WeightedMath {
    fn bpt_out_given_exact_tokens_in(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_in: &[Bfp],
    ) -> Result<Bfp, Error> {
        Ok(weighted::calc_bpt_out_given_exact_tokens_in(
            balances,
            &weights(pool)?,
            amounts_in,
            pool.total_shares,
            pool.swap_fee,
        )?)
    }

    fn bpt_in_given_exact_tokens_out(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_out: &[Bfp],
    ) -> Result<Bfp, Error> {
        Ok(weighted::calc_bpt_in_given_exact_tokens_out(
            balances,
            &weights(pool)?,
            amounts_out,
            pool.total_shares,
            pool.swap_fee,
        )?)
    }

    fn token_out_given_exact_bpt_in(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        token_index: usize,
        bpt_in: Bfp,
    ) -> Result<Bfp, Error> {
        let weights = weights(pool)?;
        Ok(weighted::calc_token_out_given_exact_bpt_in(
            balances[token_index],
            weights[token_index],
            bpt_in,
            pool.total_shares,
            pool.swap_fee,
        )?)
    }
}

/// `(B_out / w_out) / (B_in / w_in)`, computed exactly.
#[derive(Clone, Copy, Debug)]
pub struct WeightedSpotPrice;

impl SpotPriceConcern for WeightedSpotPrice {
    fn calc_pool_spot_price(
        &self,
        token_in: Address,
        token_out: Address,
        pool: &Pool,
    ) -> Result<BigDecimal, Error> {
        let token_in = pool.token(token_in)?;
        let token_out = pool.token(token_out)?;
        let balance_over_weight = |token: &PoolToken| -> Result<BigRational, Error> {
            let weight = weight(token)?;
            if weight.is_zero() || token.balance.is_zero() {
                return Err(math::Error::ZeroDivision.into());
            }
            Ok(token.scaled_balance()?.to_big_rational() / weight.to_big_rational())
        };

        let price = balance_over_weight(token_out)? / balance_over_weight(token_in)?;
        Ok(big_rational_to_big_decimal(&price))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WeightedPriceImpact;

impl PriceImpactConcern for WeightedPriceImpact {
    fn bpt_zero_price_impact(&self, pool: &Pool, token_amounts: &[U256]) -> Result<Bfp, Error> {
        let tokens = pool.tokens_without_bpt();
        if token_amounts.len() != tokens.len() {
            return Err(InvalidInput::InputLengthMismatch.into());
        }
        let balances = scaled_balances(&tokens)?;
        let amounts = upscale(&tokens, token_amounts)?;

        let mut bpt_zero_price_impact = Bfp::zero();
        for ((token, balance), amount) in tokens.iter().zip(balances).zip(amounts) {
            // BPT price of the token at the current balances.
            let price = weight(token)?
                .mul_down(pool.total_shares)?
                .div_down(balance)?;
            bpt_zero_price_impact = bpt_zero_price_impact.add(amount.mul_down(price)?)?;
        }
        Ok(bpt_zero_price_impact)
    }
}
