//! Stable, meta stable, stable phantom and composable stable pools. The math
//! works on the tokens without the pool's own BPT, with balances scaled by
//! their price rates.

use {
    super::{
        InvariantMath,
        PriceImpactConcern,
        SpotPriceConcern,
        join_exit::{position, scaled_balances, upscale},
    },
    crate::{
        error::{Error, InvalidInput},
        math::{self, fixed_point::Bfp, stable},
        model::Pool,
    },
    alloy_primitives::{Address, U256},
    bigdecimal::BigDecimal,
    num::{BigRational, Zero},
    number::{conversions::big_rational_to_big_decimal, u256_ext::U256Ext},
};

#[derive(Clone, Copy, Debug)]
pub struct StableMath;

impl InvariantMath for StableMath {
    fn bpt_out_given_exact_tokens_in(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_in: &[Bfp],
    ) -> Result<Bfp, Error> {
        let amp = pool.amplification()?;
        let invariant = stable::calculate_invariant(amp, balances)?;
        Ok(stable::calc_bpt_out_given_exact_tokens_in(
            amp,
            balances,
            amounts_in,
            pool.total_shares,
            invariant,
            pool.swap_fee,
        )?)
    }

    fn bpt_in_given_exact_tokens_out(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_out: &[Bfp],
    ) -> Result<Bfp, Error> {
        let amp = pool.amplification()?;
        let invariant = stable::calculate_invariant(amp, balances)?;
        Ok(stable::calc_bpt_in_given_exact_tokens_out(
            amp,
            balances,
            amounts_out,
            pool.total_shares,
            invariant,
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
        let amp = pool.amplification()?;
        let invariant = stable::calculate_invariant(amp, balances)?;
        Ok(stable::calc_token_out_given_exact_bpt_in(
            amp,
            balances,
            token_index,
            bpt_in,
            pool.total_shares,
            invariant,
            pool.swap_fee,
        )?)
    }
}

/// Ratio of the partial derivatives of the stable invariant,
/// `(A n^n + k / x_in) / (A n^n + k / x_out)` with `k = D^(n+1) / (n^n P)`,
/// converted with the tokens' price rates.
#[derive(Clone, Copy, Debug)]
pub struct StableSpotPrice;

impl SpotPriceConcern for StableSpotPrice {
    fn calc_pool_spot_price(
        &self,
        token_in: Address,
        token_out: Address,
        pool: &Pool,
    ) -> Result<BigDecimal, Error> {
        let tokens = pool.tokens_without_bpt();
        let index_in = position(&tokens, token_in, Address::ZERO)
            .ok_or(InvalidInput::TokenMismatch(token_in))?;
        let index_out = position(&tokens, token_out, Address::ZERO)
            .ok_or(InvalidInput::TokenMismatch(token_out))?;

        let balances = scaled_balances(&tokens)?;
        if balances.iter().any(Bfp::is_zero) {
            return Err(math::Error::ZeroDivision.into());
        }
        let amp = pool.amplification()?;
        let invariant = stable::calculate_invariant(amp, &balances)?.to_big_rational();

        let n = balances.len();
        let n_rational = BigRational::from_integer(n.into());
        let balances = balances
            .iter()
            .map(|balance| balance.as_uint256().to_big_rational())
            .collect::<Vec<_>>();
        let product = balances
            .iter()
            .fold(BigRational::from_integer(1.into()), |product, balance| {
                product * balance
            });
        let k = num::pow(invariant, n + 1) / (num::pow(n_rational.clone(), n) * product);
        let amp_times_n = amp.to_big_rational()
            / BigRational::from_integer(stable::AMP_PRECISION.into())
            * n_rational;

        let partial_in = &amp_times_n + &k / &balances[index_in];
        let partial_out = &amp_times_n + &k / &balances[index_out];
        let price = partial_in / partial_out * tokens[index_in].price_rate.to_big_rational()
            / tokens[index_out].price_rate.to_big_rational();
        if price.is_zero() {
            return Err(math::Error::ZeroDivision.into());
        }
        Ok(big_rational_to_big_decimal(&price))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StablePriceImpact;

impl PriceImpactConcern for StablePriceImpact {
    fn bpt_zero_price_impact(&self, pool: &Pool, token_amounts: &[U256]) -> Result<Bfp, Error> {
        let tokens = pool.tokens_without_bpt();
        if token_amounts.len() != tokens.len() {
            return Err(InvalidInput::InputLengthMismatch.into());
        }
        let amp = pool.amplification()?;
        let balances = scaled_balances(&tokens)?;
        let amounts = upscale(&tokens, token_amounts)?;

        let mut bpt_zero_price_impact = Bfp::zero();
        for (i, amount) in amounts.into_iter().enumerate() {
            let price = stable::bpt_spot_price(amp, &balances, pool.total_shares, i)?;
            bpt_zero_price_impact = bpt_zero_price_impact.add(amount.mul_down(price)?)?;
        }
        Ok(bpt_zero_price_impact)
    }
}
