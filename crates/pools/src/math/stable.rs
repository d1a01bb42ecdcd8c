//! Join and exit math of stable pools (`StableMath.sol`). Balances and
//! amounts are upscaled to 18 decimals. The amplification parameter carries
//! [`AMP_PRECISION`].

use {
    super::{BalU256, Error, fixed_point::Bfp, within_one},
    alloy_primitives::U256,
    num::{BigInt, Signed, Zero},
    number::u256_ext::U256Ext,
};

pub const AMP_PRECISION: u64 = 1000;

fn amp_precision() -> U256 {
    U256::from(AMP_PRECISION)
}

fn len(balances: &[Bfp]) -> U256 {
    U256::from(balances.len())
}

/// Computes the invariant `D` of
/// `A n^n S + D = A D n^n + D^(n+1) / (n^n P)` with Newton's method.
pub fn calculate_invariant(amplification_parameter: U256, balances: &[Bfp]) -> Result<U256, Error> {
    let mut sum = U256::ZERO;
    for balance in balances {
        sum = sum.badd(balance.as_uint256())?;
    }
    if sum.is_zero() {
        return Ok(U256::ZERO);
    }

    let num_tokens = len(balances);
    let amp_times_total = amplification_parameter.bmul(num_tokens)?;
    let mut invariant = sum;

    for _ in 0..255 {
        let mut d_p = invariant;
        for balance in balances {
            d_p = d_p
                .bmul(invariant)?
                .bdiv_down(balance.as_uint256().bmul(num_tokens)?)?;
        }

        let prev_invariant = invariant;
        let numerator = amp_times_total
            .bmul(sum)?
            .bdiv_down(amp_precision())?
            .badd(d_p.bmul(num_tokens)?)?
            .bmul(invariant)?;
        let denominator = amp_times_total
            .bsub(amp_precision())?
            .bmul(invariant)?
            .bdiv_down(amp_precision())?
            .badd(num_tokens.badd(U256::from(1))?.bmul(d_p)?)?;
        invariant = numerator.bdiv_down(denominator)?;

        if within_one(invariant, prev_invariant) {
            return Ok(invariant);
        }
    }

    Err(Error::StableInvariantDidntConverge)
}

/// Balance of `token_index` such that the pool has `invariant` given all
/// other balances.
pub fn get_token_balance_given_invariant_and_all_other_balances(
    amplification_parameter: U256,
    balances: &[Bfp],
    invariant: U256,
    token_index: usize,
) -> Result<U256, Error> {
    let num_tokens = len(balances);
    let amp_times_total = amplification_parameter.bmul(num_tokens)?;
    let balance = |i: usize| balances[i].as_uint256();

    let mut sum = balance(0);
    let mut p_d = balance(0).bmul(num_tokens)?;
    for j in 1..balances.len() {
        p_d = p_d
            .bmul(balance(j))?
            .bmul(num_tokens)?
            .bdiv_down(invariant)?;
        sum = sum.badd(balance(j))?;
    }
    let sum = sum.bsub(balance(token_index))?;

    let inv2 = invariant.bmul(invariant)?;
    let c = inv2
        .bdiv_up(amp_times_total.bmul(p_d)?)?
        .bmul(amp_precision())?
        .bmul(balance(token_index))?;
    let b = sum.badd(
        invariant
            .bdiv_down(amp_times_total)?
            .bmul(amp_precision())?,
    )?;

    let mut token_balance = inv2.badd(c)?.bdiv_up(invariant.badd(b)?)?;
    for _ in 0..255 {
        let prev_token_balance = token_balance;
        token_balance = token_balance
            .bmul(token_balance)?
            .badd(c)?
            .bdiv_up(
                token_balance
                    .bmul(U256::from(2))?
                    .badd(b)?
                    .bsub(invariant)?,
            )?;

        if within_one(token_balance, prev_token_balance) {
            return Ok(token_balance);
        }
    }

    Err(Error::StableGetBalanceDidntConverge)
}

fn sum_balances(balances: &[Bfp]) -> Result<Bfp, Error> {
    balances
        .iter()
        .try_fold(Bfp::zero(), |sum, balance| sum.add(*balance))
}

pub fn calc_bpt_out_given_exact_tokens_in(
    amplification_parameter: U256,
    balances: &[Bfp],
    amounts_in: &[Bfp],
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let sum = sum_balances(balances)?;

    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for (balance, amount_in) in balances.iter().zip(amounts_in) {
        let current_weight = balance.div_down(sum)?;
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(current_weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for (i, ratio_with_fee) in balance_ratios_with_fee.into_iter().enumerate() {
        let amount_in_without_fee = if ratio_with_fee > invariant_ratio_with_fees {
            let non_taxable_amount = if invariant_ratio_with_fees > Bfp::one() {
                balances[i].mul_down(invariant_ratio_with_fees.sub(Bfp::one())?)?
            } else {
                Bfp::zero()
            };
            let taxable_amount = amounts_in[i].sub(non_taxable_amount)?;
            non_taxable_amount.add(taxable_amount.mul_down(swap_fee.complement())?)?
        } else {
            amounts_in[i]
        };
        new_balances.push(balances[i].add(amount_in_without_fee)?);
    }

    let new_invariant = calculate_invariant(amplification_parameter, &new_balances)?;
    let invariant_ratio = Bfp::from_wei(new_invariant).div_down(Bfp::from_wei(current_invariant))?;
    if invariant_ratio > Bfp::one() {
        bpt_total_supply.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_bpt_in_given_exact_tokens_out(
    amplification_parameter: U256,
    balances: &[Bfp],
    amounts_out: &[Bfp],
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let sum = sum_balances(balances)?;

    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = Bfp::zero();
    for (balance, amount_out) in balances.iter().zip(amounts_out) {
        let current_weight = balance.div_up(sum)?;
        let ratio = balance.sub(*amount_out)?.div_up(*balance)?;
        invariant_ratio_without_fees =
            invariant_ratio_without_fees.add(ratio.mul_up(current_weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for (i, ratio_without_fee) in balance_ratios_without_fee.into_iter().enumerate() {
        let amount_out_with_fee = if invariant_ratio_without_fees > ratio_without_fee {
            let non_taxable_amount =
                balances[i].mul_down(invariant_ratio_without_fees.complement())?;
            let taxable_amount = amounts_out[i].sub(non_taxable_amount)?;
            non_taxable_amount.add(taxable_amount.div_up(swap_fee.complement())?)?
        } else {
            amounts_out[i]
        };
        new_balances.push(balances[i].sub(amount_out_with_fee)?);
    }

    let new_invariant = calculate_invariant(amplification_parameter, &new_balances)?;
    let invariant_ratio = Bfp::from_wei(new_invariant).div_down(Bfp::from_wei(current_invariant))?;
    bpt_total_supply.mul_up(invariant_ratio.complement())
}

#[allow(clippy::too_many_arguments)]
pub fn calc_token_out_given_exact_bpt_in(
    amplification_parameter: U256,
    balances: &[Bfp],
    token_index: usize,
    bpt_amount_in: Bfp,
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let new_invariant = bpt_total_supply
        .sub(bpt_amount_in)?
        .div_up(bpt_total_supply)?
        .mul_up(Bfp::from_wei(current_invariant))?;
    let new_balance = get_token_balance_given_invariant_and_all_other_balances(
        amplification_parameter,
        balances,
        new_invariant.as_uint256(),
        token_index,
    )?;
    let amount_out_without_fee = balances[token_index].sub(Bfp::from_wei(new_balance))?;

    let sum = sum_balances(balances)?;
    let current_weight = balances[token_index].div_down(sum)?;
    let taxable_amount = amount_out_without_fee.mul_up(current_weight.complement())?;
    let non_taxable_amount = amount_out_without_fee.sub(taxable_amount)?;
    non_taxable_amount.add(taxable_amount.mul_down(swap_fee.complement())?)
}

/// Marginal BPT minted per unit of `token_index` added to the pool, as an 18
/// decimals fixed point value.
pub fn bpt_spot_price(
    amplification_parameter: U256,
    balances: &[Bfp],
    bpt_supply: Bfp,
    token_index: usize,
) -> Result<Bfp, Error> {
    let invariant = calculate_invariant(amplification_parameter, balances)?.to_big_int();
    if invariant.is_zero() {
        return Err(Error::ZeroDivision);
    }
    let n = BigInt::from(balances.len());
    let precision = BigInt::from(AMP_PRECISION);

    let mut sum_others = BigInt::zero();
    let mut d_p = &invariant / &n;
    for (i, balance) in balances.iter().enumerate() {
        if i != token_index {
            let balance = balance.as_uint256().to_big_int();
            d_p = (&d_p * &invariant) / (&n * &balance);
            sum_others += balance;
        }
    }

    let x = balances[token_index].as_uint256().to_big_int();
    let alpha = amplification_parameter.to_big_int() * &n;
    let beta = &alpha * &sum_others;
    let gamma = &precision - &alpha;
    let partial_x = BigInt::from(2) * &alpha * &x + beta + &gamma * &invariant;
    let minus_partial_d: BigInt = d_p * (&n + 1) * &precision - &gamma * &x;
    if minus_partial_d.is_zero() {
        return Err(Error::ZeroDivision);
    }

    let ratio = (partial_x * bpt_supply.as_uint256().to_big_int()) / minus_partial_d;
    if ratio.is_negative() {
        return Err(Error::SubOverflow);
    }
    let ratio = U256::from_big_int(&ratio).map_err(|_| Error::MulOverflow)?;
    Bfp::from_wei(ratio).div_up(Bfp::from_wei(invariant_to_u256(&invariant)?))
}

fn invariant_to_u256(invariant: &BigInt) -> Result<U256, Error> {
    U256::from_big_int(invariant).map_err(|_| Error::MulOverflow)
}
