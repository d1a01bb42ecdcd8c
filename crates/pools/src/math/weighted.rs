//! Join and exit math of weighted pools (`WeightedMath.sol`). Balances and
//! amounts are upscaled to 18 decimals, weights are normalized.

use super::{Error, fixed_point::Bfp};

pub fn calc_bpt_out_given_exact_tokens_in(
    balances: &[Bfp],
    normalized_weights: &[Bfp],
    amounts_in: &[Bfp],
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for ((balance, weight), amount_in) in balances.iter().zip(normalized_weights).zip(amounts_in) {
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(*weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for (i, ratio_with_fee) in balance_ratios_with_fee.into_iter().enumerate() {
        let amount_in_without_fee = if ratio_with_fee > invariant_ratio_with_fees {
            // Only the part of the amount exceeding a proportional join pays
            // swap fees.
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

        let balance_ratio = balances[i].add(amount_in_without_fee)?.div_down(balances[i])?;
        invariant_ratio =
            invariant_ratio.mul_down(balance_ratio.pow_down(normalized_weights[i])?)?;
    }

    if invariant_ratio > Bfp::one() {
        bpt_total_supply.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_bpt_in_given_exact_tokens_out(
    balances: &[Bfp],
    normalized_weights: &[Bfp],
    amounts_out: &[Bfp],
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = Bfp::zero();
    for ((balance, weight), amount_out) in
        balances.iter().zip(normalized_weights).zip(amounts_out)
    {
        let ratio = balance.sub(*amount_out)?.div_up(*balance)?;
        invariant_ratio_without_fees =
            invariant_ratio_without_fees.add(ratio.mul_up(*weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for (i, ratio_without_fee) in balance_ratios_without_fee.into_iter().enumerate() {
        let amount_out_with_fee = if invariant_ratio_without_fees > ratio_without_fee {
            let non_taxable_amount =
                balances[i].mul_down(invariant_ratio_without_fees.complement())?;
            let taxable_amount = amounts_out[i].sub(non_taxable_amount)?;
            non_taxable_amount.add(taxable_amount.div_up(swap_fee.complement())?)?
        } else {
            amounts_out[i]
        };

        let balance_ratio = balances[i].sub(amount_out_with_fee)?.div_down(balances[i])?;
        invariant_ratio =
            invariant_ratio.mul_down(balance_ratio.pow_down(normalized_weights[i])?)?;
    }

    bpt_total_supply.mul_up(invariant_ratio.complement())
}

pub fn calc_token_out_given_exact_bpt_in(
    balance: Bfp,
    normalized_weight: Bfp,
    bpt_amount_in: Bfp,
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let invariant_ratio = bpt_total_supply
        .sub(bpt_amount_in)?
        .div_up(bpt_total_supply)?;
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_down(normalized_weight)?)?;
    let amount_out_without_fee = balance.mul_down(balance_ratio.complement())?;

    // The share of the token out that exceeds its weight pays swap fees.
    let taxable_amount = amount_out_without_fee.mul_up(normalized_weight.complement())?;
    let non_taxable_amount = amount_out_without_fee.sub(taxable_amount)?;
    non_taxable_amount.add(taxable_amount.mul_down(swap_fee.complement())?)
}

/// Proportional exit, no fees involved.
pub fn calc_tokens_out_given_exact_bpt_in(
    balances: &[Bfp],
    bpt_amount_in: Bfp,
    bpt_total_supply: Bfp,
) -> Result<Vec<Bfp>, Error> {
    let bpt_ratio = bpt_amount_in.div_down(bpt_total_supply)?;
    balances
        .iter()
        .map(|balance| balance.mul_down(bpt_ratio))
        .collect()
}
