use {
    super::{
        ExitConcern,
        ExitExactBptInParams,
        ExitExactTokensOutParams,
        ExitPoolAttributes,
        JoinConcern,
        JoinParams,
        JoinPoolAttributes,
        RecoveryExitParams,
    },
    crate::{
        encoding::{
            ExitUserData,
            JoinUserData,
            UserDataLayout,
            encode_recovery_exit,
            vault::{self, VAULT},
        },
        error::{Capability, Error, InvalidInput},
        math::fixed_point::Bfp,
        model::{Pool, PoolToken, PoolType},
    },
    alloy_primitives::{Address, Bytes, U256},
};

/// The invariant specific part of joins and exits. Balances and amounts are
/// upscaled to 18 decimals including price rates and exclude the pool's own
/// BPT.
pub trait InvariantMath: Send + Sync {
    fn bpt_out_given_exact_tokens_in(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_in: &[Bfp],
    ) -> Result<Bfp, Error>;

    fn bpt_in_given_exact_tokens_out(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        amounts_out: &[Bfp],
    ) -> Result<Bfp, Error>;

    fn token_out_given_exact_bpt_in(
        &self,
        pool: &Pool,
        balances: &[Bfp],
        token_index: usize,
        bpt_in: Bfp,
    ) -> Result<Bfp, Error>;
}

/// Joins and exits for pools whose user data follows `layout` and whose
/// invariant is `math`.
#[derive(Clone, Copy, Debug)]
pub struct JoinExit<M> {
    pub math: M,
    pub layout: UserDataLayout,
}

impl<M: InvariantMath> JoinConcern for JoinExit<M> {
    fn build_join(&self, params: JoinParams<'_>) -> Result<JoinPoolAttributes, Error> {
        let pool = params.pool;
        let tokens = pool.tokens_without_bpt();
        let amounts_in = pool_order(
            &tokens,
            params.tokens_in,
            params.amounts_in,
            params.wrapped_native_asset,
        )?;

        let balances = scaled_balances(&tokens)?;
        let upscaled_amounts = upscale(&tokens, &amounts_in)?;
        let expected_bpt_out = self
            .math
            .bpt_out_given_exact_tokens_in(pool, &balances, &upscaled_amounts)?
            .as_uint256();
        let min_bpt_out = params.slippage.sub(expected_bpt_out)?;

        let user_data = self
            .layout
            .encode_join(&JoinUserData::ExactTokensInForBptOut {
                amounts_in: amounts_in.clone(),
                min_bpt_amount_out: min_bpt_out,
            })?;
        let uses_native_asset = params.tokens_in.contains(&Address::ZERO);
        let call = vault::join_pool(
            pool.id,
            params.joiner,
            params.joiner,
            assets(pool, uses_native_asset, params.wrapped_native_asset),
            with_bpt_slot(pool, &amounts_in),
            user_data,
        );
        let value = params
            .tokens_in
            .iter()
            .zip(params.amounts_in)
            .filter(|(token, _)| token.is_zero())
            .fold(U256::ZERO, |sum, (_, amount)| sum.saturating_add(*amount));

        Ok(JoinPoolAttributes {
            to: VAULT,
            function_name: "joinPool",
            data: vault::calldata(&call),
            call,
            value,
            expected_bpt_out,
            min_bpt_out,
        })
    }
}

impl<M: InvariantMath> ExitConcern for JoinExit<M> {
    fn build_exit_exact_bpt_in(
        &self,
        params: ExitExactBptInParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        let pool = params.pool;
        if params.bpt_in.is_zero() {
            return Err(InvalidInput::InputOutOfBounds.into());
        }
        let tokens = pool.tokens_without_bpt();
        let single_token = params
            .single_token_max_out
            .map(|token| {
                let index = position(&tokens, token, params.wrapped_native_asset)
                    .ok_or(InvalidInput::TokenMismatch(token))?;
                if token.is_zero() && !params.should_unwrap_native_asset {
                    return Err(InvalidInput::ConflictingNativeAssetUnwrap);
                }
                Ok(index)
            })
            .transpose()?;
        if single_token.is_none() {
            single_token_exits_only(pool)?;
        }

        let balances = scaled_balances(&tokens)?;
        let bpt_in = Bfp::from_wei(params.bpt_in);
        let (expected_amounts_out, user_data) = match single_token {
            Some(index) => {
                let amount_out = self
                    .math
                    .token_out_given_exact_bpt_in(pool, &balances, index, bpt_in)?;
                let mut amounts_out = vec![U256::ZERO; tokens.len()];
                amounts_out[index] = tokens[index].downscale_down(amount_out)?;
                let user_data = ExitUserData::ExactBptInForOneTokenOut {
                    bpt_amount_in: params.bpt_in,
                    exit_token_index: U256::from(index),
                };
                (amounts_out, user_data)
            }
            None => {
                let amounts_out = crate::math::weighted::calc_tokens_out_given_exact_bpt_in(
                    &balances,
                    bpt_in,
                    pool.total_shares,
                )?
                .into_iter()
                .zip(&tokens)
                .map(|(amount, token)| token.downscale_down(amount))
                .collect::<Result<Vec<_>, _>>()?;
                let user_data = ExitUserData::ExactBptInForTokensOut {
                    bpt_amount_in: params.bpt_in,
                };
                (amounts_out, user_data)
            }
        };
        let min_amounts_out = expected_amounts_out
            .iter()
            .map(|amount| params.slippage.sub(*amount))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exit_attributes(
            pool,
            params.exiter,
            assets(
                pool,
                params.should_unwrap_native_asset,
                params.wrapped_native_asset,
            ),
            self.layout.encode_exit(&user_data)?,
            with_bpt_slot(pool, &expected_amounts_out),
            with_bpt_slot(pool, &min_amounts_out),
            params.bpt_in,
            params.bpt_in,
        ))
    }

    fn build_exit_exact_tokens_out(
        &self,
        params: ExitExactTokensOutParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        let pool = params.pool;
        let tokens = pool.tokens_without_bpt();
        let amounts_out = pool_order(
            &tokens,
            params.tokens_out,
            params.amounts_out,
            params.wrapped_native_asset,
        )?;
        if amounts_out.iter().filter(|amount| !amount.is_zero()).count() > 1 {
            single_token_exits_only(pool)?;
        }

        let balances = scaled_balances(&tokens)?;
        let upscaled_amounts = upscale(&tokens, &amounts_out)?;
        let expected_bpt_in = self
            .math
            .bpt_in_given_exact_tokens_out(pool, &balances, &upscaled_amounts)?
            .as_uint256();
        let max_bpt_in = params.slippage.add(expected_bpt_in)?;

        let user_data = self
            .layout
            .encode_exit(&ExitUserData::BptInForExactTokensOut {
                amounts_out: amounts_out.clone(),
                max_bpt_amount_in: max_bpt_in,
            })?;
        let uses_native_asset = params.tokens_out.contains(&Address::ZERO);
        let amounts_out = with_bpt_slot(pool, &amounts_out);

        Ok(exit_attributes(
            pool,
            params.exiter,
            assets(pool, uses_native_asset, params.wrapped_native_asset),
            user_data,
            amounts_out.clone(),
            amounts_out,
            expected_bpt_in,
            max_bpt_in,
        ))
    }

    fn build_recovery_exit(
        &self,
        params: RecoveryExitParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        recovery_exit(params)
    }
}

/// The first composable stable pools can only exit to one token at a time.
fn single_token_exits_only(pool: &Pool) -> Result<(), InvalidInput> {
    match pool.pool_type {
        PoolType::ComposableStable | PoolType::HighAmpComposableStable
            if pool.pool_type_version < 2 =>
        {
            Err(InvalidInput::UnsupportedPoolTypeVersion {
                pool_type: pool.pool_type.to_string(),
                version: pool.pool_type_version,
            })
        }
        _ => Ok(()),
    }
}

/// Exit concern of pool types that only support the recovery exit.
#[derive(Clone, Copy, Debug)]
pub struct RecoveryOnly;

impl ExitConcern for RecoveryOnly {
    fn build_exit_exact_bpt_in(
        &self,
        params: ExitExactBptInParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        Err(Error::NotImplemented {
            pool_type: params.pool.pool_type.to_string(),
            capability: Capability::Exit,
        })
    }

    fn build_exit_exact_tokens_out(
        &self,
        params: ExitExactTokensOutParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        Err(Error::NotImplemented {
            pool_type: params.pool.pool_type.to_string(),
            capability: Capability::Exit,
        })
    }

    fn build_recovery_exit(
        &self,
        params: RecoveryExitParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        recovery_exit(params)
    }
}

/// Proportional exit using the recovery mode user data. Amounts out are
/// computed from the raw balances without price rates; the pool's own BPT
/// gets a zero amount.
pub fn recovery_exit(params: RecoveryExitParams<'_>) -> Result<ExitPoolAttributes, Error> {
    let pool = params.pool;
    if params.bpt_in.is_zero() {
        return Err(InvalidInput::InputOutOfBounds.into());
    }
    let bpt_ratio = Bfp::from_wei(params.bpt_in).div_down(pool.total_shares)?;
    let bpt_index = pool.bpt_index();
    let expected_amounts_out = pool
        .tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if Some(i) == bpt_index {
                return Ok(U256::ZERO);
            }
            let amount = token.balance.mul_down(bpt_ratio)?;
            Ok(amount.as_uint256() / token.decimals_scaling_factor())
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let min_amounts_out = expected_amounts_out
        .iter()
        .map(|amount| params.slippage.sub(*amount))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(exit_attributes(
        pool,
        params.exiter,
        assets(
            pool,
            params.should_unwrap_native_asset,
            params.wrapped_native_asset,
        ),
        encode_recovery_exit(params.bpt_in),
        expected_amounts_out,
        min_amounts_out,
        params.bpt_in,
        params.bpt_in,
    ))
}

#[allow(clippy::too_many_arguments)]
fn exit_attributes(
    pool: &Pool,
    exiter: Address,
    assets: Vec<Address>,
    user_data: Bytes,
    expected_amounts_out: Vec<U256>,
    min_amounts_out: Vec<U256>,
    expected_bpt_in: U256,
    max_bpt_in: U256,
) -> ExitPoolAttributes {
    let call = vault::exit_pool(
        pool.id,
        exiter,
        exiter,
        assets,
        min_amounts_out.clone(),
        user_data,
    );
    ExitPoolAttributes {
        to: VAULT,
        function_name: "exitPool",
        data: vault::calldata(&call),
        call,
        expected_amounts_out,
        min_amounts_out,
        expected_bpt_in,
        max_bpt_in,
    }
}

/// Index of `token` among `tokens`. The zero address stands for the wrapped
/// native asset.
pub(super) fn position(
    tokens: &[&PoolToken],
    token: Address,
    wrapped_native_asset: Address,
) -> Option<usize> {
    let token = if token.is_zero() {
        wrapped_native_asset
    } else {
        token
    };
    tokens.iter().position(|t| t.address == token)
}

/// Reorders caller supplied amounts into the order of `tokens`. Every token
/// has to be given exactly once.
fn pool_order(
    tokens: &[&PoolToken],
    addresses: &[Address],
    amounts: &[U256],
    wrapped_native_asset: Address,
) -> Result<Vec<U256>, InvalidInput> {
    if addresses.len() != amounts.len() || addresses.len() != tokens.len() {
        return Err(InvalidInput::InputLengthMismatch);
    }
    let mut ordered = vec![None; tokens.len()];
    for (token, amount) in addresses.iter().zip(amounts) {
        let index = position(tokens, *token, wrapped_native_asset)
            .ok_or(InvalidInput::TokenMismatch(*token))?;
        if ordered[index].replace(*amount).is_some() {
            return Err(InvalidInput::TokenMismatch(*token));
        }
    }
    Ok(ordered.into_iter().map(Option::unwrap_or_default).collect())
}

pub(super) fn scaled_balances(tokens: &[&PoolToken]) -> Result<Vec<Bfp>, Error> {
    tokens.iter().map(|token| token.scaled_balance()).collect()
}

pub(super) fn upscale(tokens: &[&PoolToken], amounts: &[U256]) -> Result<Vec<Bfp>, Error> {
    tokens
        .iter()
        .zip(amounts)
        .map(|(token, amount)| token.upscale(*amount))
        .collect()
}

/// The pool's tokens as Vault assets, with the wrapped native asset replaced
/// by the zero address when the native asset is used.
fn assets(pool: &Pool, use_native_asset: bool, wrapped_native_asset: Address) -> Vec<Address> {
    pool.tokens
        .iter()
        .map(|token| match token.address {
            address if use_native_asset && address == wrapped_native_asset => Address::ZERO,
            address => address,
        })
        .collect()
}

/// Expands amounts of the non BPT tokens to all pool tokens, with zero for
/// the pool's own BPT.
fn with_bpt_slot(pool: &Pool, amounts: &[U256]) -> Vec<U256> {
    let mut amounts = amounts.to_vec();
    if let Some(index) = pool.bpt_index() {
        amounts.insert(index, U256::ZERO);
    }
    amounts
}
