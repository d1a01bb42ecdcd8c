use {
    super::{
        ExitConcern,
        ExitExactBptInParams,
        ExitExactTokensOutParams,
        ExitPoolAttributes,
        JoinConcern,
        JoinParams,
        JoinPoolAttributes,
        PriceImpactConcern,
        RecoveryExitParams,
        SpotPriceConcern,
    },
    crate::{
        error::{Capability, Error},
        math::fixed_point::Bfp,
        model::Pool,
    },
    alloy_primitives::{Address, U256},
    bigdecimal::BigDecimal,
};

/// Stands in for capabilities a registered pool type does not support.
#[derive(Clone, Copy, Debug)]
pub struct NotImplemented;

fn not_implemented<T>(pool: &Pool, capability: Capability) -> Result<T, Error> {
    Err(Error::NotImplemented {
        pool_type: pool.pool_type.to_string(),
        capability,
    })
}

impl JoinConcern for NotImplemented {
    fn build_join(&self, params: JoinParams<'_>) -> Result<JoinPoolAttributes, Error> {
        not_implemented(params.pool, Capability::Join)
    }
}

impl ExitConcern for NotImplemented {
    fn build_exit_exact_bpt_in(
        &self,
        params: ExitExactBptInParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        not_implemented(params.pool, Capability::Exit)
    }

    fn build_exit_exact_tokens_out(
        &self,
        params: ExitExactTokensOutParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        not_implemented(params.pool, Capability::Exit)
    }

    fn build_recovery_exit(
        &self,
        params: RecoveryExitParams<'_>,
    ) -> Result<ExitPoolAttributes, Error> {
        not_implemented(params.pool, Capability::Exit)
    }
}

impl SpotPriceConcern for NotImplemented {
    fn calc_pool_spot_price(
        &self,
        _: Address,
        _: Address,
        pool: &Pool,
    ) -> Result<BigDecimal, Error> {
        not_implemented(pool, Capability::SpotPrice)
    }
}

impl PriceImpactConcern for NotImplemented {
    fn bpt_zero_price_impact(&self, pool: &Pool, _: &[U256]) -> Result<Bfp, Error> {
        not_implemented(pool, Capability::PriceImpact)
    }
}
