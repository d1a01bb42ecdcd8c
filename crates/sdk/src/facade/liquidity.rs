use {
    super::{MAX_NESTING, Pools},
    crate::Error,
    alloy_primitives::Address,
    bigdecimal::BigDecimal,
    data_providers::PoolAttribute,
    futures::{FutureExt, future::BoxFuture},
    num::Zero,
    pools::{Bfp, Pool, concerns::LiquidityToken, math, registry},
    tracing::instrument,
};

impl Pools {
    /// Total USD value of the pool's tokens.
    ///
    /// Tokens that are pools themselves are valued at their own liquidity per
    /// share, other tokens at the price of the token price provider.
    #[instrument(skip_all, fields(pool = %pool.id))]
    pub async fn liquidity(&self, pool: &Pool) -> Result<BigDecimal, Error> {
        self.liquidity_at_depth(pool, 0).await
    }

    /// USD value of one pool share.
    #[instrument(skip_all, fields(pool = %pool.id))]
    pub async fn bpt_price(&self, pool: &Pool) -> Result<BigDecimal, Error> {
        let liquidity = self.liquidity_at_depth(pool, 0).await?;
        per_share(&liquidity, pool).ok_or_else(|| math::Error::ZeroDivision.into())
    }

    pub(super) fn liquidity_at_depth<'a>(
        &'a self,
        pool: &'a Pool,
        depth: usize,
    ) -> BoxFuture<'a, Result<BigDecimal, Error>> {
        async move {
            let concern = registry::liquidity(&pool.pool_type)?;
            let mut tokens = Vec::with_capacity(pool.tokens.len());
            for token in pool.tokens.iter().filter(|token| token.address != pool.address) {
                tokens.push(LiquidityToken {
                    address: token.address,
                    balance: token.balance.to_big_decimal(),
                    price_rate: token.price_rate.to_big_decimal(),
                    weight: token.weight.map(Bfp::to_big_decimal),
                    price_usd: self.token_price_usd(token.address, depth).await?,
                });
            }
            let liquidity = concern.calc_total(&tokens)?;
            tracing::trace!(pool = %pool.id, %liquidity, depth, "computed liquidity");
            Ok(liquidity)
        }
        .boxed()
    }

    pub(super) async fn token_price_usd(
        &self,
        token: Address,
        depth: usize,
    ) -> Result<Option<BigDecimal>, Error> {
        if depth < MAX_NESTING {
            let sub_pool = self
                .repositories
                .pools
                .find_by(PoolAttribute::Address(token))
                .await?;
            if let Some(sub_pool) = sub_pool {
                let liquidity = self.liquidity_at_depth(&sub_pool, depth + 1).await?;
                return Ok(per_share(&liquidity, &sub_pool));
            }
        }
        let price = self.repositories.token_prices.find(token).await?;
        Ok(price.and_then(|price| price.usd))
    }
}

fn per_share(liquidity: &BigDecimal, pool: &Pool) -> Option<BigDecimal> {
    let shares = pool.total_shares.to_big_decimal();
    (!shares.is_zero()).then(|| liquidity / shares)
}
