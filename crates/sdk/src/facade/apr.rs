mod emissions;

use {
    super::{MAX_NESTING, Pools},
    crate::Error,
    alloy_primitives::{Address, U256},
    anyhow::anyhow,
    bigdecimal::{BigDecimal, RoundingMode},
    data_providers::{LiquidityGauge, PoolAttribute, RewardData},
    futures::{FutureExt, future::BoxFuture},
    num::{FromPrimitive, One, ToPrimitive, Zero},
    number::{conversions::u256_to_big_decimal, fixed::scale},
    pools::{Bfp, Pool, PoolToken, PoolType},
    std::collections::HashMap,
    tracing::instrument,
};

const SECONDS_PER_YEAR: i64 = 365 * 86_400;

/// Annual percentage rate of a pool, in basis points.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AprBreakdown {
    /// Swap fees of the last 24 hours, annualized.
    pub swap_fees: u64,
    pub token_aprs: TokenAprs,
    /// BAL emissions earned by staking the pool's shares in its gauge.
    pub staking_apr: StakingApr,
    /// Tokens other than BAL the gauge streams to stakers.
    pub reward_aprs: TokenAprs,
    /// Total for a staker without boost.
    pub min: u64,
    /// Total for a staker with the maximum boost.
    pub max: u64,
}

/// Yield earned through the pool's tokens, weighted by their share of the
/// pool.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenAprs {
    pub total: u64,
    pub breakdown: HashMap<Address, u64>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StakingApr {
    pub min: u64,
    pub max: u64,
}

impl Pools {
    #[instrument(skip_all, fields(pool = %pool.id))]
    pub async fn apr(&self, pool: &Pool) -> Result<AprBreakdown, Error> {
        self.apr_at(pool, number::timestamp::now().timestamp()).await
    }

    async fn apr_at(&self, pool: &Pool, now: i64) -> Result<AprBreakdown, Error> {
        let gauge = match &self.repositories.liquidity_gauges {
            Some(gauges) => gauges.find_by_pool(pool.id).await?,
            None => None,
        };
        let (swap_fees, token_aprs, staking_apr, reward_aprs) = futures::try_join!(
            self.swap_fee_apr(pool),
            self.token_aprs(pool, 0),
            self.staking_apr(pool, gauge.as_ref(), now),
            self.reward_aprs(pool, gauge.as_ref(), now),
        )?;
        let unstaked = swap_fees + token_aprs.total + reward_aprs.total;
        tracing::debug!(
            swap_fees,
            token_aprs = token_aprs.total,
            staking = ?staking_apr,
            rewards = reward_aprs.total,
            "computed APR"
        );
        Ok(AprBreakdown {
            swap_fees,
            token_aprs,
            staking_apr,
            reward_aprs,
            min: unstaked + staking_apr.min,
            max: unstaked + staking_apr.max,
        })
    }

    /// Last 24 hours of swap fees net of the protocol's share, annualized
    /// over the pool's liquidity.
    pub async fn swap_fee_apr(&self, pool: &Pool) -> Result<u64, Error> {
        let (fees, liquidity) = futures::try_join!(self.fees(pool), self.liquidity(pool))?;
        if fees.is_zero() || liquidity.is_zero() {
            return Ok(0);
        }
        let net_fees = fees * self.fee_complement();
        Ok(to_bps(net_fees * BigDecimal::from(365 * 10_000) / liquidity))
    }

    fn token_aprs<'a>(
        &'a self,
        pool: &'a Pool,
        depth: usize,
    ) -> BoxFuture<'a, Result<TokenAprs, Error>> {
        async move {
            let mut liquidity = None;
            let mut breakdown = HashMap::new();
            for token in pool.tokens.iter().filter(|token| token.address != pool.address) {
                let apr = match self.token_apr(pool, token, depth).await? {
                    Some(apr) if !apr.is_zero() => apr,
                    _ => continue,
                };
                let weight = match token.weight {
                    Some(weight) => weight.to_big_decimal(),
                    None => {
                        let price = self
                            .token_price_usd(token.address, depth)
                            .await?
                            .ok_or_else(|| anyhow!("no USD price for token {}", token.address))?;
                        let liquidity = match liquidity.clone() {
                            Some(liquidity) => liquidity,
                            None => liquidity
                                .insert(self.liquidity_at_depth(pool, depth).await?)
                                .clone(),
                        };
                        if liquidity.is_zero() {
                            continue;
                        }
                        token.balance.to_big_decimal() * price / liquidity
                    }
                };
                let weighted = to_bps(apr * weight);
                if weighted > 0 {
                    breakdown.insert(token.address, weighted);
                }
            }
            Ok(TokenAprs {
                total: breakdown.values().sum(),
                breakdown,
            })
        }
        .boxed()
    }

    /// APR of a token held by `pool`, from its yield or, for pool tokens,
    /// from the APR of that pool.
    async fn token_apr(
        &self,
        pool: &Pool,
        token: &PoolToken,
        depth: usize,
    ) -> Result<Option<BigDecimal>, Error> {
        let pays_yield_fee = charges_yield_fee(pool) && !token.is_exempt_from_yield_protocol_fee;
        if let Some(token_yield) = self.repositories.token_yields.find(token.address).await? {
            let token_yield = BigDecimal::from(token_yield);
            let apr = match pool.pool_type {
                PoolType::MetaStable => token_yield * self.fee_complement(),
                _ if pays_yield_fee => token_yield * yield_fee_complement(pool),
                _ => token_yield,
            };
            return Ok(Some(apr));
        }
        if depth >= MAX_NESTING {
            return Ok(None);
        }

        let sub_pool = self
            .repositories
            .pools
            .find_by(PoolAttribute::Address(token.address))
            .await?;
        let Some(sub_pool) = sub_pool else {
            return Ok(None);
        };
        let swap_fees = self.swap_fee_apr(&sub_pool).await?;
        let token_aprs = BigDecimal::from(self.token_aprs(&sub_pool, depth + 1).await?.total);
        let token_aprs = match pays_yield_fee {
            true => token_aprs * yield_fee_complement(pool),
            false => token_aprs,
        };
        Ok(Some(BigDecimal::from(swap_fees) + token_aprs))
    }

    /// BAL emitted to the pool's gauge over the next year, relative to the
    /// value of the staked shares.
    async fn staking_apr(
        &self,
        pool: &Pool,
        gauge: Option<&LiquidityGauge>,
        now: i64,
    ) -> Result<StakingApr, Error> {
        let (Some(gauge), Some(bal)) = (gauge, self.bal_token) else {
            return Ok(StakingApr::default());
        };

        // Child chain gauges stream BAL like any other reward token.
        if let Some(reward) = gauge.reward_tokens.get(&bal) {
            if gauge.total_supply.is_zero() {
                return Ok(StakingApr::default());
            }
            let supply_usd = &gauge.total_supply * self.bpt_price(pool).await?;
            if supply_usd.is_zero() {
                return Ok(StakingApr::default());
            }
            let apr = to_bps(
                self.yearly_reward_usd(bal, reward, now).await? * BigDecimal::from(10_000)
                    / supply_usd,
            );
            return Ok(StakingApr { min: apr, max: apr });
        }

        if gauge.working_supply.is_zero() {
            return Ok(StakingApr::default());
        }
        let bal_price = self
            .repositories
            .token_prices
            .find(bal)
            .await?
            .and_then(|price| price.usd)
            .ok_or_else(|| anyhow!("missing BAL price"))?;
        let emissions = emissions::between(now, now + SECONDS_PER_YEAR)?;
        let emissions_usd = BigDecimal::from_f64(emissions).unwrap_or_default()
            * &gauge.relative_weight
            * bal_price;
        // Unboosted stakers accrue emissions on 40% of their shares, a 2.5x
        // boost makes all of them count.
        let unboosted = BigDecimal::new(4.into(), 1);
        let gauge_supply = (&gauge.working_supply + &unboosted) / &unboosted;
        let supply_usd = gauge_supply * self.bpt_price(pool).await?;
        if supply_usd.is_zero() {
            return Ok(StakingApr::default());
        }
        let apr = emissions_usd * BigDecimal::from(10_000) / supply_usd;
        Ok(StakingApr {
            min: to_bps(apr.clone()),
            max: to_bps(apr * BigDecimal::new(25.into(), 1)),
        })
    }

    /// Rewards other than BAL streamed to the pool's gauge, relative to the
    /// value of the staked shares.
    async fn reward_aprs(
        &self,
        pool: &Pool,
        gauge: Option<&LiquidityGauge>,
        now: i64,
    ) -> Result<TokenAprs, Error> {
        let Some(gauge) = gauge else {
            return Ok(TokenAprs::default());
        };
        let rewards = gauge
            .reward_tokens
            .iter()
            .filter(|(token, _)| Some(**token) != self.bal_token)
            .collect::<Vec<_>>();
        if rewards.is_empty() || gauge.total_supply.is_zero() {
            return Ok(TokenAprs::default());
        }

        let supply_usd = &gauge.total_supply * self.bpt_price(pool).await?;
        if supply_usd.is_zero() {
            return Ok(TokenAprs::default());
        }
        let mut breakdown = HashMap::new();
        for (token, reward) in rewards {
            let value = self.yearly_reward_usd(*token, reward, now).await?;
            breakdown.insert(*token, to_bps(value * BigDecimal::from(10_000) / &supply_usd));
        }
        Ok(TokenAprs {
            total: breakdown.values().sum(),
            breakdown,
        })
    }

    /// USD value of a year of `reward` at its current rate, zero once the
    /// distribution has ended.
    async fn yearly_reward_usd(
        &self,
        token: Address,
        reward: &RewardData,
        now: i64,
    ) -> Result<BigDecimal, Error> {
        if reward.period_finish < now {
            return Ok(BigDecimal::zero());
        }
        let price = self
            .repositories
            .token_prices
            .find(token)
            .await?
            .and_then(|price| price.usd)
            .ok_or_else(|| anyhow!("no USD price for reward token {token}"))?;
        let yearly = reward
            .rate
            .saturating_mul(U256::from(SECONDS_PER_YEAR.unsigned_abs()));
        Ok(scale(&u256_to_big_decimal(&yearly), -i64::from(reward.decimals)) * price)
    }

    fn fee_complement(&self) -> BigDecimal {
        BigDecimal::one() - &self.protocol_fee
    }
}

/// Whether the protocol takes a share of yields accrued inside `pool`.
fn charges_yield_fee(pool: &Pool) -> bool {
    match pool.pool_type {
        PoolType::ComposableStable => true,
        PoolType::Weighted => pool.pool_type_version >= 2,
        _ => false,
    }
}

/// Share of yields left to liquidity providers after the protocol's cut.
fn yield_fee_complement(pool: &Pool) -> BigDecimal {
    let fee = pool
        .protocol_yield_fee_cache
        .map(Bfp::to_big_decimal)
        .unwrap_or_else(|| BigDecimal::new(5.into(), 1));
    BigDecimal::one() - fee
}

fn to_bps(value: BigDecimal) -> u64 {
    value
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::facade::{
            Repositories,
            tests::{BAL, DAI, USDC, WETH, dai_weth, decimal, facade, facade_with, pool},
        },
        alloy_primitives::B256,
        data_providers::{
            StaticLiquidityGauges,
            StaticPoolRepository,
            StaticTokenPrices,
            StaticTokenYields,
            TokenPrice,
            liquidity_gauges::MockLiquidityGaugeProvider,
            repository::MockPoolRepository,
        },
        maplit::hashmap,
        serde_json::json,
        std::sync::Arc,
    };

    /// 1000 DAI and 1000 USDC in a MetaStable pool at `address`.
    fn meta_stable(address: Address) -> Pool {
        pool(json!({
            "id": B256::repeat_byte(address.0[0]),
            "address": address,
            "poolType": "MetaStable",
            "swapFee": "0.0004",
            "totalShares": "2000",
            "amp": "50",
            "tokens": [
                { "address": DAI, "decimals": 18, "balance": "1000" },
                { "address": USDC, "decimals": 6, "balance": "1000" },
            ],
        }))
    }

    /// Gauge of the DAI/WETH pool with 100 of its 100 shares staked.
    fn gauge(working_supply: &str, reward_tokens: HashMap<Address, RewardData>) -> LiquidityGauge {
        LiquidityGauge {
            address: Address::repeat_byte(0x9a),
            pool_id: dai_weth().id,
            total_supply: decimal("100"),
            working_supply: decimal(working_supply),
            relative_weight: decimal("0.01"),
            reward_tokens,
        }
    }

    fn staked(gauges: Vec<LiquidityGauge>) -> Pools {
        let mut pools = facade(vec![]).with_bal_token(BAL);
        pools.repositories.liquidity_gauges = Some(Arc::new(StaticLiquidityGauges::new(gauges)));
        pools
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(to_bps(decimal("6083.333")), 6083);
        assert_eq!(to_bps(decimal("12.5")), 13);
        assert_eq!(to_bps(decimal("0.49")), 0);
    }

    #[test]
    fn yield_fee_by_pool_type() {
        let mut pool = dai_weth();
        assert!(!charges_yield_fee(&pool));
        pool.pool_type_version = 2;
        assert!(charges_yield_fee(&pool));
        pool.pool_type = PoolType::ComposableStable;
        assert!(charges_yield_fee(&pool));
        pool.pool_type = PoolType::Stable;
        assert!(!charges_yield_fee(&pool));
    }

    #[tokio::test]
    async fn weighted_pool_apr() {
        let mut yesterday = MockPoolRepository::new();
        yesterday.expect_find().returning(|_| {
            let mut pool = dai_weth();
            pool.total_swap_fee = decimal("100");
            Ok(Some(pool))
        });
        let pools = facade_with(
            vec![],
            Some(Arc::new(yesterday)),
            hashmap! { WETH => 400 },
        );

        // 5 USD of net fees a day on 3000 USD of liquidity.
        let apr = pools.apr(&dai_weth()).await.unwrap();
        assert_eq!(
            apr,
            AprBreakdown {
                swap_fees: 6083,
                token_aprs: TokenAprs {
                    total: 200,
                    breakdown: hashmap! { WETH => 200 },
                },
                staking_apr: StakingApr::default(),
                reward_aprs: TokenAprs::default(),
                min: 6283,
                max: 6283,
            }
        );
    }

    #[tokio::test]
    async fn meta_stable_yields_pay_protocol_fee() {
        let pool = meta_stable(Address::repeat_byte(5));
        let pools = facade_with(vec![], None, hashmap! { DAI => 400 });
        let apr = pools.apr(&pool).await.unwrap();
        assert_eq!(apr.swap_fees, 0);
        assert_eq!(apr.token_aprs.breakdown, hashmap! { DAI => 100 });
        assert_eq!((apr.min, apr.max), (100, 100));
    }

    #[tokio::test]
    async fn nested_pool_aprs() {
        let sub_pool = meta_stable(Address::repeat_byte(5));
        let outer = pool(json!({
            "id": B256::repeat_byte(6),
            "address": Address::repeat_byte(6),
            "poolType": "ComposableStable",
            "swapFee": "0.0001",
            "totalShares": "2000",
            "amp": "100",
            "tokens": [
                { "address": DAI, "decimals": 18, "balance": "1000" },
                { "address": Address::repeat_byte(6), "decimals": 18, "balance": "1000000" },
                { "address": Address::repeat_byte(5), "decimals": 18, "balance": "1000" },
            ],
        }));
        let pools = facade_with(vec![sub_pool, outer.clone()], None, hashmap! { DAI => 400 });

        let apr = pools.apr(&outer).await.unwrap();
        assert_eq!(
            apr.token_aprs,
            TokenAprs {
                total: 125,
                breakdown: hashmap! {
                    DAI => 100,
                    Address::repeat_byte(5) => 25,
                },
            }
        );
        assert_eq!(apr.min, 125);
    }

    #[tokio::test]
    async fn exempt_tokens_keep_their_yield() {
        let sub_pool = meta_stable(Address::repeat_byte(5));
        let mut outer = pool(json!({
            "id": B256::repeat_byte(6),
            "address": Address::repeat_byte(6),
            "poolType": "ComposableStable",
            "poolTypeVersion": 3,
            "swapFee": "0.0001",
            "totalShares": "2000",
            "amp": "100",
            "protocolYieldFeeCache": "0.2",
            "tokens": [
                { "address": DAI, "decimals": 18, "balance": "1000", "isExemptFromYieldProtocolFee": true },
                { "address": Address::repeat_byte(6), "decimals": 18, "balance": "1000000" },
                { "address": Address::repeat_byte(5), "decimals": 18, "balance": "1000" },
            ],
        }));
        let pools = facade_with(vec![sub_pool], None, hashmap! { DAI => 400 });

        // DAI is exempt, the sub-pool pays the pool's 20% yield fee.
        let apr = pools.apr(&outer).await.unwrap();
        assert_eq!(
            apr.token_aprs.breakdown,
            hashmap! {
                DAI => 200,
                Address::repeat_byte(5) => 40,
            }
        );

        // Exemption also covers sub-pool tokens.
        outer.tokens[2].is_exempt_from_yield_protocol_fee = true;
        let apr = pools.apr(&outer).await.unwrap();
        assert_eq!(apr.token_aprs.breakdown[&Address::repeat_byte(5)], 50);
    }

    #[tokio::test]
    async fn staking_apr_from_bal_emissions() {
        let pools = staked(vec![gauge("40", HashMap::new())]);

        // A year of emissions from the first epoch: 7560714 BAL, 1% of which
        // go to the gauge, worth 378035 USD against 101 working shares of 30
        // USD each.
        let apr = pools
            .apr_at(&dai_weth(), emissions::START_EPOCH_TIME)
            .await
            .unwrap();
        assert_eq!(
            apr.staking_apr,
            StakingApr {
                min: 1_247_643,
                max: 3_119_107,
            }
        );
        assert_eq!(apr.min, apr.swap_fees + 1_247_643);
        assert_eq!(apr.max, apr.swap_fees + 3_119_107);
    }

    #[tokio::test]
    async fn no_staking_apr_without_working_supply_or_bal_token() {
        let apr = staked(vec![gauge("0", HashMap::new())])
            .apr_at(&dai_weth(), emissions::START_EPOCH_TIME)
            .await
            .unwrap();
        assert_eq!(apr.staking_apr, StakingApr::default());

        let mut pools = staked(vec![gauge("40", HashMap::new())]);
        pools.bal_token = None;
        let apr = pools
            .apr_at(&dai_weth(), emissions::START_EPOCH_TIME)
            .await
            .unwrap();
        assert_eq!(apr.staking_apr, StakingApr::default());
    }

    #[tokio::test]
    async fn streamed_bal_is_staking_apr() {
        let now = emissions::START_EPOCH_TIME;
        // 31.536 BAL a year, worth 157.68 USD on 3000 USD staked.
        let pools = staked(vec![gauge(
            "0",
            hashmap! {
                BAL => RewardData {
                    rate: U256::from(1_000_000_000_000u64),
                    period_finish: now + 7 * 86_400,
                    decimals: 18,
                },
            },
        )]);
        let apr = pools.apr_at(&dai_weth(), now).await.unwrap();
        assert_eq!(apr.staking_apr, StakingApr { min: 526, max: 526 });
        assert_eq!(apr.reward_aprs, TokenAprs::default());
    }

    #[tokio::test]
    async fn reward_aprs_of_active_distributions() {
        let now = emissions::START_EPOCH_TIME;
        let pools = staked(vec![gauge(
            "0",
            hashmap! {
                USDC => RewardData {
                    rate: U256::from(1),
                    period_finish: now + 1,
                    decimals: 6,
                },
                DAI => RewardData {
                    rate: U256::from(10).pow(U256::from(18)),
                    period_finish: now - 1,
                    decimals: 18,
                },
            },
        )]);

        // 31.536 USDC a year on 3000 USD staked.
        let apr = pools.apr_at(&dai_weth(), now).await.unwrap();
        assert_eq!(
            apr.reward_aprs,
            TokenAprs {
                total: 105,
                breakdown: hashmap! { USDC => 105, DAI => 0 },
            }
        );
        assert_eq!(apr.min, apr.swap_fees + 105);
        assert_eq!(apr.max, apr.min);
    }

    #[tokio::test]
    async fn gauges_are_found_by_pool_id() {
        let mut gauges = MockLiquidityGaugeProvider::new();
        gauges
            .expect_find_by_pool()
            .with(mockall::predicate::eq(dai_weth().id))
            .times(1)
            .returning(|_| Err(anyhow!("gauge subgraph unavailable")));
        let mut pools = facade(vec![]).with_bal_token(BAL);
        pools.repositories.liquidity_gauges = Some(Arc::new(gauges));
        assert!(matches!(
            pools.apr(&dai_weth()).await,
            Err(Error::Provider(_))
        ));
    }

    #[tokio::test]
    async fn unweighted_yield_token_needs_price() {
        let pools = Pools::new(
            Repositories {
                pools: Arc::new(StaticPoolRepository::default()),
                yesterdays_pools: None,
                token_prices: Arc::new(StaticTokenPrices::new(
                    hashmap! { USDC => TokenPrice { usd: Some(decimal("1")), eth: None } },
                    WETH,
                )),
                token_yields: Arc::new(StaticTokenYields::new(hashmap! { DAI => 400 })),
                liquidity_gauges: None,
            },
            Address::ZERO,
            WETH,
            decimal("0.5"),
        );
        assert!(matches!(
            pools.apr(&meta_stable(Address::repeat_byte(5))).await,
            Err(Error::Provider(_))
        ));
    }

    #[tokio::test]
    async fn no_fees_no_yields() {
        let mut pool = dai_weth();
        pool.total_swap_fee = BigDecimal::zero();
        let apr = facade(vec![]).apr(&pool).await.unwrap();
        assert_eq!(apr, AprBreakdown::default());
    }
}
