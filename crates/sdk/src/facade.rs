//! The pool facade: finds pools and dispatches every operation on a pool to
//! the concerns registered for its type.

mod apr;
mod fees;
mod liquidity;

pub use apr::{AprBreakdown, StakingApr, TokenAprs};
use {
    crate::{Config, Error},
    alloy_primitives::{Address, B256, U256},
    anyhow::Result,
    bigdecimal::BigDecimal,
    data_providers::{
        LiquidityGaugeProvider,
        PoolAttribute,
        PoolRepository,
        SubgraphClient,
        SubgraphPoolRepository,
        TokenPriceProvider,
        TokenYieldProvider,
    },
    pools::{
        Bfp,
        Pool,
        concerns::{
            ExitExactBptInParams,
            ExitExactTokensOutParams,
            ExitPoolAttributes,
            JoinParams,
            JoinPoolAttributes,
            RecoveryExitParams,
            Slippage,
        },
        registry,
    },
    std::sync::Arc,
    tracing::instrument,
};

/// Sub-pools nested deeper than this are treated like plain tokens.
const MAX_NESTING: usize = 4;

/// Where the facade gets its data from.
#[derive(Clone)]
pub struct Repositories {
    pub pools: Arc<dyn PoolRepository>,
    /// The pools as they were 24 hours ago.
    pub yesterdays_pools: Option<Arc<dyn PoolRepository>>,
    pub token_prices: Arc<dyn TokenPriceProvider>,
    pub token_yields: Arc<dyn TokenYieldProvider>,
    /// Without gauges pools earn no staking or reward APR.
    pub liquidity_gauges: Option<Arc<dyn LiquidityGaugeProvider>>,
}

/// How to exit a pool.
#[derive(Clone, Copy, Debug)]
pub enum ExitKind<'a> {
    /// Burn exactly `bpt_in`, proportionally or to a single token.
    ExactBptIn {
        bpt_in: U256,
        single_token_max_out: Option<Address>,
        should_unwrap_native_asset: bool,
    },
    /// Receive exactly `amounts_out` of `tokens_out`.
    ExactTokensOut {
        tokens_out: &'a [Address],
        amounts_out: &'a [U256],
    },
    /// Proportional exit of a pool in recovery mode.
    Recovery {
        bpt_in: U256,
        should_unwrap_native_asset: bool,
    },
}

pub struct Pools {
    repositories: Repositories,
    vault: Address,
    wrapped_native_asset: Address,
    /// Share of swap fees and yields going to the protocol.
    protocol_fee: BigDecimal,
    bal_token: Option<Address>,
}

impl Pools {
    pub fn new(
        repositories: Repositories,
        vault: Address,
        wrapped_native_asset: Address,
        protocol_fee: BigDecimal,
    ) -> Self {
        Self {
            repositories,
            vault,
            wrapped_native_asset,
            protocol_fee,
            bal_token: None,
        }
    }

    /// Sets the token gauges emit, needed for staking APRs.
    pub fn with_bal_token(mut self, bal_token: Address) -> Self {
        self.bal_token = Some(bal_token);
        self
    }

    pub fn from_config(config: &Config, repositories: Repositories) -> Result<Self> {
        let pools = Self::new(
            repositories,
            config.vault()?,
            config.wrapped_native_asset()?,
            config.protocol_swap_fee.clone(),
        );
        Ok(match config.bal_token() {
            Some(bal_token) => pools.with_bal_token(bal_token),
            None => pools,
        })
    }

    /// The pool repository backed by the configured subgraph.
    pub fn subgraph_repository(config: &Config) -> Result<SubgraphPoolRepository> {
        let client = SubgraphClient::new(config.subgraph_url.clone(), config.http_client()?)?;
        Ok(SubgraphPoolRepository::new(client))
    }

    #[instrument(skip(self))]
    pub async fn find(&self, id: B256) -> Result<Pool, Error> {
        self.repositories
            .pools
            .find(id)
            .await?
            .ok_or_else(|| pools::Error::not_found(format!("pool {id}")).into())
    }

    #[instrument(skip(self))]
    pub async fn find_by(&self, attribute: PoolAttribute) -> Result<Pool, Error> {
        self.repositories
            .pools
            .find_by(attribute)
            .await?
            .ok_or_else(|| pools::Error::not_found(format!("pool with {attribute:?}")).into())
    }

    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<Pool>, Error> {
        Ok(self.repositories.pools.fetch().await?)
    }

    /// Builds a transaction joining `pool` with exact amounts in. The zero
    /// address in `tokens_in` joins with the native asset.
    pub fn build_join(
        &self,
        pool: &Pool,
        joiner: Address,
        tokens_in: &[Address],
        amounts_in: &[U256],
        slippage: Slippage,
    ) -> Result<JoinPoolAttributes, Error> {
        let mut attributes = registry::join(&pool.pool_type)?.build_join(JoinParams {
            joiner,
            pool,
            tokens_in,
            amounts_in,
            slippage,
            wrapped_native_asset: self.wrapped_native_asset,
        })?;
        attributes.to = self.vault;
        tracing::debug!(pool = %pool.id, expected_bpt_out = %attributes.expected_bpt_out, "built join");
        Ok(attributes)
    }

    pub fn build_exit(
        &self,
        pool: &Pool,
        exiter: Address,
        kind: ExitKind<'_>,
        slippage: Slippage,
    ) -> Result<ExitPoolAttributes, Error> {
        let concern = registry::exit(&pool.pool_type)?;
        let mut attributes = match kind {
            ExitKind::ExactBptIn {
                bpt_in,
                single_token_max_out,
                should_unwrap_native_asset,
            } => concern.build_exit_exact_bpt_in(ExitExactBptInParams {
                exiter,
                pool,
                bpt_in,
                slippage,
                should_unwrap_native_asset,
                wrapped_native_asset: self.wrapped_native_asset,
                single_token_max_out,
            })?,
            ExitKind::ExactTokensOut {
                tokens_out,
                amounts_out,
            } => concern.build_exit_exact_tokens_out(ExitExactTokensOutParams {
                exiter,
                pool,
                tokens_out,
                amounts_out,
                slippage,
                wrapped_native_asset: self.wrapped_native_asset,
            })?,
            ExitKind::Recovery {
                bpt_in,
                should_unwrap_native_asset,
            } => {
                if !pool.in_recovery_mode {
                    tracing::warn!(pool = %pool.id, "recovery exit of a pool not in recovery mode will revert");
                }
                concern.build_recovery_exit(RecoveryExitParams {
                    exiter,
                    pool,
                    bpt_in,
                    slippage,
                    should_unwrap_native_asset,
                    wrapped_native_asset: self.wrapped_native_asset,
                })?
            }
        };
        attributes.to = self.vault;
        tracing::debug!(pool = %pool.id, ?kind, "built exit");
        Ok(attributes)
    }

    /// Units of `token_out` per unit of `token_in`.
    pub fn spot_price(
        &self,
        pool: &Pool,
        token_in: Address,
        token_out: Address,
    ) -> Result<BigDecimal, Error> {
        Ok(registry::spot_price(&pool.pool_type)?.calc_pool_spot_price(token_in, token_out, pool)?)
    }

    /// Price impact of joining with (or exiting to) `token_amounts` for
    /// `bpt_amount`, as an 18 decimals fraction.
    pub fn price_impact(
        &self,
        pool: &Pool,
        token_amounts: &[U256],
        bpt_amount: U256,
        is_join: bool,
    ) -> Result<Bfp, Error> {
        Ok(registry::price_impact(&pool.pool_type)?.calc_price_impact(
            pool,
            token_amounts,
            bpt_amount,
            is_join,
        )?)
    }

    pub fn bpt_zero_price_impact(&self, pool: &Pool, token_amounts: &[U256]) -> Result<Bfp, Error> {
        Ok(registry::price_impact(&pool.pool_type)?.bpt_zero_price_impact(pool, token_amounts)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        super::*,
        alloy_primitives::address,
        data_providers::{
            StaticPoolRepository,
            StaticTokenPrices,
            StaticTokenYields,
            TokenPrice,
            repository::MockPoolRepository,
        },
        maplit::hashmap,
        pools::{
            encoding::{
                ExitUserData,
                JoinUserData,
                STABLE,
                WEIGHTED,
                decode_recovery_exit,
                encode_recovery_exit,
            },
            model::PoolRecord,
        },
        serde_json::json,
        std::{collections::HashMap, str::FromStr},
    };

    pub const DAI: Address = address!("0x6b175474e89094c44da98b954eedeac495271d0f");
    pub const USDC: Address = address!("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const WETH: Address = address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    pub const BAL: Address = address!("0xba100000625a3754423978a60c9317c58a424e3d");
    pub const USER: Address = address!("0x1111111111111111111111111111111111111111");
    const VAULT: Address = address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8");

    pub fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    pub fn pool(record: serde_json::Value) -> Pool {
        serde_json::from_value::<PoolRecord>(record)
            .unwrap()
            .try_into()
            .unwrap()
    }

    /// 1000 DAI and 1 WETH, 50/50.
    pub fn dai_weth() -> Pool {
        pool(json!({
            "id": B256::repeat_byte(1),
            "address": Address::repeat_byte(1),
            "poolType": "Weighted",
            "swapFee": "0.003",
            "totalShares": "100",
            "totalSwapFee": "110",
            "tokens": [
                { "address": DAI, "decimals": 18, "balance": "1000", "weight": "0.5" },
                { "address": WETH, "decimals": 18, "balance": "1", "weight": "0.5" },
            ],
        }))
    }

    /// 1000 DAI and 1000 USDC.
    pub fn dai_usdc() -> Pool {
        pool(json!({
            "id": B256::repeat_byte(2),
            "address": Address::repeat_byte(2),
            "poolType": "Stable",
            "swapFee": "0.0004",
            "totalShares": "2000",
            "amp": "200",
            "isInRecoveryMode": true,
            "tokens": [
                { "address": DAI, "decimals": 18, "balance": "1000" },
                { "address": USDC, "decimals": 6, "balance": "1000" },
            ],
        }))
    }

    pub fn prices() -> StaticTokenPrices {
        StaticTokenPrices::new(
            hashmap! {
                DAI => TokenPrice { usd: Some(decimal("1")), eth: Some(decimal("0.0005")) },
                USDC => TokenPrice { usd: Some(decimal("1")), eth: Some(decimal("0.0005")) },
                WETH => TokenPrice { usd: Some(decimal("2000")), eth: Some(decimal("1")) },
                BAL => TokenPrice { usd: Some(decimal("5")), eth: Some(decimal("0.0025")) },
            },
            WETH,
        )
    }

    pub fn facade(pools: Vec<Pool>) -> Pools {
        facade_with(pools, None, HashMap::new())
    }

    pub fn facade_with(
        pools: Vec<Pool>,
        yesterdays_pools: Option<Arc<dyn PoolRepository>>,
        yields: HashMap<Address, u64>,
    ) -> Pools {
        Pools::new(
            Repositories {
                pools: Arc::new(StaticPoolRepository::new(pools)),
                yesterdays_pools,
                token_prices: Arc::new(prices()),
                token_yields: Arc::new(StaticTokenYields::new(yields)),
                liquidity_gauges: None,
            },
            VAULT,
            WETH,
            decimal("0.5"),
        )
    }

    #[tokio::test]
    async fn finds_pools() {
        let pools = facade(vec![dai_weth(), dai_usdc()]);
        assert_eq!(pools.all().await.unwrap().len(), 2);
        assert_eq!(
            pools.find(B256::repeat_byte(2)).await.unwrap(),
            dai_usdc()
        );
        assert_eq!(
            pools
                .find_by(PoolAttribute::Address(Address::repeat_byte(1)))
                .await
                .unwrap()
                .id,
            B256::repeat_byte(1)
        );
        assert!(matches!(
            pools.find(B256::repeat_byte(3)).await,
            Err(Error::Pool(pools::Error::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn repository_errors_are_provider_errors() {
        let mut repository = MockPoolRepository::new();
        repository
            .expect_find()
            .returning(|_| Err(anyhow::anyhow!("subgraph unavailable")));
        let pools = Pools::new(
            Repositories {
                pools: Arc::new(repository),
                yesterdays_pools: None,
                token_prices: Arc::new(prices()),
                token_yields: Arc::new(StaticTokenYields::default()),
                liquidity_gauges: None,
            },
            VAULT,
            WETH,
            decimal("0.5"),
        );
        assert!(matches!(
            pools.find(B256::ZERO).await,
            Err(Error::Provider(_))
        ));
    }

    #[test]
    fn spot_price_of_weighted_pool() {
        let pools = facade(vec![]);
        let price = pools.spot_price(&dai_weth(), DAI, WETH).unwrap();
        assert_eq!(price, decimal("0.001"));
    }

    #[test]
    fn join_targets_configured_vault() {
        let pool = dai_weth();
        let mut pools = facade(vec![]);
        pools.vault = Address::repeat_byte(0xba);
        let attributes = pools
            .build_join(
                &pool,
                USER,
                &[DAI, Address::ZERO],
                &[U256::from(10).pow(U256::from(18)), U256::from(10).pow(U256::from(15))],
                Slippage(100),
            )
            .unwrap();

        assert_eq!(attributes.to, Address::repeat_byte(0xba));
        assert_eq!(attributes.value, U256::from(10).pow(U256::from(15)));
        assert_eq!(attributes.call.request.assets, vec![DAI, Address::ZERO]);
        assert!(matches!(
            WEIGHTED.decode_join(&attributes.call.request.userData).unwrap(),
            JoinUserData::ExactTokensInForBptOut { min_bpt_amount_out, .. }
                if min_bpt_amount_out == attributes.min_bpt_out
        ));
    }

    #[test]
    fn unknown_pool_type_is_unsupported() {
        let mut pool = dai_weth();
        pool.pool_type = pools::PoolType::Unsupported("WeightedV9".to_string());
        let pools = facade(vec![]);
        let result = pools.build_join(
            &pool,
            USER,
            &[DAI, WETH],
            &[U256::from(1), U256::from(1)],
            Slippage(0),
        );
        assert!(matches!(
            result,
            Err(Error::Pool(pools::Error::UnsupportedPoolType {
                pool_type,
                capability: pools::Capability::Join,
            })) if pool_type == "WeightedV9"
        ));
    }

    #[test]
    fn join_validates_lengths() {
        let pools = facade(vec![]);
        let result = pools.build_join(
            &dai_weth(),
            USER,
            &[DAI, WETH],
            &[U256::from(1)],
            Slippage(0),
        );
        assert!(matches!(
            result,
            Err(Error::Pool(pools::Error::InvalidInput(
                pools::InvalidInput::InputLengthMismatch
            )))
        ));
    }

    #[test]
    fn recovery_exit_of_stable_pool() {
        let pools = facade(vec![]);
        let attributes = pools
            .build_exit(
                &dai_usdc(),
                USER,
                ExitKind::Recovery {
                    bpt_in: U256::from(500),
                    should_unwrap_native_asset: false,
                },
                Slippage(0),
            )
            .unwrap();

        assert_eq!(attributes.to, VAULT);
        assert_eq!(attributes.function_name, "exitPool");
        assert_eq!(
            attributes.call.request.userData,
            encode_recovery_exit(U256::from(500))
        );
        assert_eq!(
            decode_recovery_exit(&attributes.call.request.userData).unwrap(),
            (U256::from(255), U256::from(500))
        );
    }

    #[test]
    fn exact_tokens_out_exit() {
        let pools = facade(vec![]);
        let attributes = pools
            .build_exit(
                &dai_usdc(),
                USER,
                ExitKind::ExactTokensOut {
                    tokens_out: &[USDC, DAI],
                    amounts_out: &[U256::from(1_000_000), U256::from(10).pow(U256::from(18))],
                },
                Slippage(50),
            )
            .unwrap();
        assert!(matches!(
            STABLE.decode_exit(&attributes.call.request.userData).unwrap(),
            ExitUserData::BptInForExactTokensOut { max_bpt_amount_in, .. }
                if max_bpt_amount_in == attributes.max_bpt_in
        ));
        assert!(attributes.max_bpt_in > attributes.expected_bpt_in);
    }

    #[test]
    fn price_impact_of_proportional_join_is_zero() {
        let pools = facade(vec![]);
        let pool = dai_weth();
        let amounts = [U256::from(10).pow(U256::from(19)), U256::from(10).pow(U256::from(16))];
        let bpt_zero = pools.bpt_zero_price_impact(&pool, &amounts).unwrap();
        assert_eq!(bpt_zero, "1".parse().unwrap());
        let impact = pools
            .price_impact(&pool, &amounts, bpt_zero.as_uint256(), true)
            .unwrap();
        assert_eq!(impact, Bfp::zero());
    }
}
