//! Pool repositories: where the facade gets its [`Pool`]s from.

use {
    crate::subgraph::SubgraphClient,
    alloy_primitives::{Address, B256},
    anyhow::{Context, Result, bail},
    pools::{Pool, model::PoolRecord},
    serde::Deserialize,
    serde_json::json,
};

/// The page size when querying pools.
#[cfg(not(test))]
const QUERY_PAGE_SIZE: usize = 1000;
#[cfg(test)]
const QUERY_PAGE_SIZE: usize = 10;

/// An attribute identifying a single pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolAttribute {
    Id(B256),
    Address(Address),
}

impl PoolAttribute {
    /// Builds the attribute from its name and the value to search for.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        match name {
            "id" => Ok(Self::Id(value.parse().context("invalid pool id")?)),
            "address" => Ok(Self::Address(
                value.parse().context("invalid pool address")?,
            )),
            _ => bail!("search by {name} not implemented"),
        }
    }

    fn matches(&self, pool: &Pool) -> bool {
        match self {
            Self::Id(id) => pool.id == *id,
            Self::Address(address) => pool.address == *address,
        }
    }
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait PoolRepository: Send + Sync {
    /// All pools of the repository.
    async fn fetch(&self) -> Result<Vec<Pool>>;

    async fn find(&self, id: B256) -> Result<Option<Pool>>;

    async fn find_by(&self, attribute: PoolAttribute) -> Result<Option<Pool>>;
}

/// A fixed set of pools held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticPoolRepository {
    pools: Vec<Pool>,
}

impl StaticPoolRepository {
    pub fn new(pools: Vec<Pool>) -> Self {
        Self { pools }
    }

    /// Maps subgraph records into pools, failing on the first malformed one.
    pub fn from_records(records: Vec<PoolRecord>) -> Result<Self> {
        let pools = records
            .into_iter()
            .map(|record| {
                let id = record.id;
                Pool::try_from(record).with_context(|| format!("invalid pool {id}"))
            })
            .collect::<Result<_>>()?;
        Ok(Self { pools })
    }
}

#[async_trait::async_trait]
impl PoolRepository for StaticPoolRepository {
    async fn fetch(&self) -> Result<Vec<Pool>> {
        Ok(self.pools.clone())
    }

    async fn find(&self, id: B256) -> Result<Option<Pool>> {
        self.find_by(PoolAttribute::Id(id)).await
    }

    async fn find_by(&self, attribute: PoolAttribute) -> Result<Option<Pool>> {
        Ok(self
            .pools
            .iter()
            .find(|pool| attribute.matches(pool))
            .cloned())
    }
}

/// Pools of the Balancer V2 subgraph, optionally as they were at a past
/// block.
#[derive(Clone, Debug)]
pub struct SubgraphPoolRepository {
    client: SubgraphClient,
    block: Option<u64>,
}

impl SubgraphPoolRepository {
    pub fn new(client: SubgraphClient) -> Self {
        Self {
            client,
            block: None,
        }
    }

    /// The same repository queried at `block`.
    pub fn at_block(&self, block: u64) -> Self {
        Self {
            client: self.client.clone(),
            block: Some(block),
        }
    }

    async fn query(
        &self,
        filter: serde_json::Value,
        page_size: usize,
        last_id: &str,
    ) -> Result<Vec<PoolRecord>> {
        Ok(self
            .client
            .query::<pools_query::Data>(
                pools_query::QUERY,
                Some(json_map! {
                    "block" => json!(self.block.map(|number| json!({ "number": number }))),
                    "pageSize" => page_size,
                    "lastId" => last_id,
                    "where" => filter,
                }),
            )
            .await?
            .pools)
    }

    async fn find_one(&self, filter: serde_json::Value) -> Result<Option<Pool>> {
        self.query(filter, 1, "")
            .await?
            .into_iter()
            .next()
            .map(into_pool)
            .transpose()
    }
}

#[async_trait::async_trait]
impl PoolRepository for SubgraphPoolRepository {
    async fn fetch(&self) -> Result<Vec<Pool>> {
        let mut pools = Vec::new();
        let mut last_id = String::new();

        // Paging by last ID instead of `skip` is the approach the subgraph
        // docs suggest for performance:
        // <https://thegraph.com/docs/en/querying/graphql-api/#pagination>
        loop {
            let page = self
                .query(json!({ "totalShares_gt": "0" }), QUERY_PAGE_SIZE, &last_id)
                .await?;
            let no_more_pages = page.len() != QUERY_PAGE_SIZE;
            if let Some(last_pool) = page.last() {
                last_id = last_pool.id.to_string();
            }

            for record in page {
                let id = record.id;
                match Pool::try_from(record) {
                    Ok(pool) => pools.push(pool),
                    Err(err) => tracing::warn!(%id, ?err, "skipping malformed pool"),
                }
            }

            if no_more_pages {
                break;
            }
        }

        tracing::debug!(count = pools.len(), block = ?self.block, "fetched pools");
        Ok(pools)
    }

    async fn find(&self, id: B256) -> Result<Option<Pool>> {
        self.find_one(json!({ "id": id.to_string() })).await
    }

    async fn find_by(&self, attribute: PoolAttribute) -> Result<Option<Pool>> {
        match attribute {
            PoolAttribute::Id(id) => self.find(id).await,
            PoolAttribute::Address(address) => {
                self.find_one(json!({ "address": address.to_string().to_lowercase() }))
                    .await
            }
        }
    }
}

fn into_pool(record: PoolRecord) -> Result<Pool> {
    let id = record.id;
    Pool::try_from(record).with_context(|| format!("invalid pool {id}"))
}

mod pools_query {
    use super::*;

    pub const QUERY: &str = r#"
        query Pools($block: Block_height, $pageSize: Int, $lastId: ID, $where: Pool_filter) {
            pools(
                block: $block
                first: $pageSize
                orderBy: id
                where: { and: [{ id_gt: $lastId }, $where] }
            ) {
                id
                address
                poolType
                poolTypeVersion
                swapFee
                totalShares
                amp
                isInRecoveryMode
                totalLiquidity
                totalSwapVolume
                totalSwapFee
                protocolYieldFeeCache
                tokens(orderBy: index) {
                    address
                    decimals
                    balance
                    weight
                    priceRate
                    symbol
                    isExemptFromYieldProtocolFee
                }
            }
        }
    "#;

    #[derive(Debug, Deserialize, PartialEq)]
    pub struct Data {
        pub pools: Vec<PoolRecord>,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy_primitives::address, pools::PoolType};

    fn record(id: u8, address: Address, pool_type: &str) -> PoolRecord {
        serde_json::from_value(json!({
            "id": B256::repeat_byte(id),
            "address": address,
            "poolType": pool_type,
            "swapFee": "0.003",
            "totalShares": "100",
            "tokens": [
                { "address": "0x6b175474e89094c44da98b954eedeac495271d0f", "decimals": 18, "balance": "1000", "weight": "0.5" },
                { "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "balance": "1", "weight": "0.5" },
            ],
        }))
        .unwrap()
    }

    fn repository() -> StaticPoolRepository {
        StaticPoolRepository::from_records(vec![
            record(1, Address::repeat_byte(1), "Weighted"),
            record(2, Address::repeat_byte(2), "FancyNewPool"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn static_repository_finds_pools() {
        let repository = repository();
        assert_eq!(repository.fetch().await.unwrap().len(), 2);

        let pool = repository.find(B256::repeat_byte(2)).await.unwrap().unwrap();
        assert_eq!(pool.pool_type, PoolType::Unsupported("FancyNewPool".to_string()));

        let pool = repository
            .find_by(PoolAttribute::Address(Address::repeat_byte(1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pool.id, B256::repeat_byte(1));

        assert!(repository.find(B256::repeat_byte(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn addresses_compare_case_insensitively() {
        let repository = StaticPoolRepository::from_records(vec![record(
            1,
            address!("0xba100000625a3754423978a60c9317c58a424e3d"),
            "Weighted",
        )])
        .unwrap();
        let attribute =
            PoolAttribute::parse("address", "0xBA100000625A3754423978A60C9317C58A424E3D").unwrap();
        assert!(repository.find_by(attribute).await.unwrap().is_some());
    }

    #[test]
    fn malformed_records_are_rejected() {
        let mut bad = record(1, Address::repeat_byte(1), "Weighted");
        bad.swap_fee = "lots".to_string();
        assert!(StaticPoolRepository::from_records(vec![bad]).is_err());
    }

    #[test]
    fn parse_attribute() {
        assert_eq!(
            PoolAttribute::parse("id", &B256::repeat_byte(7).to_string()).unwrap(),
            PoolAttribute::Id(B256::repeat_byte(7))
        );
        assert!(PoolAttribute::parse("address", "0x12").is_err());
        assert_eq!(
            PoolAttribute::parse("symbol", "B-80BAL-20WETH")
                .unwrap_err()
                .to_string(),
            "search by symbol not implemented"
        );
    }

    #[test]
    fn decode_pools_data() {
        let data: pools_query::Data = serde_json::from_value(json!({
            "pools": [{
                "id": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56000200000000000000000014",
                "address": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56",
                "poolType": "Weighted",
                "poolTypeVersion": 1,
                "swapFee": "0.01",
                "totalShares": "12345.6789",
                "amp": null,
                "isInRecoveryMode": false,
                "totalLiquidity": "1000000",
                "totalSwapVolume": "0",
                "totalSwapFee": "0",
                "protocolYieldFeeCache": null,
                "tokens": [
                    { "address": "0xba100000625a3754423978a60c9317c58a424e3d", "decimals": 18, "balance": "1", "weight": "0.8", "priceRate": "1", "symbol": "BAL", "isExemptFromYieldProtocolFee": true },
                    { "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "balance": "1", "weight": "0.2", "priceRate": "1", "symbol": "WETH" },
                ],
            }],
        }))
        .unwrap();
        let pool = into_pool(data.pools[0].clone()).unwrap();
        assert_eq!(pool.tokens[0].symbol.as_deref(), Some("BAL"));
        assert_eq!(pool.pool_type, PoolType::Weighted);
        assert_eq!(pool.protocol_yield_fee_cache, None);
        assert!(pool.tokens[0].is_exempt_from_yield_protocol_fee);
    }

    #[tokio::test]
    #[ignore]
    async fn mainnet_subgraph() {
        let client = SubgraphClient::new(
            "https://api.studio.thegraph.com/query/75376/balancer-v2/version/latest",
            reqwest::Client::new(),
        )
        .unwrap();
        let repository = SubgraphPoolRepository::new(client);
        let pools = repository.fetch().await.unwrap();
        println!("fetched {} pools", pools.len());
        let pool = repository
            .find(
                "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56000200000000000000000014"
                    .parse()
                    .unwrap(),
            )
            .await
            .unwrap();
        println!("{pool:#?}");
    }
}
