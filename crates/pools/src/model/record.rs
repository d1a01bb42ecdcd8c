//! Raw pool records as returned by the Balancer subgraph and their mapping
//! into [`Pool`].

use {
    super::{AmplificationParameter, Pool, PoolToken, PoolType},
    crate::{
        error::{Error, InvalidInput},
        math::{fixed_point::Bfp, stable::AMP_PRECISION},
    },
    alloy_primitives::{Address, B256, U256},
    bigdecimal::BigDecimal,
    number::{conversions::big_decimal_to_u256, fixed::scale},
    serde::{Deserialize, Serialize},
    std::str::FromStr,
};

/// Pool as returned by the subgraph. Numbers are kept as the decimal strings
/// the subgraph returns; they are validated when converting into a [`Pool`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub id: B256,
    pub address: Address,
    pub pool_type: String,
    #[serde(default)]
    pub pool_type_version: Option<u32>,
    pub swap_fee: String,
    pub total_shares: String,
    #[serde(default)]
    pub amp: Option<String>,
    pub tokens: Vec<TokenRecord>,
    #[serde(default)]
    pub is_in_recovery_mode: Option<bool>,
    #[serde(default)]
    pub total_liquidity: Option<String>,
    #[serde(default)]
    pub total_swap_volume: Option<String>,
    #[serde(default)]
    pub total_swap_fee: Option<String>,
    #[serde(default)]
    pub protocol_yield_fee_cache: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub address: Address,
    #[serde(default)]
    pub decimals: Option<u8>,
    pub balance: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub price_rate: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub is_exempt_from_yield_protocol_fee: Option<bool>,
}

impl TryFrom<PoolRecord> for Pool {
    type Error = Error;

    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        let pool_type = PoolType::from_str(&record.pool_type)
            .unwrap_or_else(|_| PoolType::Unsupported(record.pool_type.clone()));
        let amp = record
            .amp
            .as_deref()
            .map(parse_amplification_parameter)
            .transpose()?;
        let tokens = record
            .tokens
            .into_iter()
            .map(PoolToken::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Pool {
            id: record.id,
            address: record.address,
            pool_type,
            pool_type_version: record.pool_type_version.unwrap_or(1),
            swap_fee: parse_bfp(&record.swap_fee)?,
            total_shares: parse_bfp(&record.total_shares)?,
            amp,
            tokens,
            in_recovery_mode: record.is_in_recovery_mode.unwrap_or_default(),
            total_liquidity: parse_optional_decimal(record.total_liquidity.as_deref())?,
            total_swap_volume: parse_optional_decimal(record.total_swap_volume.as_deref())?,
            total_swap_fee: parse_optional_decimal(record.total_swap_fee.as_deref())?,
            protocol_yield_fee_cache: record
                .protocol_yield_fee_cache
                .as_deref()
                .map(parse_bfp)
                .transpose()?,
        })
    }
}

impl TryFrom<TokenRecord> for PoolToken {
    type Error = Error;

    fn try_from(record: TokenRecord) -> Result<Self, Self::Error> {
        let decimals = record.decimals.unwrap_or(18);
        if decimals > 18 {
            return Err(InvalidInput::InputOutOfBounds.into());
        }
        Ok(PoolToken {
            address: record.address,
            decimals,
            balance: parse_bfp(&record.balance)?,
            weight: record.weight.as_deref().map(parse_bfp).transpose()?,
            price_rate: match record.price_rate.as_deref() {
                Some(rate) => parse_bfp(rate)?,
                None => Bfp::one(),
            },
            symbol: record.symbol,
            is_exempt_from_yield_protocol_fee: record
                .is_exempt_from_yield_protocol_fee
                .unwrap_or_default(),
        })
    }
}

fn parse_decimal(value: &str) -> Result<BigDecimal, InvalidInput> {
    BigDecimal::from_str(value.trim()).map_err(|_| InvalidInput::MalformedNumber(value.to_string()))
}

fn parse_optional_decimal(value: Option<&str>) -> Result<BigDecimal, InvalidInput> {
    value.map_or_else(|| Ok(BigDecimal::default()), parse_decimal)
}

fn parse_bfp(value: &str) -> Result<Bfp, InvalidInput> {
    // The subgraph reports some values with more than 18 decimals, those
    // digits are dropped.
    let decimal = parse_decimal(value)?.with_scale(18);
    Bfp::from_big_decimal(&decimal).ok_or_else(|| InvalidInput::MalformedNumber(value.to_string()))
}

fn parse_amplification_parameter(value: &str) -> Result<AmplificationParameter, InvalidInput> {
    let factor = big_decimal_to_u256(&scale(&parse_decimal(value)?, 3).with_scale(0))
        .ok_or_else(|| InvalidInput::MalformedNumber(value.to_string()))?;
    AmplificationParameter::try_new(factor, U256::from(AMP_PRECISION))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PoolRecord {
        serde_json::from_value(serde_json::json!({
            "id": "0x0b09dea16768f0799065c475be02919503cb2a3500020000000000000000001a",
            "address": "0x0b09dea16768f0799065c475be02919503cb2a35",
            "poolType": "Weighted",
            "poolTypeVersion": 2,
            "swapFee": "0.003",
            "totalShares": "81123.91",
            "tokens": [
                {
                    "address": "0x6b175474e89094c44da98b954eedeac495271d0f",
                    "decimals": 18,
                    "balance": "1000.5",
                    "weight": "0.4",
                    "symbol": "DAI",
                    "isExemptFromYieldProtocolFee": true
                },
                {
                    "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                    "decimals": 18,
                    "balance": "1",
                    "weight": "0.6",
                    "priceRate": "1.0"
                }
            ],
            "totalLiquidity": "4000.12",
            "totalSwapVolume": "123456.789",
            "protocolYieldFeeCache": "0.3"
        }))
        .unwrap()
    }

    #[test]
    fn maps_subgraph_record() {
        let pool = Pool::try_from(record()).unwrap();
        assert_eq!(pool.pool_type, PoolType::Weighted);
        assert_eq!(pool.pool_type_version, 2);
        assert_eq!(pool.swap_fee, bfp!("0.003"));
        assert_eq!(pool.total_shares, bfp!("81123.91"));
        assert_eq!(pool.amp, None);
        assert!(!pool.in_recovery_mode);
        assert_eq!(
            pool.tokens
                .iter()
                .map(|token| token.symbol.as_deref())
                .collect::<Vec<_>>(),
            vec![Some("DAI"), None]
        );
        assert_eq!(pool.tokens[0].balance, bfp!("1000.5"));
        assert_eq!(pool.tokens[1].weight, Some(bfp!("0.6")));
        assert_eq!(pool.total_liquidity, BigDecimal::from_str("4000.12").unwrap());
        assert_eq!(pool.total_swap_fee, BigDecimal::default());
        assert_eq!(pool.protocol_yield_fee_cache, Some(bfp!("0.3")));
        assert!(pool.tokens[0].is_exempt_from_yield_protocol_fee);
        assert!(!pool.tokens[1].is_exempt_from_yield_protocol_fee);
    }

    #[test]
    fn preserves_token_order() {
        let mut record = record();
        record.tokens.reverse();
        let expected = record.tokens.iter().map(|t| t.address).collect::<Vec<_>>();
        let pool = Pool::try_from(record).unwrap();
        assert_eq!(pool.token_addresses(), expected);
    }

    #[test]
    fn defaults_optional_fields() {
        let mut record = record();
        record.pool_type_version = None;
        record.tokens[0].decimals = None;
        record.tokens[0].weight = None;
        record.tokens[0].price_rate = None;
        record.tokens[0].is_exempt_from_yield_protocol_fee = None;
        record.protocol_yield_fee_cache = None;
        let pool = Pool::try_from(record).unwrap();
        assert_eq!(pool.pool_type_version, 1);
        assert_eq!(pool.tokens[0].decimals, 18);
        assert_eq!(pool.tokens[0].weight, None);
        assert_eq!(pool.tokens[0].price_rate, Bfp::one());
        assert!(!pool.tokens[0].is_exempt_from_yield_protocol_fee);
        assert_eq!(pool.protocol_yield_fee_cache, None);
    }

    #[test]
    fn parses_amplification() {
        let mut record = record();
        record.pool_type = "ComposableStable".to_string();
        record.amp = Some("1500".to_string());
        let pool = Pool::try_from(record).unwrap();
        assert_eq!(pool.amplification().unwrap(), U256::from(1_500_000));
    }

    #[test]
    fn keeps_unknown_pool_type() {
        let mut record = record();
        record.pool_type = "Gyro4Turbo".to_string();
        let pool = Pool::try_from(record).unwrap();
        assert_eq!(pool.pool_type, PoolType::Unsupported("Gyro4Turbo".to_string()));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let mut record = record();
        record.tokens[1].balance = "1,5".to_string();
        assert!(matches!(
            Pool::try_from(record).unwrap_err(),
            Error::InvalidInput(InvalidInput::MalformedNumber(value)) if value == "1,5"
        ));

        let mut record = self::record();
        record.swap_fee = "".to_string();
        assert!(Pool::try_from(record).is_err());

        let mut record = self::record();
        record.total_shares = "-1".to_string();
        assert!(Pool::try_from(record).is_err());
    }
}
