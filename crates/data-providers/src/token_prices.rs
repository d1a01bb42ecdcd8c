//! USD and native asset prices of tokens.

use {
    alloy_primitives::Address,
    anyhow::{Context, Result, ensure},
    bigdecimal::BigDecimal,
    num::{One, Zero},
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::collections::HashMap,
};

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TokenPrice {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub usd: Option<BigDecimal>,
    /// Price in the chain's native asset.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub eth: Option<BigDecimal>,
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait TokenPriceProvider: Send + Sync {
    /// The price of `token`, where the zero address stands for the native
    /// asset.
    async fn find(&self, token: Address) -> Result<Option<TokenPrice>>;

    /// How many `token` one unit of the native asset buys.
    async fn native_asset_price_in_token(&self, token: Address) -> Result<BigDecimal>;
}

/// Prices held in memory, for example loaded from a price feed snapshot.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenPrices {
    prices: HashMap<Address, TokenPrice>,
    wrapped_native_asset: Address,
}

impl StaticTokenPrices {
    pub fn new(prices: HashMap<Address, TokenPrice>, wrapped_native_asset: Address) -> Self {
        Self {
            prices,
            wrapped_native_asset,
        }
    }

    fn resolve(&self, token: Address) -> Address {
        if token.is_zero() {
            self.wrapped_native_asset
        } else {
            token
        }
    }
}

#[async_trait::async_trait]
impl TokenPriceProvider for StaticTokenPrices {
    async fn find(&self, token: Address) -> Result<Option<TokenPrice>> {
        let price = self.prices.get(&self.resolve(token)).cloned();
        if price.is_none() {
            tracing::trace!(%token, "no price");
        }
        Ok(price)
    }

    async fn native_asset_price_in_token(&self, token: Address) -> Result<BigDecimal> {
        let price_in_native_asset = self
            .find(token)
            .await?
            .and_then(|price| price.eth)
            .with_context(|| format!("no native asset price for {token}"))?;
        ensure!(
            !price_in_native_asset.is_zero(),
            "zero native asset price for {token}"
        );
        Ok(BigDecimal::one() / price_in_native_asset)
    }
}
