//! Yields of interest bearing tokens in basis points per year.

use {alloy_primitives::Address, anyhow::Result, std::collections::HashMap};

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait TokenYieldProvider: Send + Sync {
    async fn find(&self, token: Address) -> Result<Option<u64>>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticTokenYields(HashMap<Address, u64>);

impl StaticTokenYields {
    pub fn new(yields: HashMap<Address, u64>) -> Self {
        Self(yields)
    }
}

#[async_trait::async_trait]
impl TokenYieldProvider for StaticTokenYields {
    async fn find(&self, token: Address) -> Result<Option<u64>> {
        Ok(self.0.get(&token).copied())
    }
}
