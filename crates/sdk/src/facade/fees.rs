use {
    super::Pools,
    crate::Error,
    bigdecimal::BigDecimal,
    num::Zero,
    pools::Pool,
    tracing::instrument,
};

impl Pools {
    /// USD swap fees collected by the pool over the last 24 hours.
    ///
    /// Without a snapshot of the pool from 24 hours ago this is its all-time
    /// total.
    #[instrument(skip_all, fields(pool = %pool.id))]
    pub async fn fees(&self, pool: &Pool) -> Result<BigDecimal, Error> {
        let yesterday = match &self.repositories.yesterdays_pools {
            Some(yesterdays_pools) => yesterdays_pools.find(pool.id).await?,
            None => None,
        };
        let fees = match yesterday {
            Some(yesterday) => &pool.total_swap_fee - &yesterday.total_swap_fee,
            None => pool.total_swap_fee.clone(),
        };
        Ok(fees.max(BigDecimal::zero()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::facade::tests::{dai_weth, decimal, facade, facade_with},
        data_providers::repository::MockPoolRepository,
        mockall::predicate::eq,
        std::sync::Arc,
    };

    fn yesterday(total_swap_fee: &'static str) -> MockPoolRepository {
        let mut repository = MockPoolRepository::new();
        repository
            .expect_find()
            .with(eq(dai_weth().id))
            .times(1)
            .returning(move |_| {
                let mut pool = dai_weth();
                pool.total_swap_fee = decimal(total_swap_fee);
                Ok(Some(pool))
            });
        repository
    }

    #[tokio::test]
    async fn fees_since_yesterday() {
        let pools = facade_with(vec![], Some(Arc::new(yesterday("100"))), Default::default());
        assert_eq!(pools.fees(&dai_weth()).await.unwrap(), decimal("10"));
    }

    #[tokio::test]
    async fn fees_never_decrease() {
        let pools = facade_with(vec![], Some(Arc::new(yesterday("150"))), Default::default());
        assert_eq!(pools.fees(&dai_weth()).await.unwrap(), decimal("0"));
    }

    #[tokio::test]
    async fn all_time_fees_without_snapshot() {
        let mut repository = MockPoolRepository::new();
        repository.expect_find().returning(|_| Ok(None));
        let pools = facade_with(vec![], Some(Arc::new(repository)), Default::default());
        assert_eq!(pools.fees(&dai_weth()).await.unwrap(), decimal("110"));

        assert_eq!(facade(vec![]).fees(&dai_weth()).await.unwrap(), decimal("110"));
    }
}
