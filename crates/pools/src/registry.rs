//! Maps pool types to the concerns implementing them.
//!
//! Every known pool type resolves to a static [`ConcernSet`]. Capabilities a
//! type does not support resolve to a concern that fails with
//! [`Error::NotImplemented`], while pool types without any registration fail
//! with [`Error::UnsupportedPoolType`].

use {
    crate::{
        concerns::{
            AveragePriceLiquidity,
            ExitConcern,
            JoinConcern,
            JoinExit,
            LiquidityConcern,
            NotImplemented,
            PriceImpactConcern,
            RecoveryOnly,
            SpotPriceConcern,
            WeightedLiquidity,
            stable::{StableMath, StablePriceImpact, StableSpotPrice},
            weighted::{WeightedMath, WeightedPriceImpact, WeightedSpotPrice},
        },
        encoding::{COMPOSABLE_STABLE, STABLE, WEIGHTED},
        error::{Capability, Error},
        model::PoolType,
    },
};

/// The concerns of one pool type family.
pub struct ConcernSet {
    pub join: &'static dyn JoinConcern,
    pub exit: &'static dyn ExitConcern,
    pub spot_price: &'static dyn SpotPriceConcern,
    pub price_impact: &'static dyn PriceImpactConcern,
    pub liquidity: &'static dyn LiquidityConcern,
}

const WEIGHTED_JOIN_EXIT: JoinExit<WeightedMath> = JoinExit {
    math: WeightedMath,
    layout: WEIGHTED,
};
const STABLE_JOIN_EXIT: JoinExit<StableMath> = JoinExit {
    math: StableMath,
    layout: STABLE,
};
const COMPOSABLE_STABLE_JOIN_EXIT: JoinExit<StableMath> = JoinExit {
    math: StableMath,
    layout: COMPOSABLE_STABLE,
};
const AVERAGE_PRICE: AveragePriceLiquidity = AveragePriceLiquidity {
    apply_price_rate: false,
};

static WEIGHTED_CONCERNS: ConcernSet = ConcernSet {
    join: &WEIGHTED_JOIN_EXIT,
    exit: &WEIGHTED_JOIN_EXIT,
    spot_price: &WeightedSpotPrice,
    price_impact: &WeightedPriceImpact,
    liquidity: &WeightedLiquidity,
};

static STABLE_CONCERNS: ConcernSet = ConcernSet {
    join: &STABLE_JOIN_EXIT,
    exit: &STABLE_JOIN_EXIT,
    spot_price: &StableSpotPrice,
    price_impact: &StablePriceImpact,
    liquidity: &AVERAGE_PRICE,
};

static STABLE_PHANTOM_CONCERNS: ConcernSet = ConcernSet {
    join: &NotImplemented,
    exit: &NotImplemented,
    spot_price: &StableSpotPrice,
    price_impact: &StablePriceImpact,
    liquidity: &AVERAGE_PRICE,
};

static COMPOSABLE_STABLE_CONCERNS: ConcernSet = ConcernSet {
    join: &COMPOSABLE_STABLE_JOIN_EXIT,
    exit: &COMPOSABLE_STABLE_JOIN_EXIT,
    spot_price: &StableSpotPrice,
    price_impact: &StablePriceImpact,
    liquidity: &AVERAGE_PRICE,
};

static LINEAR_CONCERNS: ConcernSet = ConcernSet {
    join: &NotImplemented,
    exit: &RecoveryOnly,
    spot_price: &NotImplemented,
    price_impact: &NotImplemented,
    liquidity: &AveragePriceLiquidity {
        apply_price_rate: true,
    },
};

static GYRO_CONCERNS: ConcernSet = ConcernSet {
    join: &NotImplemented,
    exit: &RecoveryOnly,
    spot_price: &NotImplemented,
    price_impact: &NotImplemented,
    liquidity: &AVERAGE_PRICE,
};

static LIQUIDITY_ONLY_CONCERNS: ConcernSet = ConcernSet {
    join: &NotImplemented,
    exit: &NotImplemented,
    spot_price: &NotImplemented,
    price_impact: &NotImplemented,
    liquidity: &AVERAGE_PRICE,
};

/// The concerns registered for `pool_type`, `None` for types this crate
/// does not know.
pub fn concerns_for(pool_type: &PoolType) -> Option<&'static ConcernSet> {
    let concerns = match pool_type {
        PoolType::Weighted | PoolType::Investment | PoolType::LiquidityBootstrapping => {
            &WEIGHTED_CONCERNS
        }
        PoolType::Stable | PoolType::MetaStable => &STABLE_CONCERNS,
        PoolType::StablePhantom => &STABLE_PHANTOM_CONCERNS,
        PoolType::ComposableStable | PoolType::HighAmpComposableStable => {
            &COMPOSABLE_STABLE_CONCERNS
        }
        PoolType::AaveLinear
        | PoolType::Erc4626Linear
        | PoolType::EulerLinear
        | PoolType::GearboxLinear
        | PoolType::YearnLinear => &LINEAR_CONCERNS,
        PoolType::Gyro2 | PoolType::Gyro3 | PoolType::GyroE => &GYRO_CONCERNS,
        PoolType::Fx | PoolType::Element => &LIQUIDITY_ONLY_CONCERNS,
        PoolType::Unsupported(_) => return None,
    };
    Some(concerns)
}

fn lookup(pool_type: &PoolType, capability: Capability) -> Result<&'static ConcernSet, Error> {
    concerns_for(pool_type).ok_or_else(|| Error::UnsupportedPoolType {
        pool_type: pool_type.to_string(),
        capability,
    })
}

pub fn join(pool_type: &PoolType) -> Result<&'static dyn JoinConcern, Error> {
    Ok(lookup(pool_type, Capability::Join)?.join)
}

pub fn exit(pool_type: &PoolType) -> Result<&'static dyn ExitConcern, Error> {
    Ok(lookup(pool_type, Capability::Exit)?.exit)
}

pub fn spot_price(pool_type: &PoolType) -> Result<&'static dyn SpotPriceConcern, Error> {
    Ok(lookup(pool_type, Capability::SpotPrice)?.spot_price)
}

pub fn price_impact(pool_type: &PoolType) -> Result<&'static dyn PriceImpactConcern, Error> {
    Ok(lookup(pool_type, Capability::PriceImpact)?.price_impact)
}

pub fn liquidity(pool_type: &PoolType) -> Result<&'static dyn LiquidityConcern, Error> {
    Ok(lookup(pool_type, Capability::Liquidity)?.liquidity)
}
