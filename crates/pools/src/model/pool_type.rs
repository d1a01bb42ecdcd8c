use {
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::fmt::{self, Display, Formatter},
};

/// Pool types as named by the Balancer subgraph.
///
/// Parsing never fails: names this crate does not know are kept verbatim in
/// [`PoolType::Unsupported`] so that dispatching on them can report exactly
/// which type is missing.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    strum::EnumString,
    strum::AsRefStr,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum PoolType {
    Weighted,
    Investment,
    LiquidityBootstrapping,
    Stable,
    MetaStable,
    StablePhantom,
    ComposableStable,
    HighAmpComposableStable,
    AaveLinear,
    #[strum(serialize = "ERC4626Linear")]
    Erc4626Linear,
    EulerLinear,
    GearboxLinear,
    YearnLinear,
    #[strum(serialize = "FX")]
    Fx,
    Gyro2,
    Gyro3,
    GyroE,
    Element,
    #[strum(default)]
    Unsupported(String),
}

impl PoolType {
    /// Every pool type with a registered concern set.
    pub fn known() -> [PoolType; 18] {
        use PoolType::*;
        [
            Weighted,
            Investment,
            LiquidityBootstrapping,
            Stable,
            MetaStable,
            StablePhantom,
            ComposableStable,
            HighAmpComposableStable,
            AaveLinear,
            Erc4626Linear,
            EulerLinear,
            GearboxLinear,
            YearnLinear,
            Fx,
            Gyro2,
            Gyro3,
            GyroE,
            Element,
        ]
    }

    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            Self::AaveLinear
                | Self::Erc4626Linear
                | Self::EulerLinear
                | Self::GearboxLinear
                | Self::YearnLinear
        )
    }

    /// Pools that register their own BPT as one of their tokens.
    pub fn has_phantom_bpt(&self) -> bool {
        self.is_linear()
            || matches!(
                self,
                Self::StablePhantom | Self::ComposableStable | Self::HighAmpComposableStable
            )
    }
}

impl Display for PoolType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(name) => f.write_str(name),
            known => f.write_str(known.as_ref()),
        }
    }
}
