use {
    crate::{encoding, math},
    alloy_primitives::Address,
};

/// Operations a pool type can support.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    Join,
    Exit,
    SpotPrice,
    PriceImpact,
    Liquidity,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no {capability} concern registered for pool type {pool_type:?}")]
    UnsupportedPoolType {
        pool_type: String,
        capability: Capability,
    },
    #[error("{capability} is not implemented for {pool_type} pools")]
    NotImplemented {
        pool_type: String,
        capability: Capability,
    },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Math(#[from] math::Error),
    #[error(transparent)]
    Encoding(#[from] encoding::Error),
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("input arrays have different lengths")]
    InputLengthMismatch,
    #[error("token {0} is not part of the pool")]
    TokenMismatch(Address),
    #[error("pool token {0} has no weight")]
    MissingWeight(Address),
    #[error("pool has no amplification parameter")]
    MissingAmp,
    #[error("amount out of bounds")]
    InputOutOfBounds,
    #[error("exiting to the native asset requires unwrapping")]
    ConflictingNativeAssetUnwrap,
    #[error("malformed number {0:?}")]
    MalformedNumber(String),
    #[error("{pool_type} v{version} pools only support single token exits")]
    UnsupportedPoolTypeVersion { pool_type: String, version: u32 },
}

impl Error {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_type_and_capability() {
        let err = Error::UnsupportedPoolType {
            pool_type: "FancyNewPool".to_string(),
            capability: Capability::SpotPrice,
        };
        assert_eq!(
            err.to_string(),
            "no spot-price concern registered for pool type \"FancyNewPool\""
        );

        let err = Error::NotImplemented {
            pool_type: "FX".to_string(),
            capability: Capability::PriceImpact,
        };
        assert_eq!(err.to_string(), "price-impact is not implemented for FX pools");
    }

    #[test]
    fn math_errors_keep_their_code() {
        let err = Error::from(math::Error::ZeroDivision);
        assert_eq!(err.to_string(), "BAL#004: ZeroDivision");
    }
}
