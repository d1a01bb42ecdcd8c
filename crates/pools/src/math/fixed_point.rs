//! Balancer's 18 decimals fixed point number (`FixedPoint.sol`).

mod logexpmath;

use {
    super::{BalU256, Error},
    alloy_primitives::U256,
    bigdecimal::BigDecimal,
    num::BigRational,
    number::{
        conversions::{big_decimal_to_u256, u256_to_big_decimal},
        fixed::{format_fixed, scale},
        u256_ext::U256Ext,
    },
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{
        fmt::{self, Debug, Display, Formatter},
        str::FromStr,
    },
};

const ONE_18: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
// 1e-14, the relative error bound of `logexpmath::pow`.
const MAX_POW_RELATIVE_ERROR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

#[derive(
    Clone, Copy, Default, Eq, PartialEq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Bfp(U256);

impl Bfp {
    pub const fn zero() -> Self {
        Self(U256::ZERO)
    }

    pub const fn one() -> Self {
        Self(ONE_18)
    }

    /// Wraps a raw value already scaled by `10^18`.
    pub const fn from_wei(num: U256) -> Self {
        Self(num)
    }

    pub fn as_uint256(self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Integer `value` as a fixed point number.
    pub fn integer(value: u64) -> Result<Self, Error> {
        Ok(Self(U256::from(value).bmul(ONE_18)?))
    }

    pub fn add(self, other: Self) -> Result<Self, Error> {
        Ok(Self(self.0.badd(other.0)?))
    }

    pub fn sub(self, other: Self) -> Result<Self, Error> {
        Ok(Self(self.0.bsub(other.0)?))
    }

    pub fn mul_down(self, other: Self) -> Result<Self, Error> {
        Ok(Self(self.0.bmul(other.0)? / ONE_18))
    }

    pub fn mul_up(self, other: Self) -> Result<Self, Error> {
        let product = self.0.bmul(other.0)?;
        if product.is_zero() {
            return Ok(Self::zero());
        }
        Ok(Self((product - U256::from(1)) / ONE_18 + U256::from(1)))
    }

    pub fn div_down(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        Ok(Self(self.0.bmul(ONE_18)? / other.0))
    }

    pub fn div_up(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let inflated = self.0.bmul(ONE_18)?;
        Ok(Self((inflated - U256::from(1)) / other.0 + U256::from(1)))
    }

    /// `1 - self`, saturating at zero.
    pub fn complement(self) -> Self {
        if self.0 < ONE_18 {
            Self(ONE_18 - self.0)
        } else {
            Self::zero()
        }
    }

    /// `self^exp` rounded up by the maximum relative error of the
    /// approximation.
    pub fn pow_up(self, exp: Self) -> Result<Self, Error> {
        let raw = Bfp(logexpmath::pow(self.0, exp.0)?);
        let max_error = raw.mul_up(Bfp(MAX_POW_RELATIVE_ERROR))?.add(Bfp(U256::from(1)))?;
        raw.add(max_error)
    }

    /// `self^exp` rounded down by the maximum relative error of the
    /// approximation.
    pub fn pow_down(self, exp: Self) -> Result<Self, Error> {
        let raw = Bfp(logexpmath::pow(self.0, exp.0)?);
        let max_error = raw.mul_up(Bfp(MAX_POW_RELATIVE_ERROR))?.add(Bfp(U256::from(1)))?;
        if raw < max_error {
            Ok(Self::zero())
        } else {
            raw.sub(max_error)
        }
    }

    pub fn to_big_rational(self) -> BigRational {
        self.0.to_big_rational() / ONE_18.to_big_rational()
    }

    pub fn to_big_decimal(self) -> BigDecimal {
        scale(&u256_to_big_decimal(&self.0), -18)
    }

    /// Converts a non-negative decimal with at most 18 fractional digits.
    pub fn from_big_decimal(value: &BigDecimal) -> Option<Self> {
        big_decimal_to_u256(&scale(value, 18)).map(Self)
    }
}

impl FromStr for Bfp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(number::fixed::parse_fixed(s, 18)?))
    }
}

impl Display for Bfp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, 18))
    }
}

impl Debug for Bfp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:0>18}", self.0 / ONE_18, (self.0 % ONE_18).to_string())
    }
}
