//! Extension trait for U256 arithmetic operations.

use {
    alloy_primitives::U256,
    anyhow::Result,
    num::{BigInt, BigRational, BigUint, bigint::Sign},
};

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Ceiling division: (self + other - 1) / other
    fn checked_ceil_div(&self, other: &Self) -> Option<Self>;

    fn to_big_int(&self) -> BigInt;

    fn to_big_uint(&self) -> BigUint;

    fn to_big_rational(&self) -> BigRational;

    fn from_big_int(input: &BigInt) -> Result<Self>;

    fn from_big_uint(input: &BigUint) -> Result<Self>;
}

impl U256Ext for U256 {
    fn checked_ceil_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        self.checked_add(other.checked_sub(U256::from(1u64))?)?
            .checked_div(*other)
    }

    fn to_big_int(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.to_big_uint())
    }

    fn to_big_uint(&self) -> BigUint {
        BigUint::from_bytes_be(self.to_be_bytes::<32>().as_slice())
    }

    fn to_big_rational(&self) -> BigRational {
        BigRational::from_integer(self.to_big_int())
    }

    fn from_big_int(input: &BigInt) -> Result<Self> {
        anyhow::ensure!(input.sign() != Sign::Minus, "negative");
        Self::from_big_uint(input.magnitude())
    }

    fn from_big_uint(input: &BigUint) -> Result<Self> {
        let bytes = input.to_bytes_be();
        anyhow::ensure!(bytes.len() <= 32, "too large");
        Ok(U256::from_be_slice(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_div() {
        let ten = U256::from(10);
        assert_eq!(ten.checked_ceil_div(&U256::from(3)), Some(U256::from(4)));
        assert_eq!(ten.checked_ceil_div(&U256::from(5)), Some(U256::from(2)));
        assert_eq!(ten.checked_ceil_div(&U256::ZERO), None);
    }

    #[test]
    fn big_int_round_trip() {
        for value in [U256::ZERO, U256::from(1337), U256::MAX] {
            assert_eq!(U256::from_big_int(&value.to_big_int()).unwrap(), value);
        }
        assert!(U256::from_big_int(&BigInt::from(-1)).is_err());
        assert!(U256::from_big_int(&(U256::MAX.to_big_int() + 1)).is_err());
    }
}
