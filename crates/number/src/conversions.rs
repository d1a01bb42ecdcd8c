use {
    crate::u256_ext::U256Ext,
    alloy_primitives::U256,
    bigdecimal::{BigDecimal, num_bigint::ToBigInt},
    num::{BigInt, BigRational},
    std::cmp::Ordering,
};

pub fn u256_to_big_decimal(u256: &U256) -> BigDecimal {
    BigDecimal::from(u256.to_big_int())
}

/// Returns `None` for negative, fractional or too large values.
pub fn big_decimal_to_u256(big_decimal: &BigDecimal) -> Option<U256> {
    if !big_decimal.is_integer() {
        return None;
    }
    let big_int = big_decimal.to_bigint()?;
    U256::from_big_int(&big_int).ok()
}

pub fn big_rational_to_big_decimal(value: &BigRational) -> BigDecimal {
    BigDecimal::new(value.numer().clone(), 0) / BigDecimal::new(value.denom().clone(), 0)
}

pub fn big_decimal_to_big_rational(value: &BigDecimal) -> BigRational {
    let (numer, scale) = value.as_bigint_and_exponent();
    let (adjusted_numer, denom) = match scale.cmp(&0) {
        Ordering::Equal => (numer, BigInt::from(1)),
        Ordering::Greater => (numer, BigInt::from(10).pow(scale.unsigned_abs() as u32)),
        Ordering::Less => (
            numer * BigInt::from(10).pow(scale.unsigned_abs() as u32),
            BigInt::from(1),
        ),
    };

    BigRational::new(adjusted_numer, denom)
}
