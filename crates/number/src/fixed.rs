//! Conversions between human readable decimal amounts ("1.5") and the
//! integer representation used on-chain (`1500000` for a 6 decimals token).

use {
    crate::conversions::big_decimal_to_u256,
    alloy_primitives::U256,
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    std::str::FromStr,
};

/// Multiplies `value` by `10^decimals`. Negative `decimals` divide. The
/// operation only moves the decimal point so it is exact.
pub fn scale(value: &BigDecimal, decimals: i64) -> BigDecimal {
    let (digits, exponent) = value.as_bigint_and_exponent();
    BigDecimal::new(digits, exponent - decimals).normalized()
}

/// Parses a decimal string and scales it by `10^decimals`.
pub fn scale_str(value: &str, decimals: i64) -> Result<BigDecimal> {
    let parsed = parse_decimal(value)?;
    Ok(scale(&parsed, decimals))
}

/// Parses a decimal string into a token amount with `decimals` decimals.
/// Fails if the value is negative, has more fractional digits than the token
/// supports or does not fit into 256 bits.
pub fn parse_fixed(value: &str, decimals: u8) -> Result<U256> {
    let scaled = scale_str(value, i64::from(decimals))?;
    anyhow::ensure!(
        scaled.is_integer(),
        "{value:?} has more than {decimals} fractional digits"
    );
    big_decimal_to_u256(&scaled).with_context(|| format!("{value:?} is not a valid token amount"))
}

/// Formats a token amount with `decimals` decimals as a decimal string.
/// Trailing fractional zeros are removed but at least one fractional digit
/// is kept, so `10^18` with 18 decimals formats as `"1.0"`.
pub fn format_fixed(amount: U256, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    let digits = format!("{:0>width$}", amount.to_string(), width = decimals + 1);
    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{integer}.0")
    } else {
        format!("{integer}.{fraction}")
    }
}

fn parse_decimal(value: &str) -> Result<BigDecimal> {
    let trimmed = value.trim();
    anyhow::ensure!(!trimmed.is_empty(), "empty numeric string");
    BigDecimal::from_str(trimmed).with_context(|| format!("malformed numeric string {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_one_by_eighteen() {
        assert_eq!(
            scale_str("1", 18).unwrap(),
            BigDecimal::from(1_000_000_000_000_000_000_u64)
        );
    }

    #[test]
    fn scale_round_trip() {
        for value in ["0", "1", "0.000001", "123.456789", "98765432109876543210.5", "-3.25"] {
            let x = BigDecimal::from_str(value).unwrap();
            assert_eq!(scale(&scale(&x, 6), -6), x, "{value}");
        }
    }

    #[test]
    fn scale_keeps_precision() {
        assert_eq!(
            scale_str("0.000000000000000001", 18).unwrap(),
            BigDecimal::from(1)
        );
        assert_eq!(
            scale_str("1", -20).unwrap(),
            BigDecimal::from_str("0.00000000000000000001").unwrap()
        );
    }

    #[test]
    fn malformed_strings_are_errors() {
        for value in ["", " ", "abc", "1.2.3", "0x10", "1,5"] {
            assert!(scale_str(value, 18).is_err(), "{value:?}");
            assert!(parse_fixed(value, 18).is_err(), "{value:?}");
        }
    }

    #[test]
    fn parse_fixed_amounts() {
        assert_eq!(parse_fixed("1.5", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(
            parse_fixed("1000", 18).unwrap(),
            U256::from(10).pow(U256::from(21))
        );
        assert!(parse_fixed("0.0000001", 6).is_err());
        assert!(parse_fixed("-1", 6).is_err());
    }

    #[test]
    fn format_fixed_amounts() {
        assert_eq!(format_fixed(U256::from(10).pow(U256::from(18)), 18), "1.0");
        assert_eq!(format_fixed(U256::from(1_500_000), 6), "1.5");
        assert_eq!(format_fixed(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_fixed(U256::from(42), 0), "42.0");
        assert_eq!(format_fixed(U256::ZERO, 6), "0.0");
    }
}
