//! Exponentiation with the same approximation as `LogExpMath.sol`: `x^y`
//! computed as `exp(y * ln(x))` over 18 decimals fixed point integers.

use {
    super::super::Error,
    alloy_primitives::{I256, U256},
    std::sync::LazyLock,
};

static ONE_18: LazyLock<I256> = LazyLock::new(|| I256::exp10(18));
static ONE_20: LazyLock<I256> = LazyLock::new(|| I256::exp10(20));
static ONE_36: LazyLock<I256> = LazyLock::new(|| I256::exp10(36));
static MAX_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| *ONE_18 * int(130));
static MIN_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| *ONE_18 * int(-41));
static LN_36_LOWER_BOUND: LazyLock<I256> = LazyLock::new(|| *ONE_18 - I256::exp10(17));
static LN_36_UPPER_BOUND: LazyLock<I256> = LazyLock::new(|| *ONE_18 + I256::exp10(17));
static MILD_EXPONENT_BOUND: LazyLock<U256> =
    LazyLock::new(|| (U256::from(1) << 254) / U256::from(10).pow(U256::from(20)));

/// `(x_n, a_n = e^x_n)` with 18 decimals, `x_0 = 2^7` and `x_1 = 2^6`. The
/// `a_n` are stored without decimals.
static TERMS_18: LazyLock<[(I256, I256); 2]> = LazyLock::new(|| {
    [
        (
            int(128_000_000_000_000_000_000),
            I256::from_dec_str("38877084059945950922200000000000000000000000000000000000")
                .unwrap_or_default(),
        ),
        (
            int(64_000_000_000_000_000_000),
            int(6_235_149_080_811_616_882_910_000_000),
        ),
    ]
});

/// `(x_n, a_n = e^x_n)` with 20 decimals for `x_n = 2^5 ... 2^-4`.
static TERMS_20: LazyLock<[(I256, I256); 10]> = LazyLock::new(|| {
    [
        (
            int(3_200_000_000_000_000_000_000),
            int(7_896_296_018_268_069_516_100_000_000_000_000),
        ),
        (
            int(1_600_000_000_000_000_000_000),
            int(888_611_052_050_787_263_676_000_000),
        ),
        (
            int(800_000_000_000_000_000_000),
            int(298_095_798_704_172_827_474_000),
        ),
        (
            int(400_000_000_000_000_000_000),
            int(5_459_815_003_314_423_907_810),
        ),
        (
            int(200_000_000_000_000_000_000),
            int(738_905_609_893_065_022_723),
        ),
        (
            int(100_000_000_000_000_000_000),
            int(271_828_182_845_904_523_536),
        ),
        (
            int(50_000_000_000_000_000_000),
            int(164_872_127_070_012_814_685),
        ),
        (
            int(25_000_000_000_000_000_000),
            int(128_402_541_668_774_148_407),
        ),
        (
            int(12_500_000_000_000_000_000),
            int(113_314_845_306_682_631_683),
        ),
        (
            int(6_250_000_000_000_000_000),
            int(106_449_445_891_785_942_956),
        ),
    ]
});

fn int(value: i128) -> I256 {
    I256::try_from(value).unwrap_or_default()
}

pub fn pow(x: U256, y: U256) -> Result<U256, Error> {
    if y.is_zero() {
        return Ok(ONE_18.into_raw());
    }
    if x.is_zero() {
        return Ok(U256::ZERO);
    }

    let x = I256::try_from(x).map_err(|_| Error::XOutOfBounds)?;
    if y >= *MILD_EXPONENT_BOUND {
        return Err(Error::YOutOfBounds);
    }
    let y = I256::try_from(y).map_err(|_| Error::YOutOfBounds)?;

    let logx_times_y = if *LN_36_LOWER_BOUND < x && x < *LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x);
        (ln_36_x / *ONE_18) * y + ((ln_36_x % *ONE_18) * y) / *ONE_18
    } else {
        ln(x) * y
    };
    let logx_times_y = logx_times_y / *ONE_18;

    if !(*MIN_NATURAL_EXPONENT..=*MAX_NATURAL_EXPONENT).contains(&logx_times_y) {
        return Err(Error::ProductOutOfBounds);
    }

    exp(logx_times_y).map(I256::into_raw)
}

fn exp(x: I256) -> Result<I256, Error> {
    if !(*MIN_NATURAL_EXPONENT..=*MAX_NATURAL_EXPONENT).contains(&x) {
        return Err(Error::InvalidExponent);
    }
    if x.is_negative() {
        return Ok((*ONE_18 * *ONE_18) / exp(-x)?);
    }

    let mut x = x;
    let mut first_an = int(1);
    if let Some((x_n, a_n)) = TERMS_18.iter().find(|(x_n, _)| x >= *x_n) {
        x -= *x_n;
        first_an = *a_n;
    }

    x *= int(100);

    // The last two terms are small enough for the series to handle.
    let mut product = *ONE_20;
    for (x_n, a_n) in &TERMS_20[..8] {
        if x >= *x_n {
            x -= *x_n;
            product = (product * *a_n) / *ONE_20;
        }
    }

    let mut series_sum = *ONE_20 + x;
    let mut term = x;
    for i in 2..=12 {
        term = ((term * x) / *ONE_20) / int(i);
        series_sum += term;
    }

    Ok((((product * series_sum) / *ONE_20) * first_an) / int(100))
}

fn ln(a: I256) -> I256 {
    if a < *ONE_18 {
        return -ln((*ONE_18 * *ONE_18) / a);
    }

    let mut a = a;
    let mut sum = I256::ZERO;
    for (x_n, a_n) in TERMS_18.iter() {
        if a >= *a_n * *ONE_18 {
            a /= *a_n;
            sum += *x_n;
        }
    }

    sum *= int(100);
    a *= int(100);

    for (x_n, a_n) in TERMS_20.iter() {
        if a >= *a_n {
            a = (a * *ONE_20) / *a_n;
            sum += *x_n;
        }
    }

    let z = ((a - *ONE_20) * *ONE_20) / (a + *ONE_20);
    let z_squared = (z * z) / *ONE_20;

    let mut num = z;
    let mut series_sum = num;
    for i in (3..=11).step_by(2) {
        num = (num * z_squared) / *ONE_20;
        series_sum += num / int(i);
    }

    (sum + series_sum * int(2)) / int(100)
}

/// Natural logarithm with 36 decimals of precision, only valid close to 1.
fn ln_36(x: I256) -> I256 {
    let x = x * *ONE_18;

    let z = ((x - *ONE_36) * *ONE_36) / (x + *ONE_36);
    let z_squared = (z * z) / *ONE_36;

    let mut num = z;
    let mut series_sum = num;
    for i in (3..=15).step_by(2) {
        num = (num * z_squared) / *ONE_36;
        series_sum += num / int(i);
    }

    series_sum * int(2)
}
