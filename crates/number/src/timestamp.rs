//! Conversions between unix timestamps (seconds) and javascript style
//! timestamps (milliseconds) as used by price feed APIs.

use chrono::{DateTime, Utc};

/// Converts milliseconds to seconds, rounding half up to the nearest second.
pub fn to_unix_timestamp(millis: i64) -> i64 {
    millis.saturating_add(500).div_euclid(1000)
}

pub fn to_js_timestamp(seconds: i64) -> i64 {
    seconds.saturating_mul(1000)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_to_the_same_second() {
        for seconds in [0, 1, 1_672_531_200, -5] {
            assert_eq!(to_unix_timestamp(to_js_timestamp(seconds)), seconds);
        }
        for millis in [1_672_531_200_123, 1_672_531_200_999, 499] {
            let seconds = to_unix_timestamp(millis);
            assert_eq!(to_unix_timestamp(to_js_timestamp(seconds)), seconds);
        }
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(to_unix_timestamp(1_499), 1);
        assert_eq!(to_unix_timestamp(1_500), 2);
        assert_eq!(to_unix_timestamp(-1_500), -1);
    }
}
