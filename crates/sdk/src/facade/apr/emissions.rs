//! BAL emission schedule of the Balancer token admin: a weekly rate that is
//! cut by a factor of 2^(1/4) at the end of every year long epoch.

use anyhow::{Result, ensure};

/// BAL emitted per week during the first epoch.
pub const INITIAL_RATE: f64 = 145_000.;
pub const START_EPOCH_TIME: i64 = 1_648_465_251;
const RATE_REDUCTION_TIME: i64 = 365 * 86_400;

fn epoch(timestamp: i64) -> i64 {
    (timestamp - START_EPOCH_TIME).div_euclid(RATE_REDUCTION_TIME)
}

fn epoch_start(epoch: i64) -> i64 {
    START_EPOCH_TIME + RATE_REDUCTION_TIME * epoch
}

fn weekly_rate(epoch: i64) -> f64 {
    INITIAL_RATE * 2f64.powf(-(epoch as f64) / 4.)
}

/// BAL emitted per week at `timestamp`.
pub fn weekly(timestamp: i64) -> f64 {
    weekly_rate(epoch(timestamp))
}

/// BAL emitted during the whole of `epoch`, the first one being 0.
pub fn total(epoch: i64) -> f64 {
    weekly_rate(epoch) / 7. * 365.
}

/// BAL emitted between the unix timestamps `start` and `end`.
pub fn between(start: i64, end: i64) -> Result<f64> {
    ensure!(
        start >= START_EPOCH_TIME,
        "start timestamp before emission schedule deployment"
    );
    ensure!(end >= start, "cannot finish before starting");

    let (first, last) = (epoch(start), epoch(end));
    let whole_epochs = (first..=last).map(total).sum::<f64>();
    let skipped_before = (start - epoch_start(first)) as f64 / RATE_REDUCTION_TIME as f64;
    let skipped_after = (epoch_start(last + 1) - end) as f64 / RATE_REDUCTION_TIME as f64;
    Ok(whole_epochs - total(first) * skipped_before - total(last) * skipped_after)
}
