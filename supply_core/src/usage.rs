//! Usage engine: elapsed-time decrement of supplement counts.
//!
//! Everything here is a pure function of its inputs. The caller supplies
//! `now`, so tests never wait on the wall clock.

use crate::Supplement;
use chrono::{DateTime, Duration, Utc};

/// Whole days between `last_saved_at` and `now`, rounded down.
///
/// A clock that went backwards yields zero rather than a negative span.
pub fn elapsed_days(last_saved_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - last_saved_at).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Baseline after consuming every whole day up to `now`.
///
/// The partial day left over stays pending, so repeated passes less than a
/// day apart still add up.
pub fn advance_baseline(last_saved_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    last_saved_at + Duration::days(i64::from(elapsed_days(last_saved_at, now)))
}

/// Consume `elapsed_days` worth of doses from a tracked supplement.
///
/// Untracked supplements are left alone. The count is clamped at zero and
/// no other field is touched.
pub fn apply_decrement(supplement: &mut Supplement, elapsed_days: u32) {
    if !supplement.auto_decrement || elapsed_days == 0 {
        return;
    }

    let consumed = f64::from(elapsed_days) * supplement.daily_dose;
    supplement.current_count = (supplement.current_count - consumed).max(0.0);
}

/// Apply one decrement pass to a set of records, returning the new records
pub fn decrement_pass(
    supplements: &[Supplement],
    last_saved_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<Supplement> {
    let days = elapsed_days(last_saved_at, now);

    supplements
        .iter()
        .cloned()
        .map(|mut supplement| {
            apply_decrement(&mut supplement, days);
            supplement
        })
        .collect()
}

/// The supplement that will run out first, with its days remaining
pub fn next_empty(supplements: &[Supplement]) -> Option<(&Supplement, f64)> {
    supplements
        .iter()
        .filter_map(|s| s.days_remaining().map(|days| (s, days)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
