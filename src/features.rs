//! Behavioral feature derivation
//!
//! This module derives the four per-worker features from a filtered
//! attendance list:
//! - Attendance rate against the window's working days
//! - Average worked hours per record
//! - Punctuality (share of early clock-ins)
//! - Consistency (inverse spread of worked hours)
//!
//! Every function here is pure and total: degenerate inputs (no records,
//! zero working days) produce policy-defined zeros, never errors.

use crate::types::{AttendanceRecord, FeatureVector};

/// Clock-in hour at or before which a record counts as punctual
pub const PUNCTUAL_CLOCK_IN_HOUR: u32 = 7;

/// Assumed worst-case spread of worked hours. A standard deviation at or
/// above this scores 0 consistency; perfectly constant hours score 100.
/// A fixed policy constant, not a calibrated estimate.
pub const MAX_WORK_HOUR_STDDEV: f64 = 4.0;

/// Feature extractor for per-worker attendance metrics
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Derive all four features from one worker's records and the
    /// window's working-day count.
    pub fn derive(records: &[AttendanceRecord], working_days: u32) -> FeatureVector {
        FeatureVector {
            attendance_rate: attendance_rate(records, working_days),
            avg_work_hours: avg_work_hours(records),
            punctuality_score: punctuality_score(records),
            consistency_score: consistency_score(records),
        }
    }
}

/// Approved records over working days, as a percentage clamped to 100.
///
/// The clamp is deliberate: makeup shifts can push the raw count above the
/// nominal working days. Zero working days scores 0.
fn attendance_rate(records: &[AttendanceRecord], working_days: u32) -> f64 {
    if working_days == 0 {
        return 0.0;
    }

    let rate = records.len() as f64 / working_days as f64 * 100.0;
    rate.min(100.0)
}

/// Mean worked hours per record; 0 with no records
fn avg_work_hours(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let total_minutes: i64 = records.iter().map(|r| r.work_minutes).sum();
    total_minutes as f64 / 60.0 / records.len() as f64
}

/// Share of records with a punctual clock-in, as a percentage; 0 with no
/// records
fn punctuality_score(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let punctual = records
        .iter()
        .filter(|r| is_punctual(&r.clock_in_time))
        .count();

    punctual as f64 / records.len() as f64 * 100.0
}

/// A record is punctual when its clock-in hour is at or before
/// [`PUNCTUAL_CLOCK_IN_HOUR`]. Timestamps with no extractable hour count
/// as not punctual rather than failing the metric.
fn is_punctual(clock_in: &str) -> bool {
    match clock_in_hour(clock_in) {
        Some(hour) => hour <= PUNCTUAL_CLOCK_IN_HOUR,
        None => false,
    }
}

/// Extract the hour-of-day from an exported clock-in timestamp.
///
/// Upstream exporters emit either `YYYY-MM-DDTHH:MM:SS` (optionally with
/// a zone suffix) or the space-separated `YYYY-MM-DD HH:MM:SS` form.
fn clock_in_hour(clock_in: &str) -> Option<u32> {
    let (_, time_part) = clock_in
        .split_once('T')
        .or_else(|| clock_in.split_once(' '))?;

    let hour_str = time_part.split(':').next()?;
    hour_str.parse::<u32>().ok().filter(|h| *h < 24)
}

/// Inverse spread of worked hours against [`MAX_WORK_HOUR_STDDEV`], as a
/// percentage.
///
/// Needs at least two records, else 0. Uses the population standard
/// deviation (mean of squared deviations), not the sample estimator.
fn consistency_score(records: &[AttendanceRecord]) -> f64 {
    if records.len() < 2 {
        return 0.0;
    }

    let hours: Vec<f64> = records
        .iter()
        .map(|r| r.work_minutes as f64 / 60.0)
        .collect();

    let mean = hours.iter().sum::<f64>() / hours.len() as f64;
    let variance =
        hours.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / hours.len() as f64;
    let std_dev = variance.sqrt();

    ((MAX_WORK_HOUR_STDDEV - std_dev) / MAX_WORK_HOUR_STDDEV * 100.0).max(0.0)
}
