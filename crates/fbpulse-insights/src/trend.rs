//! Trend Analyzer: calendar-day ingestion counts with z-score spike flags.
//!
//! The spike flag is a simple anomaly heuristic (population z-score over
//! the window's daily counts), not a statistical test — it carries no
//! significance guarantee and is labelled as advisory in the UI.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use fbpulse_core::{FeedbackRecord, DEFAULT_WINDOW_DAYS};
use serde::Serialize;

/// A day's count is flagged when its z-score exceeds this threshold.
const SPIKE_Z_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u64,
    pub is_spike: bool,
}

#[derive(Debug, Serialize)]
pub struct TrendSeries {
    pub window_days: u32,
    pub total_items_considered: u64,
    pub points: Vec<TrendPoint>,
}

/// Bucket a working set into per-day counts over
/// `[today - window_days, today]` and flag anomalous days.
///
/// Every day in the window appears exactly once, zeros included, in
/// ascending date order — `window_days + 1` points. A `window_days` of 0
/// ("all time" in the filter contract) has no natural chart span and falls
/// back to the 7-day default.
#[must_use]
pub fn trend(records: &[&FeedbackRecord], window_days: u32, now: DateTime<Utc>) -> TrendSeries {
    let window_days = if window_days == 0 {
        DEFAULT_WINDOW_DAYS
    } else {
        window_days
    };

    let today = now.date_naive();
    let start = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(today);

    // Records outside the charted span (an all-time working set is wider
    // than the fallback chart) are not counted: the per-point counts always
    // sum to `total_items_considered`.
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    let mut total = 0_u64;
    for record in records {
        let day = record.ingested_at.date_naive();
        if day >= start && day <= today {
            *per_day.entry(day).or_insert(0) += 1;
            total += 1;
        }
    }

    let mut points: Vec<TrendPoint> = Vec::with_capacity(window_days as usize + 1);
    let mut day = start;
    while day <= today {
        points.push(TrendPoint {
            date: day,
            count: per_day.get(&day).copied().unwrap_or(0),
            is_spike: false,
        });
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    flag_spikes(&mut points);

    TrendSeries {
        window_days,
        total_items_considered: total,
        points,
    }
}

/// Population mean/stddev over the window; a day spikes when its z-score
/// exceeds the threshold and its count is nonzero. Zero stddev (flat
/// series) flags nothing.
fn flag_spikes(points: &mut [TrendPoint]) {
    if points.is_empty() {
        return;
    }

    let n = points.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let mean = points.iter().map(|p| p.count as f64).sum::<f64>() / n;
    #[allow(clippy::cast_precision_loss)]
    let variance = points
        .iter()
        .map(|p| (p.count as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    if stddev <= 0.0 {
        return;
    }

    for point in points.iter_mut() {
        #[allow(clippy::cast_precision_loss)]
        let z = (point.count as f64 - mean) / stddev;
        if z > SPIKE_Z_THRESHOLD && point.count > 0 {
            point.is_spike = true;
        }
    }
}
