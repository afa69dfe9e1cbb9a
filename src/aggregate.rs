//! Daily Aggregation Engine
//!
//! Turns raw warehouse rows into the per-day, per-network metrics table the
//! renderer consumes, and computes the week-over-week period summary.
//!
//! ## Grouping Semantics
//!
//! Rows are grouped by (calendar day, network). Within a group spend,
//! trials, and revenue are summed with missing values counted as zero, and
//! the derived ratios CPT (spend per trial) and ROAS (revenue per spend)
//! are computed per aggregated row. Rows whose date fails to parse are
//! dropped; no other field can disqualify a row.
//!
//! ## Window Semantics
//!
//! [`summarize`] compares "last week" (all rows dated at or after the
//! table's maximum date - on daily data, the single latest day) against the
//! preceding 7 calendar days. Comparisons carry no zero-guard: dividing by
//! a zero previous total produces an infinite relative change by design of
//! the upstream report.

use crate::models::{DailyNetworkMetrics, PeriodSummary, Record, SafeRatio, WindowTotals};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a warehouse date string. Accepts dash and slash separators.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Group raw records into one metrics row per (date, network).
///
/// The returned table is sorted by date ascending (ties broken by network
/// name) and carries exactly one row per (date, network) pair seen in the
/// input. Non-finite CPT/ROAS values propagate into the table rather than
/// erroring.
pub fn aggregate(records: &[Record]) -> Vec<DailyNetworkMetrics> {
    let mut groups: HashMap<(NaiveDate, String), (f64, f64, f64)> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            dropped += 1;
            continue;
        };
        let sums = groups
            .entry((date, record.network.clone()))
            .or_insert((0.0, 0.0, 0.0));
        sums.0 += record.spend.unwrap_or(0.0);
        sums.1 += record.trials.unwrap_or(0.0);
        sums.2 += record.revenue.unwrap_or(0.0);
    }

    if dropped > 0 {
        debug!(dropped, "Dropped records with unparseable dates");
    }

    let mut rows: Vec<DailyNetworkMetrics> = groups
        .into_iter()
        .map(|((date, network), (spend, trials, revenue))| DailyNetworkMetrics {
            date,
            network,
            spend,
            trials,
            revenue,
            cpt: SafeRatio::div(spend, trials).as_f64(),
            roas: SafeRatio::div(revenue, spend).as_f64(),
        })
        .collect();

    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.network.cmp(&b.network)));
    rows
}

/// Compare the latest day against the preceding 7 calendar days.
///
/// Returns `None` for an empty table. Window sums are rounded to one
/// decimal before the derived ratios are taken.
pub fn summarize(table: &[DailyNetworkMetrics]) -> Option<PeriodSummary> {
    let max_date = table.iter().map(|row| row.date).max()?;
    let prev_start = max_date - Duration::days(7);

    let last_week = window_totals(table, |date| date >= max_date);
    let previous_week = window_totals(table, |date| date >= prev_start && date < max_date);

    Some(PeriodSummary {
        spend_change: (last_week.spend - previous_week.spend) / previous_week.spend,
        cpt_change: (last_week.cpt - previous_week.cpt) / previous_week.cpt,
        roas_change: (last_week.roas - previous_week.roas) / previous_week.roas,
        revenue_change: (last_week.revenue - previous_week.revenue) / previous_week.revenue,
        trials_change: (last_week.trials - previous_week.trials) / previous_week.trials,
        last_week,
        previous_week,
    })
}

fn window_totals<F>(table: &[DailyNetworkMetrics], in_window: F) -> WindowTotals
where
    F: Fn(NaiveDate) -> bool,
{
    let mut spend = 0.0;
    let mut trials = 0.0;
    let mut revenue = 0.0;
    for row in table.iter().filter(|row| in_window(row.date)) {
        spend += row.spend;
        trials += row.trials;
        revenue += row.revenue;
    }
    let spend = round1(spend);
    let trials = round1(trials);
    let revenue = round1(revenue);
    WindowTotals {
        spend,
        trials,
        revenue,
        cpt: spend / trials,
        roas: round1((revenue / spend) * 100.0),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
