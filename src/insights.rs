//! Insight Rendering
//!
//! Turns the aggregated metrics table into the ordered sequence of text
//! lines posted to the delivery channel.
//!
//! ## Report Shape
//!
//! The report opens with a single header naming the latest date in the
//! table. Each network then gets a block of five metric triples - a header
//! line, a value line, and a day-over-day change line - in the fixed order
//! Spend, Trials, CPT, Revenue, ROAS, closed by a `---` separator.
//! Networks appear in order of first occurrence in the table; a network
//! with fewer than two rows gets a single "not enough data" line instead
//! of metric triples.
//!
//! ## Degradation Policy
//!
//! A missing or zero previous-day value turns the percentage change into a
//! signed infinity chosen by the current value's sign; NaN metrics fall
//! through to the "please investigate" value line. No arithmetic condition
//! can abort the remaining metrics or networks.
//!
//! ## Rolling Windows
//!
//! Seven-row trailing means are computed per network over row positions,
//! not calendar gaps - a network with missing days spans more than seven
//! calendar days. They are traced for operators rather than printed;
//! positions before the seventh row have no defined mean.

use crate::models::DailyNetworkMetrics;
use tracing::debug;

const ROLLING_WINDOW: usize = 7;
const SEPARATOR: &str = "---";
const POSITIVE_MARKER: &str = "\u{1F7E2}"; // 🟢
const NEGATIVE_MARKER: &str = "\u{1F534}"; // 🔴

/// The five reported metrics, in report order.
pub const METRIC_ORDER: [Metric; 5] = [
    Metric::Spend,
    Metric::Trials,
    Metric::Cpt,
    Metric::Revenue,
    Metric::Roas,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Spend,
    Trials,
    Cpt,
    Revenue,
    Roas,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Spend => "Spend",
            Metric::Trials => "Trials",
            Metric::Cpt => "CPT",
            Metric::Revenue => "Revenue",
            Metric::Roas => "ROAS",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Metric::Spend => "\u{1F4B0}",   // 💰
            Metric::Trials => "\u{1F50D}",  // 🔍
            Metric::Cpt => "\u{1F4CA}",     // 📊
            Metric::Revenue => "\u{1F4B8}", // 💸
            Metric::Roas => "\u{1F4C8}",    // 📈
        }
    }

    /// Spend and CPT are money amounts in their change lines.
    fn currency(self) -> bool {
        matches!(self, Metric::Spend | Metric::Cpt)
    }

    fn value(self, row: &DailyNetworkMetrics) -> f64 {
        match self {
            Metric::Spend => row.spend,
            Metric::Trials => row.trials,
            Metric::Cpt => row.cpt,
            Metric::Revenue => row.revenue,
            Metric::Roas => row.roas,
        }
    }
}

/// Decorative marker for a known ad network; unknown networks get none.
pub fn network_marker(network: &str) -> Option<&'static str> {
    match network {
        "Apple Search Ads" => Some("\u{1F34F}"), // 🍏
        "Google Ads" => Some("\u{1F916}"),       // 🤖
        "Meta Ads" => Some("\u{1F535}"),         // 🔵
        "TikTok Ads" => Some("\u{1F3B5}"),       // 🎵
        _ => None,
    }
}

/// Trailing means over the last [`ROLLING_WINDOW`] row positions of one
/// network's series. Entries before the window fills are `None`.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    pub spend: Vec<Option<f64>>,
    pub trials: Vec<Option<f64>>,
    pub cpt: Vec<Option<f64>>,
    pub revenue: Vec<Option<f64>>,
    pub roas: Vec<Option<f64>>,
}

impl RollingWindow {
    pub fn compute(rows: &[&DailyNetworkMetrics]) -> Self {
        let series = |pick: fn(&DailyNetworkMetrics) -> f64| -> Vec<f64> {
            rows.iter().map(|row| pick(row)).collect()
        };
        Self {
            spend: rolling_mean(&series(|r| r.spend), ROLLING_WINDOW),
            trials: rolling_mean(&series(|r| r.trials), ROLLING_WINDOW),
            cpt: rolling_mean(&series(|r| r.cpt), ROLLING_WINDOW),
            revenue: rolling_mean(&series(|r| r.revenue), ROLLING_WINDOW),
            roas: rolling_mean(&series(|r| r.roas), ROLLING_WINDOW),
        }
    }
}

/// Simple trailing moving average over sequence positions.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let trailing = &values[i + 1 - window..=i];
                Some(trailing.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Render the full insight report for an aggregated metrics table.
///
/// The table must be sorted by date ascending (as produced by
/// [`crate::aggregate::aggregate`]). An empty table renders no lines.
pub fn render(table: &[DailyNetworkMetrics]) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(max_date) = table.iter().map(|row| row.date).max() else {
        return lines;
    };
    lines.push(format!(
        "*Daily insights for {}:*",
        max_date.format("%Y-%m-%d")
    ));

    for network in networks_in_order(table) {
        let rows: Vec<&DailyNetworkMetrics> = table
            .iter()
            .filter(|row| row.network == network)
            .collect();

        if rows.len() < 2 {
            lines.push(format!(
                "Not enough data for {} to generate insights.",
                network
            ));
            lines.push(SEPARATOR.to_string());
            continue;
        }

        let window = RollingWindow::compute(&rows);
        if let Some(spend_avg) = window.spend.last().copied().flatten() {
            debug!(network = %network, spend_avg, "7-row rolling spend mean");
        }

        let current = rows[rows.len() - 1];
        let previous = previous_day(&rows);
        let marker = network_marker(&network);

        for metric in METRIC_ORDER {
            lines.push(header_line(metric, marker, &network));
            lines.push(value_line(metric, metric.value(current)));
            lines.push(change_line(
                metric,
                metric.value(current),
                metric.value(previous),
            ));
        }
        lines.push(SEPARATOR.to_string());
    }

    lines
}

/// Distinct networks in order of first occurrence in the table.
fn networks_in_order(table: &[DailyNetworkMetrics]) -> Vec<String> {
    let mut networks: Vec<String> = Vec::new();
    for row in table {
        if !networks.iter().any(|n| n == &row.network) {
            networks.push(row.network.clone());
        }
    }
    networks
}

/// The most recent row strictly before the latest date.
///
/// Walks backward from the second-to-last row, skipping rows that share
/// the latest date. If every earlier row shares that date (cannot happen
/// on a properly aggregated table) the earliest row is used.
fn previous_day<'a>(rows: &[&'a DailyNetworkMetrics]) -> &'a DailyNetworkMetrics {
    let current_date = rows[rows.len() - 1].date;
    let mut index = rows.len() - 2;
    while rows[index].date == current_date {
        if index == 0 {
            break;
        }
        index -= 1;
    }
    rows[index]
}

fn header_line(metric: Metric, marker: Option<&str>, network: &str) -> String {
    match marker {
        Some(m) => format!("*{} insights for {} {}:*", metric.label(), m, network),
        None => format!("*{} insights for  {}:*", metric.label(), network),
    }
}

fn value_line(metric: Metric, value: f64) -> String {
    let marker = metric.marker();
    match metric {
        Metric::Roas => {
            let pct = value * 100.0;
            if pct > 0.0 {
                format!("{} ROAS: {}%.", marker, fmt_grouped(pct))
            } else {
                format!("{} ROAS was below 0. Please investigate.", marker)
            }
        }
        Metric::Trials => {
            let actual = round2(value);
            if actual >= 0.0 {
                format!("{} Trials: {}.", marker, fmt_count(actual))
            } else {
                format!("{} Trials was below 0. Please investigate.", marker)
            }
        }
        _ => {
            let actual = round2(value);
            if actual >= 0.0 {
                format!("{} {}: ${}.", marker, metric.label(), fmt_grouped(actual))
            } else {
                format!(
                    "{} {} was below 0. Please investigate.",
                    marker,
                    metric.label()
                )
            }
        }
    }
}

fn change_line(metric: Metric, current: f64, previous: f64) -> String {
    let pct_change = if previous.is_nan() || previous == 0.0 {
        if current > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        round2((current - previous) / previous * 100.0)
    };
    let diff = round2(current - previous);
    let direction = if diff >= 0.0 {
        POSITIVE_MARKER
    } else {
        NEGATIVE_MARKER
    };

    if metric == Metric::Roas {
        // ROAS is a fraction, so the day-over-day move reads in
        // percentage points.
        let points = round2((current - previous) * 100.0);
        let word = if points < 0.0 { "decreased" } else { "increased" };
        return format!(
            "{} ROAS {} by {} percentage points compared to the previous day.",
            direction,
            word,
            fmt_grouped(points.abs())
        );
    }

    let prefix = if metric.currency() { "$" } else { "" };
    let (word, pct) = if diff < 0.0 {
        ("decreased", fmt_pct(pct_change.abs()))
    } else {
        ("increased", fmt_pct(pct_change))
    };
    format!(
        "{} {} {} by {}{} ({}%) compared to the previous day.",
        direction,
        metric.label(),
        word,
        prefix,
        fmt_grouped(diff.abs()),
        pct
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Thousands-grouped, two-decimal rendering: 1234.5 -> "1,234.50".
/// Non-finite values print as "inf" / "-inf" / "NaN".
fn fmt_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// Whole-count rendering with thousands separators: 1234.6 -> "1,235".
fn fmt_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    group_thousands(&format!("{:.0}", value.abs()))
}

/// Percent-change rendering for values already rounded to two decimals:
/// minimal trailing digits but always at least one decimal place
/// (50 -> "50.0", 33.33 -> "33.33").
fn fmt_pct(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut fixed = format!("{:.2}", value);
    if fixed.ends_with('0') {
        fixed.pop();
    }
    fixed
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
