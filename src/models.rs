//! Core Data Models
//!
//! This module defines the data structures flowing through the insights
//! pipeline, from raw warehouse rows to aggregated daily metrics.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`Record`] - Individual rows fetched from the warehouse
//! 2. **Aggregation**: [`DailyNetworkMetrics`] - One row per (date, network)
//!    with derived CPT and ROAS
//! 3. **Summary**: [`PeriodSummary`] - Week-over-week totals and comparisons
//!
//! ## Degraded Arithmetic
//!
//! Divisions over ad data routinely hit zero denominators (a day with spend
//! but no trials, revenue with no spend). [`SafeRatio`] makes that policy a
//! value instead of a fault: zero denominators produce signed-infinite or
//! undefined results that flow into formatting, never a panic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw ad-performance row as delivered by the warehouse.
///
/// Dates arrive as strings and may be unparseable; numeric fields may be
/// null. Neither condition is an error at this stage - date validity is
/// decided during aggregation and missing numerics count as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    #[serde(rename = "ad_network")]
    pub network: String,
    pub spend: Option<f64>,
    #[serde(rename = "trials_d3")]
    pub trials: Option<f64>,
    #[serde(rename = "revenue_d7")]
    pub revenue: Option<f64>,
}

/// Aggregated metrics for one (date, network) pair.
///
/// `cpt` and `roas` are plain `f64` and may carry infinities or NaN when a
/// denominator was zero; downstream formatting handles those explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct DailyNetworkMetrics {
    pub date: NaiveDate,
    pub network: String,
    pub spend: f64,
    pub trials: f64,
    pub revenue: f64,
    pub cpt: f64,
    pub roas: f64,
}

/// Totals for one comparison window of the period summary.
#[derive(Debug, Clone, Serialize)]
pub struct WindowTotals {
    pub spend: f64,
    pub trials: f64,
    pub revenue: f64,
    pub cpt: f64,
    /// Revenue over spend, expressed as a percentage.
    pub roas: f64,
}

/// Week-over-week comparison of the two most recent windows.
///
/// Naming caveat carried over from the upstream report definition: the
/// "last week" window selects rows with `date >= max_date`, which on a
/// daily-aggregated table is just the single latest day, compared against
/// the preceding 7 calendar days. The literal behavior is preserved.
///
/// Change fields are relative differences `(last - prev) / prev` with no
/// zero-guard; a zero previous value yields a signed-infinite (or NaN)
/// comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub last_week: WindowTotals,
    pub previous_week: WindowTotals,
    pub spend_change: f64,
    pub cpt_change: f64,
    pub roas_change: f64,
    pub revenue_change: f64,
    pub trials_change: f64,
}

/// Tagged result of a division that must not fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafeRatio {
    Finite(f64),
    PosInfinite,
    NegInfinite,
    Undefined,
}

impl SafeRatio {
    /// Divide, classifying the zero-denominator cases by the numerator's
    /// sign instead of raising.
    pub fn div(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            if numerator > 0.0 {
                SafeRatio::PosInfinite
            } else if numerator < 0.0 {
                SafeRatio::NegInfinite
            } else {
                SafeRatio::Undefined
            }
        } else {
            SafeRatio::Finite(numerator / denominator)
        }
    }

    /// Collapse into the IEEE representation used by stored metrics.
    pub fn as_f64(self) -> f64 {
        match self {
            SafeRatio::Finite(v) => v,
            SafeRatio::PosInfinite => f64::INFINITY,
            SafeRatio::NegInfinite => f64::NEG_INFINITY,
            SafeRatio::Undefined => f64::NAN,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, SafeRatio::Finite(v) if v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ratio_finite() {
        assert_eq!(SafeRatio::div(10.0, 4.0), SafeRatio::Finite(2.5));
        assert!(SafeRatio::div(10.0, 4.0).is_finite());
    }

    #[test]
    fn test_safe_ratio_zero_denominator() {
        assert_eq!(SafeRatio::div(5.0, 0.0), SafeRatio::PosInfinite);
        assert_eq!(SafeRatio::div(-5.0, 0.0), SafeRatio::NegInfinite);
        assert_eq!(SafeRatio::div(0.0, 0.0), SafeRatio::Undefined);
    }

    #[test]
    fn test_safe_ratio_as_f64() {
        assert_eq!(SafeRatio::Finite(1.5).as_f64(), 1.5);
        assert_eq!(SafeRatio::PosInfinite.as_f64(), f64::INFINITY);
        assert_eq!(SafeRatio::NegInfinite.as_f64(), f64::NEG_INFINITY);
        assert!(SafeRatio::Undefined.as_f64().is_nan());
    }

    #[test]
    fn test_safe_ratio_nan_numerator_stays_finite_variant() {
        // NaN / x goes through the Finite arm and stays NaN; only a zero
        // denominator is classified.
        let ratio = SafeRatio::div(f64::NAN, 2.0);
        match ratio {
            SafeRatio::Finite(v) => assert!(v.is_nan()),
            other => panic!("expected Finite(NaN), got {:?}", other),
        }
        assert!(!ratio.is_finite());
    }

    #[test]
    fn test_record_deserialization_with_nulls() {
        let json = r#"{
            "date": "2026-07-01",
            "ad_network": "Google Ads",
            "spend": 120.5,
            "trials_d3": null,
            "revenue_d7": 300.0
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.network, "Google Ads");
        assert_eq!(record.spend, Some(120.5));
        assert_eq!(record.trials, None);
        assert_eq!(record.revenue, Some(300.0));
    }

    #[test]
    fn test_record_deserialization_missing_numeric_fields() {
        let json = r#"{"date": "2026-07-01", "ad_network": "Meta Ads"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.spend, None);
        assert_eq!(record.trials, None);
        assert_eq!(record.revenue, None);
    }
}
