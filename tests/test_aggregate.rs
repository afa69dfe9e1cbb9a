use adpulse::aggregate::{aggregate, summarize};
use adpulse::models::Record;
use chrono::NaiveDate;
use std::collections::HashMap;

fn record(date: &str, network: &str, spend: f64, trials: f64, revenue: f64) -> Record {
    Record {
        date: date.to_string(),
        network: network.to_string(),
        spend: Some(spend),
        trials: Some(trials),
        revenue: Some(revenue),
    }
}

#[test]
fn test_aggregate_matches_naive_summation() {
    // Unordered input with several rows per (date, network) pair.
    let records = vec![
        record("2026-07-02", "Meta Ads", 12.5, 2.0, 30.0),
        record("2026-07-01", "Google Ads", 100.0, 10.0, 200.0),
        record("2026-07-01", "Google Ads", 25.0, 3.0, 55.0),
        record("2026-07-02", "Google Ads", 40.0, 4.0, 80.0),
        record("2026-07-01", "Meta Ads", 60.0, 6.0, 120.0),
        record("2026-07-02", "Meta Ads", 7.5, 1.0, 10.0),
    ];

    // Naive reference summation.
    let mut expected: HashMap<(String, String), (f64, f64, f64)> = HashMap::new();
    for r in &records {
        let sums = expected
            .entry((r.date.clone(), r.network.clone()))
            .or_insert((0.0, 0.0, 0.0));
        sums.0 += r.spend.unwrap();
        sums.1 += r.trials.unwrap();
        sums.2 += r.revenue.unwrap();
    }

    let table = aggregate(&records);
    assert_eq!(table.len(), expected.len());

    for row in &table {
        let key = (row.date.format("%Y-%m-%d").to_string(), row.network.clone());
        let (spend, trials, revenue) = expected[&key];
        assert_eq!(row.spend, spend, "spend mismatch for {:?}", key);
        assert_eq!(row.trials, trials, "trials mismatch for {:?}", key);
        assert_eq!(row.revenue, revenue, "revenue mismatch for {:?}", key);
        assert_eq!(row.cpt, spend / trials);
        assert_eq!(row.roas, revenue / spend);
    }
}

#[test]
fn test_aggregate_drops_only_bad_dates() {
    let records = vec![
        record("2026-07-01", "Google Ads", 10.0, 1.0, 20.0),
        record("", "Google Ads", 99.0, 9.0, 99.0),
        record("07/01/2026", "Google Ads", 99.0, 9.0, 99.0),
        Record {
            date: "2026-07-02".to_string(),
            network: "Google Ads".to_string(),
            spend: None,
            trials: None,
            revenue: None,
        },
    ];
    let table = aggregate(&records);

    // The two unparseable-date rows vanish; the all-null row survives as
    // zeros.
    assert_eq!(table.len(), 2);
    let day2 = table
        .iter()
        .find(|r| r.date == NaiveDate::from_ymd_opt(2026, 7, 2).unwrap())
        .unwrap();
    assert_eq!(day2.spend, 0.0);
    assert!(day2.cpt.is_nan());
}

#[test]
fn test_summarize_ignores_dropped_rows() {
    let records = vec![
        record("not-a-date", "Google Ads", 1000.0, 100.0, 2000.0),
        record("2026-07-08", "Google Ads", 100.0, 10.0, 200.0),
        record("2026-07-07", "Google Ads", 50.0, 5.0, 100.0),
    ];
    let table = aggregate(&records);
    let summary = summarize(&table).unwrap();

    // The garbage row contributes to neither window.
    assert_eq!(summary.last_week.spend, 100.0);
    assert_eq!(summary.previous_week.spend, 50.0);
    assert!((summary.spend_change - 1.0).abs() < 1e-9);
}

#[test]
fn test_summarize_latest_day_only_in_last_week_window() {
    // 14 straight days: the "last week" window is literally the latest
    // day, the previous window the 7 days before it.
    let mut records = Vec::new();
    for day in 1..=14 {
        records.push(record(
            &format!("2026-07-{:02}", day),
            "Google Ads",
            10.0,
            1.0,
            20.0,
        ));
    }
    let table = aggregate(&records);
    let summary = summarize(&table).unwrap();

    assert_eq!(summary.last_week.spend, 10.0);
    assert_eq!(summary.previous_week.spend, 70.0);
    assert_eq!(summary.last_week.roas, 200.0);
    assert_eq!(summary.previous_week.roas, 200.0);
    assert!((summary.roas_change - 0.0).abs() < 1e-9);
}
