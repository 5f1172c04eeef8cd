use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::records::category::{Bucket, Category};
use crate::records::timestamp::{minutes_from_start_of_day, parse_api_timestamp};
use crate::records::{CallRecord, CategoryPalette};

/// Cumulative 5-minute series for the summary graph: engaged outcomes vs
/// drop-offs, today only. Labels are minutes from midnight.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummarySeries {
    pub labels: Vec<String>,
    pub engaged: Vec<usize>,
    pub drop_off: Vec<usize>,
}

const SUMMARY_STEP_MINUTES: u32 = 5;

pub fn summary_series(records: &[CallRecord], now: NaiveDateTime) -> SummarySeries {
    let today = now.date();
    let today_minutes: Vec<(u32, Bucket)> = records
        .iter()
        .filter_map(|r| {
            let ts = parse_api_timestamp(&r.timestamp)?;
            (ts.date() == today)
                .then(|| (minutes_from_start_of_day(ts), r.category.bucket()))
        })
        .collect();

    let Some(&earliest) = today_minutes.iter().map(|(m, _)| m).min() else {
        return SummarySeries::default();
    };
    let latest = today_minutes.iter().map(|(m, _)| *m).max().unwrap_or(0);

    let start = (earliest / SUMMARY_STEP_MINUTES) * SUMMARY_STEP_MINUTES;
    // The series runs to now even when the last call was earlier, so the
    // chart's right edge tracks the clock.
    let end = minutes_from_start_of_day(now).max(latest);

    let mut series = SummarySeries::default();
    let mut boundary = start;
    while boundary <= end {
        series.labels.push(boundary.to_string());
        let engaged = today_minutes
            .iter()
            .filter(|(m, b)| *m <= boundary && *b == Bucket::Engaged)
            .count();
        let drop_off = today_minutes
            .iter()
            .filter(|(m, b)| *m <= boundary && *b == Bucket::DropOff)
            .count();
        series.engaged.push(engaged);
        series.drop_off.push(drop_off);
        boundary += SUMMARY_STEP_MINUTES;
    }
    series
}

#[derive(Debug, Clone, Serialize)]
pub struct StatDataset {
    pub label: &'static str,
    pub color: String,
    pub data: Vec<usize>,
}

/// Hourly or daily statistics series. One dataset per shown category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatSeries {
    /// "Time (Hour)" for a single-day series, "Date" otherwise.
    pub axis: &'static str,
    pub labels: Vec<String>,
    pub datasets: Vec<StatDataset>,
}

fn hour_label(hour: u32) -> String {
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    let ampm = if hour < 12 { "AM" } else { "PM" };
    format!("{display} {ampm}")
}

fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Build the statistics series. Records spanning a single calendar day are
/// bucketed by hour over the observed hour range; otherwise by calendar
/// date over the full earliest..latest range. Every bucket in range is
/// emitted, zeros included — the chart needs a dense series.
pub fn statistics_series(
    records: &[CallRecord],
    selected: &[Category],
    palette: &CategoryPalette,
) -> StatSeries {
    let shown: Vec<Category> = if selected.is_empty() {
        Category::ALL.to_vec()
    } else {
        selected.to_vec()
    };

    let parsed: Vec<(NaiveDateTime, Category)> = records
        .iter()
        .filter(|r| selected.is_empty() || selected.contains(&r.category))
        .filter_map(|r| parse_api_timestamp(&r.timestamp).map(|ts| (ts, r.category)))
        .collect();

    let Some(earliest) = parsed.iter().map(|(ts, _)| *ts).min() else {
        return StatSeries::default();
    };
    let latest = parsed.iter().map(|(ts, _)| *ts).max().unwrap_or(earliest);

    if earliest.date() == latest.date() {
        let start_hour = parsed.iter().map(|(ts, _)| ts.hour()).min().unwrap_or(0);
        let end_hour = parsed.iter().map(|(ts, _)| ts.hour()).max().unwrap_or(0);
        let hours: Vec<u32> = (start_hour..=end_hour).collect();

        StatSeries {
            axis: "Time (Hour)",
            labels: hours.iter().map(|&h| hour_label(h)).collect(),
            datasets: shown
                .iter()
                .map(|&cat| StatDataset {
                    label: cat.label(),
                    color: palette.color_for(cat),
                    data: hours
                        .iter()
                        .map(|&h| {
                            parsed
                                .iter()
                                .filter(|(ts, c)| ts.hour() == h && *c == cat)
                                .count()
                        })
                        .collect(),
                })
                .collect(),
        }
    } else {
        let mut dates = Vec::new();
        let mut date = earliest.date();
        while date <= latest.date() {
            dates.push(date);
            date += Duration::days(1);
        }

        StatSeries {
            axis: "Date",
            labels: dates.iter().map(|&d| date_label(d)).collect(),
            datasets: shown
                .iter()
                .map(|&cat| StatDataset {
                    label: cat.label(),
                    color: palette.color_for(cat),
                    data: dates
                        .iter()
                        .map(|&d| {
                            parsed
                                .iter()
                                .filter(|(ts, c)| ts.date() == d && *c == cat)
                                .count()
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
