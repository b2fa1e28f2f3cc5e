use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::store::{self, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Day,
    Week,
    Month,
    Year,
}

impl DateFilter {
    /// Unknown values count as no filter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(DateFilter::Day),
            "week" => Some(DateFilter::Week),
            "month" => Some(DateFilter::Month),
            "year" => Some(DateFilter::Year),
            _ => None,
        }
    }

    /// `Day` is the UTC calendar date of `now`; the rest look back a fixed number of days.
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        let lookback = |days| TimeWindow {
            start: now - Duration::days(days),
            end: None,
        };
        match self {
            DateFilter::Day => {
                let start = now
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|midnight| midnight.and_utc())
                    .unwrap_or(now);
                TimeWindow {
                    start,
                    end: Some(start + Duration::days(1)),
                }
            }
            DateFilter::Week => lookback(7),
            DateFilter::Month => lookback(30),
            DateFilter::Year => lookback(365),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub bug_count: i64,
    pub successful_fixed_count: i64,
    pub current_date_filter: String,
}

pub async fn counts(
    pool: &SqlitePool,
    date_filter: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DashboardCounts, sqlx::Error> {
    let window = date_filter
        .and_then(DateFilter::parse)
        .map(|filter| filter.window(now));

    Ok(DashboardCounts {
        bug_count: store::count_bugs(pool, window).await?,
        successful_fixed_count: store::count_fixes(pool, window).await?,
        current_date_filter: date_filter.unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_window_is_the_calendar_date() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 17, 45, 0).unwrap();
        let window = DateFilter::Day.window(now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
        assert_eq!(window.end, Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap()));
    }

    #[test]
    fn rolling_windows_look_back_from_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(DateFilter::Week.window(now).start, now - Duration::days(7));
        assert_eq!(DateFilter::Month.window(now).start, now - Duration::days(30));
        assert_eq!(DateFilter::Year.window(now).start, now - Duration::days(365));
        assert!(DateFilter::Year.window(now).end.is_none());
    }

    #[test]
    fn unknown_filter_is_ignored() {
        assert_eq!(DateFilter::parse("decade"), None);
        assert_eq!(DateFilter::parse(""), None);
        assert_eq!(DateFilter::parse("week"), Some(DateFilter::Week));
    }
}
