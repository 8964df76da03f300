use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::models::DailyClicks;

/// Window of the clicks-by-day chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatsPeriod {
    #[default]
    Day,
    Week,
    Month,
    All,
}

fn parse_day(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(day.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(date)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

impl StatsPeriod {
    /// Oldest instant still inside the window; `None` for `All`
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            StatsPeriod::Day => Some(now - Duration::days(1)),
            StatsPeriod::Week => Some(now - Duration::days(7)),
            StatsPeriod::Month => now.checked_sub_months(Months::new(1)),
            StatsPeriod::All => None,
        }
    }

    /// Entries on or after the cutoff; entries with unreadable dates are dropped
    pub fn filter(self, series: &[DailyClicks], now: DateTime<Utc>) -> Vec<DailyClicks> {
        let Some(cutoff) = self.cutoff(now) else {
            return series.to_vec();
        };
        series
            .iter()
            .filter(|item| parse_day(&item.date).is_some_and(|day| day >= cutoff))
            .cloned()
            .collect()
    }
}
