use crate::entities::WeightEntry;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Days shown before today when there are no entries yet
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;

/// Closest zoom-in on the date axis
pub const MIN_VISIBLE_DAYS: i64 = 5;

/// Furthest zoom-out on the date axis
pub const MAX_VISIBLE_DAYS: i64 = 365;

/// Inclusive span of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whole days between start and end
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let end = self.end;
        (0..=(end - start).num_days()).map(move |i| start + Duration::days(i))
    }
}

/// `date` moved back by `days`, stopping at the earliest representable date
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

/// `date` moved forward by `days`, stopping at the latest representable date
pub fn days_after(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Date range for the weight chart.
///
/// Runs from the earliest entry to whichever is later of today and the newest
/// entry, so today is always on screen. Without entries it looks back
/// [`DEFAULT_LOOKBACK_DAYS`] from today. Short ranges are widened backwards to
/// [`MIN_VISIBLE_DAYS`].
pub fn graph_date_range(entries: &[WeightEntry], today: NaiveDate) -> DateRange {
    let earliest = entries.iter().map(|e| e.date).min();
    let latest = entries.iter().map(|e| e.date).max();

    let start = earliest.unwrap_or(days_before(today, DEFAULT_LOOKBACK_DAYS));
    let end = latest.map_or(today, |latest| latest.max(today));
    let start = start.min(days_before(end, MIN_VISIBLE_DAYS));

    DateRange::new(start, end)
}
