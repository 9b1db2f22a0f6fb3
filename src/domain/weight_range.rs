use crate::domain::DateRange;
use crate::entities::{WeightEntry, WeightLossGoal};
use rust_decimal::Decimal;
use serde::Serialize;

/// Added above and below the extreme weights
pub const WEIGHT_PADDING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Closest zoom-in on the weight axis
pub const MIN_VISIBLE_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Furthest zoom-out on the weight axis
pub const MAX_VISIBLE_WEIGHT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Shown when there is neither an entry nor a goal
pub const DEFAULT_WEIGHT_RANGE: WeightRange = WeightRange {
    min: Decimal::from_parts(125, 0, 0, false, 0),
    max: Decimal::from_parts(175, 0, 0, false, 0),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl WeightRange {
    pub fn span(&self) -> Decimal {
        self.max.saturating_sub(self.min)
    }
}

/// Weight range for the chart.
///
/// Covers entries dated within `dates` plus the goal's start and goal
/// weights, padded by [`WEIGHT_PADDING`]. The span is kept between
/// [`MIN_VISIBLE_WEIGHT`] and [`MAX_VISIBLE_WEIGHT`] around its midpoint and
/// never dips below zero.
pub fn min_max_weight_range(
    goal: Option<&WeightLossGoal>,
    entries: &[WeightEntry],
    dates: DateRange,
) -> WeightRange {
    let goal_weights = goal
        .into_iter()
        .flat_map(|g| [g.start_weight, g.goal_weight]);
    let weights: Vec<Decimal> = entries
        .iter()
        .filter(|e| dates.contains(e.date))
        .map(|e| e.weight)
        .chain(goal_weights)
        .collect();

    let (Some(lowest), Some(highest)) = (weights.iter().min(), weights.iter().max()) else {
        return DEFAULT_WEIGHT_RANGE;
    };

    let mut min = lowest.saturating_sub(WEIGHT_PADDING);
    let mut max = highest.saturating_add(WEIGHT_PADDING);

    let span = max.saturating_sub(min);
    let clamped = span.clamp(MIN_VISIBLE_WEIGHT, MAX_VISIBLE_WEIGHT);
    if clamped != span {
        let mid = min / Decimal::TWO + max / Decimal::TWO;
        min = mid.saturating_sub(clamped / Decimal::TWO);
        max = mid.saturating_add(clamped / Decimal::TWO);
    }

    if min < Decimal::ZERO {
        max = max.saturating_sub(min);
        min = Decimal::ZERO;
    }

    WeightRange { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn entry(d: u32, weight: i64) -> WeightEntry {
        WeightEntry::new(date(d), Decimal::from(weight))
    }

    fn may() -> DateRange {
        DateRange::new(date(1), date(31))
    }

    #[test]
    fn test_no_data_gives_default_range() {
        assert_eq!(min_max_weight_range(None, &[], may()), DEFAULT_WEIGHT_RANGE);
    }

    #[test]
    fn test_entries_are_padded() {
        let entries = [entry(2, 180), entry(9, 172), entry(16, 176)];
        let range = min_max_weight_range(None, &entries, may());

        assert_eq!(range.min, Decimal::from(167));
        assert_eq!(range.max, Decimal::from(185));
    }

    #[test]
    fn test_goal_weights_are_included() {
        let goal = WeightLossGoal::new(date(1), Decimal::from(200), date(30), Decimal::from(160));
        let entries = [entry(5, 190)];
        let range = min_max_weight_range(Some(&goal), &entries, may());

        assert_eq!(range.min, Decimal::from(155));
        assert_eq!(range.max, Decimal::from(205));
    }

    #[test]
    fn test_entries_outside_dates_are_ignored() {
        let entries = [entry(2, 180), WeightEntry::new(date(2) - chrono::Duration::days(60), Decimal::from(250))];
        let range = min_max_weight_range(None, &entries, may());

        assert_eq!(range.max, Decimal::from(185));
    }

    #[test]
    fn test_span_never_exceeds_maximum() {
        let entries = [entry(2, 300), entry(3, 120)];
        let range = min_max_weight_range(None, &entries, may());

        assert_eq!(range.span(), MAX_VISIBLE_WEIGHT);
        assert_eq!(range.min, Decimal::from(160));
        assert_eq!(range.max, Decimal::from(260));
    }

    #[test]
    fn test_extreme_weights_saturate_instead_of_overflowing() {
        let entries = [entry(2, 1), WeightEntry::new(date(3), Decimal::MAX)];
        let range = min_max_weight_range(None, &entries, may());
        assert_eq!(range.span(), MAX_VISIBLE_WEIGHT);

        let entries = [
            WeightEntry::new(date(2), Decimal::MIN),
            WeightEntry::new(date(3), Decimal::MAX),
        ];
        let range = min_max_weight_range(None, &entries, may());
        assert!(range.min >= Decimal::ZERO);
        assert!(range.max >= range.min);

        let entries = [WeightEntry::new(date(2), Decimal::MIN)];
        let range = min_max_weight_range(None, &entries, may());
        assert_eq!(range.min, Decimal::ZERO);
    }

    #[test]
    fn test_range_is_never_negative() {
        let entries = [entry(2, 1)];
        let range = min_max_weight_range(None, &entries, may());

        assert_eq!(range.min, Decimal::ZERO);
        assert_eq!(range.max, Decimal::from(10));
    }
}
