use crate::domain::{days_after, days_before};
use crate::entities::{WeightEntry, WeightLossGoal};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// The goal line runs this many days before the start and past the end
pub const GOAL_LINE_EXTENSION_DAYS: i64 = 30;

/// How today's weight compares to the goal trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStatus {
    /// No goal or no weight logged for today
    Neutral,
    OnTrack,
    OffTrack,
}

impl ProgressStatus {
    /// Base colour the app shows for this status
    pub fn color_hex(self) -> &'static str {
        match self {
            ProgressStatus::Neutral => "#3B6E9E",
            ProgressStatus::OnTrack => "#2E8B57",
            ProgressStatus::OffTrack => "#C0392B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodaysDisplayInfo {
    pub status: ProgressStatus,
    pub weight: Option<Decimal>,
    pub target_weight: Option<Decimal>,
}

impl TodaysDisplayInfo {
    /// Weight left to lose to be back on the line; negative when ahead.
    /// `None` also when the difference does not fit in a `Decimal`.
    pub fn distance_from_target(&self) -> Option<Decimal> {
        self.weight?.checked_sub(self.target_weight?)
    }
}

/// Today's status for the given goal and today's entry; either may be missing.
pub fn todays_display_info(
    goal: Option<&WeightLossGoal>,
    todays_entry: Option<&WeightEntry>,
) -> TodaysDisplayInfo {
    let weight = todays_entry.map(|e| e.weight);
    let target_weight = goal
        .zip(todays_entry)
        .map(|(goal, entry)| goal.target_weight_on(entry.date));

    let status = match (weight, target_weight) {
        (Some(weight), Some(target)) if weight <= target => ProgressStatus::OnTrack,
        (Some(_), Some(_)) => ProgressStatus::OffTrack,
        _ => ProgressStatus::Neutral,
    };

    TodaysDisplayInfo {
        status,
        weight,
        target_weight,
    }
}

/// True when `weight` is at or below the goal trajectory on `date`.
/// Without a goal there is nothing to meet, so this is `false`.
pub fn weight_met_goal_on_date(
    goal: Option<&WeightLossGoal>,
    date: NaiveDate,
    weight: Decimal,
) -> bool {
    goal.is_some_and(|goal| weight <= goal.target_weight_on(date))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphPoint {
    pub date: NaiveDate,
    pub weight: Decimal,
}

impl GraphPoint {
    pub fn new(date: NaiveDate, weight: Decimal) -> Self {
        Self { date, weight }
    }
}

/// Points of the dashed goal line.
///
/// Flat at the start weight from 30 days before the start, down the
/// trajectory, then flat at the goal weight until the later of 30 days past
/// the goal date and 30 days past today.
pub fn goal_line(goal: &WeightLossGoal, today: NaiveDate) -> [GraphPoint; 4] {
    let extension = GOAL_LINE_EXTENSION_DAYS;
    let line_end = days_after(goal.goal_date, extension).max(days_after(today, extension));

    [
        GraphPoint::new(days_before(goal.start_date, extension), goal.start_weight),
        GraphPoint::new(goal.start_date, goal.start_weight),
        GraphPoint::new(goal.goal_date, goal.goal_weight),
        GraphPoint::new(line_end, goal.goal_weight),
    ]
}
