use crate::domain::{
    AxisGranularity, DateRange, GraphPoint, MAX_VISIBLE_DAYS, MIN_VISIBLE_DAYS, WeightRange,
    axis_granularity, days_before, goal_line, graph_date_range, min_max_weight_range,
};
use crate::entities::{WeightEntry, WeightLossGoal};
use chrono::NaiveDate;
use serde::Serialize;

/// Everything a chart needs to draw the weight graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphModel {
    /// Full data range the chart can pan over
    pub dates: DateRange,
    /// Currently visible part of `dates`
    pub visible: DateRange,
    pub weights: WeightRange,
    pub granularity: AxisGranularity,
    /// Weight entries, oldest first
    pub points: Vec<GraphPoint>,
    pub goal_line: Option<[GraphPoint; 4]>,
}

impl GraphModel {
    pub fn build(entries: &[WeightEntry], goal: Option<&WeightLossGoal>, today: NaiveDate) -> Self {
        let dates = graph_date_range(entries, today);
        let weights = min_max_weight_range(goal, entries, dates);

        let mut points: Vec<GraphPoint> = entries
            .iter()
            .map(|e| GraphPoint::new(e.date, e.weight))
            .collect();
        points.sort_by_key(|p| p.date);

        let mut model = Self {
            dates,
            visible: dates,
            weights,
            granularity: axis_granularity(dates.span_days() as f64),
            points,
            goal_line: goal.map(|goal| goal_line(goal, today)),
        };
        model.zoom_to(dates);
        model
    }

    /// Change the visible window, keeping it within the zoom limits, and
    /// pick the matching tick granularity.
    pub fn zoom_to(&mut self, requested: DateRange) {
        let span = requested
            .span_days()
            .clamp(MIN_VISIBLE_DAYS, MAX_VISIBLE_DAYS);
        let visible = DateRange::new(days_before(requested.end, span), requested.end);

        self.visible = visible;
        self.granularity = axis_granularity(visible.span_days() as f64);
    }

    /// Zoom to the last `days` days of the data range
    pub fn zoom_to_last_days(&mut self, days: i64) {
        let end = self.dates.end;
        let days = days.clamp(MIN_VISIBLE_DAYS, MAX_VISIBLE_DAYS);
        self.zoom_to(DateRange::new(days_before(end, days), end));
    }

    /// Points inside the visible window
    pub fn visible_points(&self) -> impl Iterator<Item = &GraphPoint> {
        self.points
            .iter()
            .filter(|p| self.visible.contains(p.date))
    }
}
