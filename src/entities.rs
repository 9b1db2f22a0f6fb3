use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Weight Entry
// ============================================================================

/// A single weight sample recorded for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: Decimal,
}

impl WeightEntry {
    pub fn new(date: NaiveDate, weight: Decimal) -> Self {
        Self { date, weight }
    }

    /// Builds an entry from a timestamp, dropping the time of day.
    pub fn at(timestamp: NaiveDateTime, weight: Decimal) -> Self {
        Self::new(timestamp.date(), weight)
    }
}

impl fmt::Display for WeightEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.date.format("%Y-%m-%d"), self.weight)
    }
}

// ============================================================================
// Weight Loss Goal
// ============================================================================

/// The user's goal trajectory. Only one is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightLossGoal {
    pub start_date: NaiveDate,
    pub start_weight: Decimal,
    pub goal_date: NaiveDate,
    pub goal_weight: Decimal,
}

impl WeightLossGoal {
    pub fn new(
        start_date: NaiveDate,
        start_weight: Decimal,
        goal_date: NaiveDate,
        goal_weight: Decimal,
    ) -> Self {
        Self {
            start_date,
            start_weight,
            goal_date,
            goal_weight,
        }
    }

    /// Target weight on `date` along the straight line from start to goal.
    ///
    /// Before the start date the start weight applies, after the goal date
    /// the goal weight does.
    pub fn target_weight_on(&self, date: NaiveDate) -> Decimal {
        if date <= self.start_date {
            return self.start_weight;
        }
        if date >= self.goal_date {
            return self.goal_weight;
        }

        let total_days = Decimal::from((self.goal_date - self.start_date).num_days());
        let elapsed_days = Decimal::from((date - self.start_date).num_days());
        self.goal_weight
            .checked_sub(self.start_weight)
            .and_then(|change| change.checked_mul(elapsed_days))
            .and_then(|change| change.checked_div(total_days))
            .and_then(|change| self.start_weight.checked_add(change))
            .unwrap_or_else(|| {
                // Weights near the Decimal limits: blend the endpoints instead
                let progress = elapsed_days / total_days;
                self.start_weight
                    .saturating_mul(Decimal::ONE - progress)
                    .saturating_add(self.goal_weight.saturating_mul(progress))
            })
    }
}

impl fmt::Display for WeightLossGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} -> {} @ {}",
            self.start_weight,
            self.start_date.format("%Y-%m-%d"),
            self.goal_weight,
            self.goal_date.format("%Y-%m-%d")
        )
    }
}
