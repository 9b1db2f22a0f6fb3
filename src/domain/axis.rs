use chrono::NaiveDate;
use serde::Serialize;

/// More than this many visible days switches from daily to weekly ticks
pub const WEEK_SCALE_BREAKPOINT: f64 = 7.0;
/// More than this many visible days switches to roughly monthly ticks
pub const THIRTY_DAY_SCALE_BREAKPOINT: f64 = 90.0;
/// More than this many visible days switches to quarterly ticks
pub const YEAR_SCALE_BREAKPOINT: f64 = 280.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisScale {
    Day,
    Week,
    ThirtyDay,
    Year,
}

/// Tick spacing and label format for the date axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisGranularity {
    pub scale: AxisScale,
    pub minor_step_days: u32,
    pub major_step_days: u32,
    /// `chrono` format string for major tick labels
    pub label_format: &'static str,
}

impl AxisScale {
    pub fn granularity(self) -> AxisGranularity {
        let (minor_step_days, major_step_days, label_format) = match self {
            AxisScale::Day => (1, 1, "%-m/%-d"),
            AxisScale::Week => (1, 7, "%-m/%-d"),
            AxisScale::ThirtyDay => (7, 30, "%b %-d"),
            AxisScale::Year => (30, 90, "%b"),
        };

        AxisGranularity {
            scale: self,
            minor_step_days,
            major_step_days,
            label_format,
        }
    }
}

impl AxisGranularity {
    pub fn format_label(&self, date: NaiveDate) -> String {
        date.format(self.label_format).to_string()
    }
}

/// Pick tick granularity for the number of days currently visible.
///
/// Re-evaluate whenever the visible span changes, e.g. on zoom.
pub fn axis_granularity(visible_day_span: f64) -> AxisGranularity {
    let scale = if visible_day_span > YEAR_SCALE_BREAKPOINT {
        AxisScale::Year
    } else if visible_day_span > THIRTY_DAY_SCALE_BREAKPOINT {
        AxisScale::ThirtyDay
    } else if visible_day_span > WEEK_SCALE_BREAKPOINT {
        AxisScale::Week
    } else {
        AxisScale::Day
    };

    scale.granularity()
}
