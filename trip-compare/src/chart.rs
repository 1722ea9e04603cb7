use log::warn;
use serde::Serialize;

use trip_compare_model::{Co2Interval, SummaryEntry};

use crate::error_bars::{ChartSeries, ErrorBar};

/// The value axis always lists these, in this order, even when a mode has no data.
pub const CATEGORY_LABELS: [&str; 6] = [
    "flight",
    "train (electric)",
    "bus",
    "car (2p,diesel)",
    "car (2p,petrol)",
    "car(2p,electric)",
];

pub const SERIES_LABEL: &str = "CO2 / pax";
pub const BAR_COLOR: &str = "orange";
pub const BAR_HOVER_COLOR: &str = "darkorange";
pub const BAR_BORDER_COLOR: &str = "red";

/// A horizontal bar chart of CO2 per passenger, one bar per summary entry.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EmissionsChart {
    pub labels: Vec<String>,
    /// The middle of each CO2 interval. `None` for modes without data.
    pub averages: Vec<Option<f64>>,
    pub error_bars: Vec<Option<ErrorBar>>,
    /// Large enough for the upper whisker, not just the bar. `None` when there are no bars.
    pub suggested_max: Option<f64>,
    /// The value axis starts at 0 kg, not at the smallest bar
    pub begin_at_zero: bool,
    pub categories: Vec<&'static str>,
    pub background_color: &'static str,
    pub hover_background_color: &'static str,
    pub border_color: &'static str,
}

impl EmissionsChart {
    pub fn from_summary(summary: &[SummaryEntry]) -> EmissionsChart {
        let mut labels = Vec::new();
        let mut averages = Vec::new();
        let mut error_bars = Vec::new();
        let mut suggested_max: Option<f64> = None;

        for entry in summary {
            labels.push(entry.mode.clone());
            match entry.co2 {
                Some(interval) => {
                    if interval.low > interval.high {
                        warn!(
                            "CO2 interval for {} is backwards: [{}, {}]",
                            entry.mode, interval.low, interval.high
                        );
                    }
                    let average = average(interval);
                    let error_bar = ErrorBar::from_interval(interval);
                    let top = average + error_bar.plus;
                    if top.is_finite() {
                        suggested_max = Some(suggested_max.map_or(top, |max| max.max(top)));
                    }
                    averages.push(Some(average));
                    error_bars.push(Some(error_bar));
                }
                None => {
                    averages.push(None);
                    error_bars.push(None);
                }
            }
        }

        EmissionsChart {
            labels,
            averages,
            error_bars,
            suggested_max,
            begin_at_zero: true,
            categories: CATEGORY_LABELS.to_vec(),
            background_color: BAR_COLOR,
            hover_background_color: BAR_HOVER_COLOR,
            border_color: BAR_BORDER_COLOR,
        }
    }

    /// The one dataset the chart draws, annotated with its error bars.
    pub fn series(&self) -> ChartSeries {
        ChartSeries {
            label: SERIES_LABEL.to_string(),
            values: self.averages.clone(),
            error_bars: Some(self.error_bars.clone()),
            hidden: false,
            border_color: self.border_color.to_string(),
        }
    }
}

pub fn average(interval: Co2Interval) -> f64 {
    (interval.low + interval.high) / 2.0
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SummaryRow {
    pub mode: String,
    pub co2: String,
    pub time: String,
}

pub fn summary_table(summary: &[SummaryEntry]) -> Vec<SummaryRow> {
    summary
        .iter()
        .map(|entry| SummaryRow {
            mode: entry.mode.clone(),
            co2: match entry.co2 {
                Some(interval) => format!("{} - {} kg", interval.low, interval.high),
                None => "N/A".to_string(),
            },
            time: format_time(entry.time),
        })
        .collect()
}

/// Like "05h00". Rounds to the nearest minute.
pub fn format_time(minutes: Option<f64>) -> String {
    match minutes {
        Some(minutes) if minutes.is_finite() && minutes >= 0.0 => {
            let minutes = minutes.round() as u64;
            format!("{:02}h{:02}", minutes / 60, minutes % 60)
        }
        _ => "N/A".to_string(),
    }
}
