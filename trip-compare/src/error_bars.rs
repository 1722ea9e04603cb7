//! Asymmetric error bars, drawn over a horizontal bar chart after it renders. The chart itself
//! belongs to the host; it hands over where each bar ended up, and this issues the extra strokes.

use serde::{Deserialize, Serialize};

use trip_compare_model::Co2Interval;

use crate::chart::average;

/// Whiskers extend this many pixels above and below the bar's center.
pub const WHISKER_HALF_HEIGHT: f64 = 4.0;
pub const WHISKER_LINE_WIDTH: f64 = 2.0;

/// Distances below and above a bar's value, in data units. Never negative.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ErrorBar {
    pub minus: f64,
    pub plus: f64,
}

impl ErrorBar {
    pub fn from_interval(interval: Co2Interval) -> ErrorBar {
        let average = average(interval);
        // f64::max also turns NaN into 0
        ErrorBar {
            minus: (average - interval.low).max(0.0),
            plus: (interval.high - average).max(0.0),
        }
    }
}

/// One dataset of the chart. Only datasets carrying `error_bars` get whiskers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
    pub error_bars: Option<Vec<Option<ErrorBar>>>,
    pub hidden: bool,
    pub border_color: String,
}

/// Where the chart drew a bar of the primary series. `y` is the pixel center of its category.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub y: f64,
}

pub trait ValueScale {
    /// May return a non-finite value for a degenerate axis.
    fn pixel_for_value(&self, value: f64) -> f64;
}

/// Maps `min..max` onto the pixels `left..right`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LinearAxis {
    pub min: f64,
    pub max: f64,
    pub left: f64,
    pub right: f64,
}

impl ValueScale for LinearAxis {
    fn pixel_for_value(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return f64::NAN;
        }
        self.left + (value - self.min) / span * (self.right - self.left)
    }
}

pub type Segment = [[f64; 2]; 2];

pub trait Canvas {
    /// Strokes all segments as one path.
    fn stroke_segments(&mut self, color: &str, line_width: f64, segments: &[Segment]);
}

/// Records what would've been drawn.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub color: String,
    pub line_width: f64,
    pub segments: Vec<Segment>,
}

impl Canvas for Vec<DrawCall> {
    fn stroke_segments(&mut self, color: &str, line_width: f64, segments: &[Segment]) {
        self.push(DrawCall {
            color: color.to_string(),
            line_width,
            segments: segments.to_vec(),
        });
    }
}

impl Canvas for web_sys::CanvasRenderingContext2d {
    fn stroke_segments(&mut self, color: &str, line_width: f64, segments: &[Segment]) {
        self.save();
        self.set_stroke_style_str(color);
        self.set_line_width(line_width);
        self.begin_path();
        for [from, to] in segments {
            self.move_to(from[0], from[1]);
            self.line_to(to[0], to[1]);
        }
        self.stroke();
        self.restore();
    }
}

/// The post-draw hook. For every bar of the primary series, finds the first visible dataset with
/// error bars and draws a horizontal interval with whisker caps at the bar's center. Bars without
/// data or with a degenerate position are skipped. Returns how many error bars were drawn.
pub fn draw_error_bars<S: ValueScale, C: Canvas>(
    bars: &[BarGeometry],
    series: &[ChartSeries],
    scale: &S,
    canvas: &mut C,
) -> usize {
    let mut drawn = 0;
    for (idx, bar) in bars.iter().enumerate() {
        if let Some((color, segments)) = error_bar_segments(idx, bar, series, scale) {
            canvas.stroke_segments(color, WHISKER_LINE_WIDTH, &segments);
            drawn += 1;
        }
    }
    drawn
}

fn error_bar_segments<'a, S: ValueScale>(
    idx: usize,
    bar: &BarGeometry,
    series: &'a [ChartSeries],
    scale: &S,
) -> Option<(&'a str, [Segment; 3])> {
    let dataset = series
        .iter()
        .find(|s| !s.hidden && s.error_bars.is_some())?;
    let value = (*dataset.values.get(idx)?)?;
    let error_bar = (*dataset.error_bars.as_ref()?.get(idx)?)?;

    let x = scale.pixel_for_value(value);
    if !x.is_finite() || x <= 0.0 {
        return None;
    }
    let left = scale.pixel_for_value(value - error_bar.minus);
    let right = scale.pixel_for_value(value + error_bar.plus);
    let y = bar.y;
    if !left.is_finite() || !right.is_finite() || !y.is_finite() {
        return None;
    }

    let top = y - WHISKER_HALF_HEIGHT;
    let bottom = y + WHISKER_HALF_HEIGHT;
    Some((
        dataset.border_color.as_str(),
        [
            [[left, y], [right, y]],
            [[left, top], [left, bottom]],
            [[right, top], [right, bottom]],
        ],
    ))
}
