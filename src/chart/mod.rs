//! Trend chart rendering.
//!
//! Turns a dated series into a standalone SVG line chart:
//! - time axis with one month-day tick per point
//! - value axis with headroom above the largest value and unit-suffixed ticks
//! - monotone curve, filled area, a marker and exact-value label per point

pub mod curve;
pub mod scale;
pub mod svg;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::delta::{self, UsagePoint};
use crate::history::{History, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: u64,
}

impl From<UsagePoint> for ChartPoint {
    fn from(p: UsagePoint) -> Self {
        ChartPoint { date: p.date, value: p.consumed }
    }
}

impl From<Snapshot> for ChartPoint {
    fn from(s: Snapshot) -> Self {
        ChartPoint { date: s.date, value: s.remaining }
    }
}

/// Which quantity the chart plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSeries {
    /// Per-period consumption.
    #[default]
    Consumed,
    /// Raw remaining quota.
    Remaining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 40.0,
            right: 60.0,
            bottom: 60.0,
            left: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
    /// Value axis ceiling is at least `max * headroom_factor`.
    pub headroom_factor: f64,
    pub value_ticks: usize,
    /// Above this many points the date axis labels every n-th point.
    pub max_date_ticks: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            width: 1000.0,
            height: 400.0,
            margin: Margins::default(),
            headroom_factor: 1.2,
            value_ticks: 5,
            max_date_ticks: 31,
        }
    }
}

impl Layout {
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

pub struct ChartText {
    pub title: String,
    pub unit_label: String,
}

/// The most recent `window` points of the chosen series.
pub fn series(history: &History, kind: ChartSeries, window: usize) -> Vec<ChartPoint> {
    match kind {
        ChartSeries::Consumed => {
            let points = delta::derive(history);
            delta::window(&points, window).iter().copied().map(ChartPoint::from).collect()
        }
        ChartSeries::Remaining => {
            let skip = history.len().saturating_sub(window);
            history.snapshots().skip(skip).map(ChartPoint::from).collect()
        }
    }
}

pub fn render(points: &[ChartPoint], layout: &Layout, text: &ChartText) -> String {
    svg::render(points, layout, text)
}
