use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Space reserved around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 16.0,
            right: 16.0,
            top: 24.0,
            bottom: 24.0,
        }
    }
}

/// A fixed-size canvas the chart is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margins: Margins,
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            margins: Margins::default(),
        }
    }
}

impl ChartFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Horizontal extent of the plot area.
    #[must_use]
    pub fn plot_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    /// Vertical extent of the plot area.
    #[must_use]
    pub fn plot_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// y coordinate of the value-axis zero line.
    #[must_use]
    pub fn baseline_y(&self) -> f64 {
        self.height - self.margins.bottom
    }
}

/// Visible data range of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min_x: DateTime<Utc>,
    pub max_x: DateTime<Utc>,
    pub min_y: f64,
    pub max_y: f64,
}

impl Domain {
    /// Time span in milliseconds.
    #[must_use]
    pub fn x_span_millis(&self) -> i64 {
        (self.max_x - self.min_x).num_milliseconds()
    }

    #[must_use]
    pub fn y_span(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A canvas coordinate. y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Everything a drawing surface needs to render one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub domain: Domain,

    /// Value-axis zero line, left to right
    pub baseline: (PixelPoint, PixelPoint),

    /// Projected points in input order
    pub points: Vec<PixelPoint>,
}

impl ChartLayout {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
