use crate::models::chart::{ChartFrame, ChartLayout, PixelPoint};

/// Line color and width.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

/// Colors and sizes of the stats chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub baseline: Stroke,
    pub line: Stroke,
    pub marker_color: String,
    pub marker_radius: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            baseline: Stroke::new("rgba(180,200,220,.15)", 1.0),
            line: Stroke::new("#4ab5f1", 2.0),
            marker_color: "#61d39f".to_string(),
            marker_radius: 3.0,
        }
    }
}

/// A canvas-like target. Implementations own the actual pixels.
pub trait DrawingSurface {
    /// Reset the surface to an empty `width × height` canvas.
    fn clear(&mut self, width: f64, height: f64);

    /// Stroke a connected path through `points`.
    fn stroke_polyline(&mut self, points: &[PixelPoint], stroke: &Stroke);

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: &str);
}

/// Draw a projected layout: clear, baseline, line through the points,
/// then one marker per point, all in input order.
pub fn render_chart<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    layout: &ChartLayout,
    frame: &ChartFrame,
    style: &ChartStyle,
) {
    surface.clear(frame.width, frame.height);

    let (start, end) = layout.baseline;
    surface.stroke_polyline(&[start, end], &style.baseline);

    if layout.points.is_empty() {
        return;
    }

    surface.stroke_polyline(&layout.points, &style.line);
    for point in &layout.points {
        surface.fill_circle(*point, style.marker_radius, &style.marker_color);
    }
}
