//! SVG implementation of [`DrawingSurface`], for server-side previews and
//! snapshot tests.

use std::fmt::Write as _;

use super::surface::{DrawingSurface, Stroke};
use crate::models::chart::PixelPoint;

/// Accumulates drawing calls as SVG elements.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements drawn since the last `clear`.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.body.lines().count()
    }

    /// Complete SVG document.
    #[must_use]
    pub fn finish(&self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 128);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

impl DrawingSurface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn stroke_polyline(&mut self, points: &[PixelPoint], stroke: &Stroke) {
        if points.is_empty() {
            return;
        }
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let prefix = if i == 0 { "M" } else { " L" };
            let _ = write!(d, "{} {:.2},{:.2}", prefix, p.x, p.y);
        }
        let _ = writeln!(
            self.body,
            r#"<path d="{}" stroke="{}" stroke-width="{}" fill="none"/>"#,
            d,
            escape_attr(&stroke.color),
            stroke.width
        );
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, color: &str) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
            center.x,
            center.y,
            radius,
            escape_attr(color)
        );
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
