use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::models::chart::{ChartFrame, ChartLayout, Domain, PixelPoint};
use crate::models::series::SeriesPoint;

/// Default minimum history shown on the time axis.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Longest accepted window (about a century).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Maps a stats series onto a fixed-size canvas.
///
/// Every coordinate is computed here; a drawing surface only walks the
/// result in order. The visible domain always covers at least
/// `[now − window, now] × [0, 1]`, so empty, constant and single-point series
/// still produce a usable frame.
pub struct ChartProjector {
    window: TimeDelta,
}

impl ChartProjector {
    pub fn new() -> Self {
        Self::with_window_days(DEFAULT_WINDOW_DAYS)
    }

    /// `days` is clamped to `0..=MAX_WINDOW_DAYS`.
    pub fn with_window_days(days: i64) -> Self {
        let window = TimeDelta::try_days(days.clamp(0, MAX_WINDOW_DAYS)).unwrap_or_default();
        Self { window }
    }

    /// Visible range for `points` as of the current clock.
    pub fn domain(&self, points: &[SeriesPoint]) -> Domain {
        self.domain_at(points, Utc::now())
    }

    /// Visible range for `points` as of `now`.
    ///
    /// - `min_x = min(timestamps ∪ {now − window})`
    /// - `max_x = max(timestamps ∪ {now})`
    /// - `min_y = 0`, `max_y = max(1, values…)`
    pub fn domain_at(&self, points: &[SeriesPoint], now: DateTime<Utc>) -> Domain {
        let floor = now
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let (min_x, max_x, max_y) = points.iter().fold(
            (floor, now, 1.0_f64),
            |(lo, hi, top), p| (lo.min(p.timestamp), hi.max(p.timestamp), top.max(p.value)),
        );
        Domain {
            min_x,
            max_x,
            min_y: 0.0,
            max_y,
        }
    }

    /// Pixel coordinates for `points` as of the current clock.
    pub fn project(&self, points: &[SeriesPoint], frame: &ChartFrame) -> Vec<PixelPoint> {
        self.project_at(points, frame, Utc::now())
    }

    /// Pixel coordinates for `points`, in input order.
    pub fn project_at(
        &self,
        points: &[SeriesPoint],
        frame: &ChartFrame,
        now: DateTime<Utc>,
    ) -> Vec<PixelPoint> {
        let domain = self.domain_at(points, now);
        points.iter().map(|p| map_point(p, &domain, frame)).collect()
    }

    /// Domain, baseline and projected points in one pass.
    pub fn layout(
        &self,
        points: &[SeriesPoint],
        frame: &ChartFrame,
        now: DateTime<Utc>,
    ) -> ChartLayout {
        if points.is_empty() {
            debug!("empty series, drawing baseline only");
        }
        let domain = self.domain_at(points, now);
        let baseline_y = frame.baseline_y();
        ChartLayout {
            domain,
            baseline: (
                PixelPoint::new(frame.margins.left, baseline_y),
                PixelPoint::new(frame.width - frame.margins.right, baseline_y),
            ),
            points: points.iter().map(|p| map_point(p, &domain, frame)).collect(),
        }
    }
}

impl Default for ChartProjector {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear, axis-independent mapping. A zero-width span counts as 1.
pub fn map_point(point: &SeriesPoint, domain: &Domain, frame: &ChartFrame) -> PixelPoint {
    let span_x = nonzero(domain.x_span_millis() as f64);
    let span_y = nonzero(domain.y_span());

    let t = (point.timestamp - domain.min_x).num_milliseconds() as f64;
    let x = frame.margins.left + frame.plot_width() * (t / span_x);
    let y = frame.baseline_y() - frame.plot_height() * ((point.value - domain.min_y) / span_y);

    PixelPoint::new(x, y)
}

fn nonzero(span: f64) -> f64 {
    if span == 0.0 {
        1.0
    } else {
        span
    }
}
