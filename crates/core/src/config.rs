use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;
use crate::models::chart::{ChartFrame, Margins};
use crate::services::chart_service::MAX_WINDOW_DAYS;

pub const DEFAULT_API_BASE_URL: &str = "https://foodyback-production.up.railway.app";

/// Environment variables with this prefix override file values,
/// e.g. `FOODY_API_BASE_URL`, `FOODY_IMAGE__MAX_SIDE`.
pub const ENV_PREFIX: &str = "FOODY";

/// Runtime configuration of the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the merchant REST API, without trailing slash
    pub api_base_url: String,

    /// HTTP client timeout (native targets only)
    pub request_timeout_secs: u64,

    pub image: ImageSettings,

    pub chart: ChartSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            image: ImageSettings::default(),
            chart: ChartSettings::default(),
        }
    }
}

/// Upload photo preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Longest side after normalization
    pub max_side: u32,
    /// Encoder quality, 0.0–1.0
    pub quality: f32,
    /// Inputs above this size are rejected before decoding
    pub max_input_bytes: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_side: 1600,
            quality: 0.85,
            max_input_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Stats chart canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    /// Minimum visible history on the time axis
    pub window_days: i64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            margins: Margins::default(),
            window_days: 7,
        }
    }
}

impl ChartSettings {
    pub fn frame(&self) -> ChartFrame {
        ChartFrame::new(self.width, self.height).with_margins(self.margins)
    }
}

impl DashboardConfig {
    /// Load from an optional file (format by extension: toml, json, yaml…)
    /// layered under `FOODY_*` environment variables, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: DashboardConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(api_base_url = %loaded.api_base_url, "dashboard config loaded");
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url must not be empty".into()));
        }
        if self.image.max_side == 0 {
            return Err(CoreError::Config("image.max_side must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.image.quality) {
            return Err(CoreError::Config(format!(
                "image.quality {} out of range (expected 0.0..=1.0)",
                self.image.quality
            )));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.chart.window_days) {
            return Err(CoreError::Config(format!(
                "chart.window_days {} out of range (expected 1..={MAX_WINDOW_DAYS})",
                self.chart.window_days
            )));
        }
        let frame = self.chart.frame();
        if frame.plot_width() <= 0.0 || frame.plot_height() <= 0.0 {
            return Err(CoreError::Config(format!(
                "chart {}x{} leaves no room inside its margins",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
