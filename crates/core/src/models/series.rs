use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (timestamp, value) sample of a stats series.
///
/// On the wire this is `{ "x": "<ISO-8601>", "y": <number> }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(rename = "x")]
    pub timestamp: DateTime<Utc>,

    /// Expected to be non-negative
    #[serde(rename = "y")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Body of the stats endpoint. A missing `points` array is an empty series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub points: Vec<SeriesPoint>,
}
