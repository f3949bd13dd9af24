use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A validated location. Coordinates are range-checked and both timestamps
/// describe the same instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    pub device_id: String,
    pub alias: String,
    pub latitude: f64,
    pub longitude: f64,
    pub datetime_local: DateTime<FixedOffset>,
    pub datetime_utc: DateTime<Utc>,
    pub datetime_original: String,
}
