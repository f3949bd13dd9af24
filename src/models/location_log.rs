use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::NormalizedLocation;

/// One line of a day log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    #[serde(flatten)]
    pub location: NormalizedLocation,
    pub received_at_utc: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(location: NormalizedLocation, received_at_utc: DateTime<Utc>) -> Self {
        Self { location, received_at_utc }
    }
}
