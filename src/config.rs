use std::env;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

pub const DEFAULT_LOG_DIR: &str = "data/locations";
pub const DEFAULT_TIMEZONE: &str = "America/Guayaquil";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Windows zone names some clients still send, mapped to their IANA zone.
const PLATFORM_ALIASES: &[(&str, &str)] = &[
    ("SA Pacific Standard Time", "America/Bogota"),
    ("SA Western Standard Time", "America/La_Paz"),
    ("SA Eastern Standard Time", "America/Cayenne"),
    ("Argentina Standard Time", "America/Argentina/Buenos_Aires"),
    ("Pacific SA Standard Time", "America/Santiago"),
    ("Central America Standard Time", "America/Guatemala"),
    ("Eastern Standard Time", "America/New_York"),
    ("Central Standard Time", "America/Chicago"),
    ("Mountain Standard Time", "America/Denver"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("GMT Standard Time", "Europe/London"),
    ("Romance Standard Time", "Europe/Paris"),
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("UTC", "Etc/UTC"),
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_dir: PathBuf,
    pub timezone: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let log_dir = value("LOCATION_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());
        let timezone = value("REFERENCE_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let host = value("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = value("PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            log_dir: PathBuf::from(log_dir),
            timezone,
            host,
            port,
        }
    }

    pub fn reference_zone(&self) -> ReferenceZone {
        ReferenceZone::resolve(&self.timezone)
    }
}

/// The one zone every naive incoming timestamp is read in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceZone {
    Named(Tz),
    /// Last resort when the configured id can't be resolved.
    HostLocal,
}

impl ReferenceZone {
    /// IANA id first, then the platform alias table, then the host zone.
    pub fn resolve(id: &str) -> Self {
        let id = id.trim();
        if let Ok(tz) = id.parse::<Tz>() {
            info!("Reference timezone: {}", tz.name());
            return ReferenceZone::Named(tz);
        }

        let alias = PLATFORM_ALIASES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(id))
            .and_then(|(_, iana)| iana.parse::<Tz>().ok());
        if let Some(tz) = alias {
            info!("Reference timezone: {} (resolved from alias '{}')", tz.name(), id);
            return ReferenceZone::Named(tz);
        }

        warn!(
            "Unknown timezone '{}', falling back to host local time",
            id
        );
        ReferenceZone::HostLocal
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReferenceZone::HostLocal)
    }

    pub fn name(&self) -> String {
        match self {
            ReferenceZone::Named(tz) => tz.name().to_string(),
            ReferenceZone::HostLocal => "host-local".to_string(),
        }
    }

    /// Reads `naive` as wall-clock time in this zone. A folded time picks the
    /// earlier instant; a skipped time has no answer.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            ReferenceZone::Named(tz) => pin(tz, naive),
            ReferenceZone::HostLocal => pin(&Local, naive),
        }
    }

    /// Re-expresses an instant on this zone's wall clock.
    pub fn wall_clock(&self, instant: &DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            ReferenceZone::Named(tz) => fixed(instant.with_timezone(tz)),
            ReferenceZone::HostLocal => fixed(instant.with_timezone(&Local)),
        }
    }
}

fn pin<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(fixed(dt)),
        LocalResult::Ambiguous(earlier, _) => Some(fixed(earlier)),
        LocalResult::None => None,
    }
}

fn fixed<Z: TimeZone>(dt: DateTime<Z>) -> DateTime<FixedOffset> {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}
