use crate::error::{config_error, BotResult};
use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone,
    Utc,
};
use chrono_tz::Tz;

/// Time zone used to decide what "today" means for the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestZone {
    /// The host's local time zone
    #[default]
    Local,
    /// An IANA time zone such as `Europe/Helsinki`
    Named(Tz),
}

/// Inclusive bounds of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DayBounds {
    /// Lower bound in the RFC 3339 form the Calendar API expects
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Upper bound in the RFC 3339 form the Calendar API expects
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl DigestZone {
    /// Parse a zone name; empty or `local` selects the host zone
    pub fn parse(name: &str) -> BotResult<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(DigestZone::Local);
        }
        name.parse::<Tz>()
            .map(DigestZone::Named)
            .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
    }

    /// Current calendar date in this zone
    pub fn today(&self) -> NaiveDate {
        match self {
            DigestZone::Local => Local::now().date_naive(),
            DigestZone::Named(tz) => Utc::now().with_timezone(tz).date_naive(),
        }
    }

    /// Midnight to 23:59:59 of `date` in this zone
    pub fn day_bounds(&self, date: NaiveDate) -> BotResult<DayBounds> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| config_error("Failed to create start of day"))?;
        let end = date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| config_error("Failed to create end of day"))?;

        let (start, end) = match self {
            DigestZone::Local => (resolve(&Local, start), resolve(&Local, end)),
            DigestZone::Named(tz) => (resolve(tz, start), resolve(tz, end)),
        };

        match (start, end) {
            (Some(start), Some(end)) => Ok(DayBounds { start, end }),
            _ => Err(config_error(&format!("Cannot resolve local day {} in time zone", date))),
        }
    }
}

/// Map a wall-clock time to an instant, skipping forward over a DST gap
fn resolve<Z: TimeZone>(tz: &Z, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.fixed_offset())
}
