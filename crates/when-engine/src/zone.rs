//! Timezone resolution and the zoned-instant type everything else operates on.
//!
//! A [`ZoneResolver`] maps free-form tokens (IANA identifiers, common
//! abbreviations, "local") to a concrete [`Zone`]. The abbreviation table is
//! deliberately lossy: one abbreviation can name several real zones and the
//! table picks one, so it is a constructor-injectable default rather than a
//! correctness guarantee.

use std::collections::HashMap;

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Utc, Weekday,
};
use chrono_tz::Tz;

use crate::error::{Result, WhenError};

/// Default abbreviation → canonical zone table.
///
/// One abbreviation, one zone: "CST" here means US Central even though it is
/// also China Standard Time. Override via [`ZoneResolver::with_aliases`] when
/// that default is wrong for your users.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("PACIFIC", "America/Los_Angeles"),
    ("PT", "America/Los_Angeles"),
    ("PDT", "America/Los_Angeles"),
    ("PST", "America/Los_Angeles"),
    ("MOUNTAIN", "America/Denver"),
    ("MT", "America/Denver"),
    ("MDT", "America/Denver"),
    ("MST", "America/Denver"),
    ("CENTRAL", "America/Chicago"),
    ("CT", "America/Chicago"),
    ("CDT", "America/Chicago"),
    ("CST", "America/Chicago"),
    ("EASTERN", "America/New_York"),
    ("ET", "America/New_York"),
    ("EDT", "America/New_York"),
    ("EST", "America/New_York"),
    ("BST", "Europe/London"),
    ("CET", "Europe/Berlin"),
    ("CEST", "Europe/Berlin"),
    ("CEDT", "Europe/Berlin"),
    ("IST", "Asia/Kolkata"),
];

/// Synonyms for "the machine's own zone", matched case-insensitively.
const LOCAL_SYNONYMS: &[&str] = &["local", "localtz", "tzlocal", "localzone"];

/// A display timezone: either a canonical IANA zone or an unidentified fixed
/// UTC offset (inputs like `2021-05-15T20:01:46+02:30` carry an offset that
/// names no zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    /// Interpret a zone-less wall-clock time in this zone.
    ///
    /// Returns `None` when the wall time does not exist or exists twice in
    /// this zone (DST gap / fold); callers surface that as an error rather
    /// than guessing.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<Instant> {
        match self {
            Zone::Named(tz) => tz
                .from_local_datetime(&naive)
                .single()
                .map(|dt| Instant::new(dt.with_timezone(&Utc), *self)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| Instant::new(dt.with_timezone(&Utc), *self)),
        }
    }
}

/// An absolute point in time together with the zone it is viewed in.
///
/// Every instant that reaches the display composer is zone-aware; zone-less
/// values exist only transiently inside the parsing cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instant {
    utc: DateTime<Utc>,
    zone: Zone,
}

impl Instant {
    pub fn new(utc: DateTime<Utc>, zone: Zone) -> Self {
        Self { utc, zone }
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// The same absolute instant viewed in another zone.
    pub fn in_zone(&self, zone: Zone) -> Self {
        Self::new(self.utc, zone)
    }

    /// Wall-clock date and time in the viewing zone.
    pub fn local_naive(&self) -> NaiveDateTime {
        match self.zone {
            Zone::Named(tz) => self.utc.with_timezone(&tz).naive_local(),
            Zone::Fixed(offset) => self.utc.with_timezone(&offset).naive_local(),
        }
    }

    /// Weekday of the wall-clock date in the viewing zone.
    pub fn weekday(&self) -> Weekday {
        self.local_naive().weekday()
    }

    /// UTC offset of the viewing zone at this instant.
    pub fn fixed_offset(&self) -> FixedOffset {
        match self.zone {
            Zone::Named(tz) => self.utc.with_timezone(&tz).offset().fix(),
            Zone::Fixed(offset) => offset,
        }
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.utc.timestamp()
    }

    /// RFC 3339 with millisecond precision and numeric offset, in the
    /// viewing zone (`2021-05-15T13:01:46.000-07:00`).
    pub fn to_rfc3339_millis(&self) -> String {
        match self.zone {
            Zone::Named(tz) => self
                .utc
                .with_timezone(&tz)
                .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
                .to_string(),
            Zone::Fixed(offset) => self
                .utc
                .with_timezone(&offset)
                .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
                .to_string(),
        }
    }

    /// Zone abbreviation when one exists, otherwise the offset label.
    ///
    /// A fixed offset of exactly zero reads "UTC": with an offset-only zone
    /// at +00:00 that is what was meant nearly every time.
    pub fn zone_label(&self) -> String {
        match self.zone {
            Zone::Named(tz) => self.utc.with_timezone(&tz).format("%Z").to_string(),
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            Zone::Fixed(offset) => self.utc.with_timezone(&offset).format("%z").to_string(),
        }
    }

    /// The (label, offset) pair that decides whether two display zones are
    /// currently indistinguishable.
    pub fn fingerprint(&self) -> ZoneFingerprint {
        ZoneFingerprint {
            label: self.zone_label(),
            offset_seconds: self.fixed_offset().local_minus_utc(),
        }
    }

    /// Shift by an exact duration, staying in the same viewing zone.
    pub fn checked_shift(&self, delta: TimeDelta) -> Option<Self> {
        self.utc
            .checked_add_signed(delta)
            .map(|utc| Self::new(utc, self.zone))
    }

    /// Move the wall-clock calendar by whole days in the viewing zone.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        let step = Days::new(days.unsigned_abs());
        match self.zone {
            Zone::Named(tz) => {
                let local = self.utc.with_timezone(&tz);
                let shifted = if days >= 0 {
                    local.checked_add_days(step)?
                } else {
                    local.checked_sub_days(step)?
                };
                Some(Self::new(shifted.with_timezone(&Utc), self.zone))
            }
            Zone::Fixed(offset) => {
                let local = self.utc.with_timezone(&offset);
                let shifted = if days >= 0 {
                    local.checked_add_days(step)?
                } else {
                    local.checked_sub_days(step)?
                };
                Some(Self::new(shifted.with_timezone(&Utc), self.zone))
            }
        }
    }

    /// Move the wall-clock calendar by whole months in the viewing zone,
    /// clamping the day of month (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(&self, months: i32) -> Option<Self> {
        let step = Months::new(months.unsigned_abs());
        match self.zone {
            Zone::Named(tz) => {
                let local = self.utc.with_timezone(&tz);
                let shifted = if months >= 0 {
                    local.checked_add_months(step)?
                } else {
                    local.checked_sub_months(step)?
                };
                Some(Self::new(shifted.with_timezone(&Utc), self.zone))
            }
            Zone::Fixed(offset) => {
                let local = self.utc.with_timezone(&offset);
                let shifted = if months >= 0 {
                    local.checked_add_months(step)?
                } else {
                    local.checked_sub_months(step)?
                };
                Some(Self::new(shifted.with_timezone(&Utc), self.zone))
            }
        }
    }
}

/// Identity of a display zone at one instant: abbreviation-or-offset label
/// plus UTC offset. Two zones with equal fingerprints render identically and
/// only the first is shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneFingerprint {
    pub label: String,
    pub offset_seconds: i32,
}

/// Free-form token → [`Zone`] lookup. Built once, read-only afterwards.
pub struct ZoneResolver {
    aliases: HashMap<String, Tz>,
    local: Tz,
}

impl ZoneResolver {
    /// Resolver with the [`DEFAULT_ALIASES`] table.
    pub fn new() -> Self {
        Self::with_aliases(DEFAULT_ALIASES)
    }

    /// Resolver with a caller-supplied abbreviation table. Pairs whose
    /// canonical name is not a valid IANA identifier are dropped.
    pub fn with_aliases(pairs: &[(&str, &str)]) -> Self {
        let aliases = pairs
            .iter()
            .filter_map(|(abbr, canonical)| {
                canonical
                    .parse::<Tz>()
                    .ok()
                    .map(|tz| (abbr.to_uppercase(), tz))
            })
            .collect();
        Self {
            aliases,
            local: detect_local_zone(),
        }
    }

    /// The machine's own zone.
    pub fn local_zone(&self) -> Zone {
        Zone::Named(self.local)
    }

    /// Resolve a token: local-zone synonyms, then the abbreviation table,
    /// then a direct IANA identifier parse.
    pub fn resolve(&self, token: &str) -> Result<Zone> {
        let trimmed = token.trim();
        if LOCAL_SYNONYMS.contains(&trimmed.to_lowercase().as_str()) {
            return Ok(self.local_zone());
        }
        if let Some(tz) = self.aliases.get(&trimmed.to_uppercase()) {
            return Ok(Zone::Named(*tz));
        }
        trimmed
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| WhenError::UnknownTimezone(trimmed.to_string()))
    }
}

impl Default for ZoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// IANA name of the system zone, falling back to UTC when detection fails.
fn detect_local_zone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}
