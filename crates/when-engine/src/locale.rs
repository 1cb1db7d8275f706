//! Locale-aware clock rendering for display zones.
//!
//! A timezone is usually shared by many locales, but each zone still has a
//! historically primary territory, and that territory's dominant language
//! settles the 12h/24h question. The two lookup tables below are a compiled-in
//! snapshot of the tzdata `zone.tab` country column and the CLDR long-form
//! time conventions; zones missing from the snapshot fall back to a 24-hour
//! clock.

use chrono::Timelike;
use chrono_tz::Tz;

use crate::zone::{Instant, Zone};

/// How much of the calendar date to render alongside the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `May 15, 2021 …`
    Long,
    /// `May 15 …`, used when the year is obvious from context.
    Short,
    /// Time only, used when every displayed zone shares one calendar date.
    None,
}

/// Historically primary territory (ISO 3166 alpha-2) per zone.
const ZONE_TERRITORY: &[(&str, &str)] = &[
    ("America/Anchorage", "US"),
    ("America/Argentina/Buenos_Aires", "AR"),
    ("America/Bogota", "CO"),
    ("America/Chicago", "US"),
    ("America/Denver", "US"),
    ("America/Halifax", "CA"),
    ("America/Lima", "PE"),
    ("America/Los_Angeles", "US"),
    ("America/Mexico_City", "MX"),
    ("America/New_York", "US"),
    ("America/Phoenix", "US"),
    ("America/Santiago", "CL"),
    ("America/Sao_Paulo", "BR"),
    ("America/Toronto", "CA"),
    ("America/Vancouver", "CA"),
    ("Africa/Cairo", "EG"),
    ("Africa/Johannesburg", "ZA"),
    ("Africa/Lagos", "NG"),
    ("Africa/Nairobi", "KE"),
    ("Asia/Bangkok", "TH"),
    ("Asia/Dhaka", "BD"),
    ("Asia/Dubai", "AE"),
    ("Asia/Hong_Kong", "HK"),
    ("Asia/Jakarta", "ID"),
    ("Asia/Jerusalem", "IL"),
    ("Asia/Karachi", "PK"),
    ("Asia/Kolkata", "IN"),
    ("Asia/Kuala_Lumpur", "MY"),
    ("Asia/Manila", "PH"),
    ("Asia/Riyadh", "SA"),
    ("Asia/Seoul", "KR"),
    ("Asia/Shanghai", "CN"),
    ("Asia/Singapore", "SG"),
    ("Asia/Taipei", "TW"),
    ("Asia/Tehran", "IR"),
    ("Asia/Tokyo", "JP"),
    ("Australia/Brisbane", "AU"),
    ("Australia/Melbourne", "AU"),
    ("Australia/Perth", "AU"),
    ("Australia/Sydney", "AU"),
    ("Europe/Amsterdam", "NL"),
    ("Europe/Athens", "GR"),
    ("Europe/Berlin", "DE"),
    ("Europe/Brussels", "BE"),
    ("Europe/Bucharest", "RO"),
    ("Europe/Copenhagen", "DK"),
    ("Europe/Dublin", "IE"),
    ("Europe/Helsinki", "FI"),
    ("Europe/Istanbul", "TR"),
    ("Europe/Kyiv", "UA"),
    ("Europe/Lisbon", "PT"),
    ("Europe/London", "GB"),
    ("Europe/Madrid", "ES"),
    ("Europe/Moscow", "RU"),
    ("Europe/Oslo", "NO"),
    ("Europe/Paris", "FR"),
    ("Europe/Prague", "CZ"),
    ("Europe/Rome", "IT"),
    ("Europe/Stockholm", "SE"),
    ("Europe/Vienna", "AT"),
    ("Europe/Warsaw", "PL"),
    ("Europe/Zurich", "CH"),
    ("Pacific/Auckland", "NZ"),
    ("Pacific/Honolulu", "US"),
];

/// Territories whose dominant language's long time format carries an AM/PM
/// marker (CLDR `a` field). Everything else renders 24-hour.
const TWELVE_HOUR_TERRITORIES: &[&str] = &[
    "AE", "AU", "BD", "CA", "CN", "CO", "EG", "HK", "IN", "KR", "MX", "MY", "NZ", "PH", "PK",
    "SA", "SG", "TW", "US",
];

/// Historically primary territory for an IANA zone name, if the snapshot
/// knows it.
pub fn territory_of(zone_name: &str) -> Option<&'static str> {
    ZONE_TERRITORY
        .iter()
        .find(|(name, _)| *name == zone_name)
        .map(|(_, territory)| *territory)
}

fn uses_twelve_hour_clock(tz: &Tz) -> bool {
    territory_of(tz.name())
        .map(|territory| TWELVE_HOUR_TERRITORIES.contains(&territory))
        .unwrap_or(false)
}

/// Render an instant the way its viewing zone's primary locale would.
///
/// Unidentified non-zero offsets render 24-hour with the numeric offset; an
/// offset of exactly zero is folded into canonical UTC first.
pub fn format_in_zone(instant: &Instant, with_seconds: bool, date_style: DateStyle) -> String {
    let seconds = if with_seconds { ":%S" } else { "" };
    let date = match date_style {
        DateStyle::Long => "%b %d, %Y ",
        DateStyle::Short => "%b %d ",
        DateStyle::None => "",
    };

    if let Zone::Fixed(offset) = instant.zone() {
        if offset.local_minus_utc() != 0 {
            let local = instant.utc().with_timezone(&offset);
            return local.format(&format!("{date}%-H:%M{seconds} %z")).to_string();
        }
    }

    let tz = match instant.zone() {
        Zone::Named(tz) => tz,
        Zone::Fixed(_) => Tz::UTC,
    };
    let local = instant.utc().with_timezone(&tz);

    if tz == Tz::UTC || !uses_twelve_hour_clock(&tz) {
        return local.format(&format!("{date}%-H:%M{seconds} %Z")).to_string();
    }

    match date_style {
        DateStyle::Long => local
            .format(&format!("{date}%-I:%M{seconds} %p %Z"))
            .to_string(),
        // Compact dates get a compact meridiem: "Sep 22 4:41p PDT".
        _ => {
            let meridiem = if local.hour() < 12 { 'a' } else { 'p' };
            format!(
                "{}{meridiem} {}",
                local.format(&format!("{date}%-I:%M{seconds}")),
                local.format("%Z")
            )
        }
    }
}
