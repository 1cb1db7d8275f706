//! The datetime parsing cascade.
//!
//! One phrase goes through a fixed ordered sequence of interpretation
//! strategies; the first match wins. The order encodes precedence ("now"
//! prose beats a coincidental zone token, a delta beats a bare number that
//! could be read as a clock), not convenience. Strategies are pure
//! try-functions returning `Option`; only exhaustion of the whole cascade is
//! an error.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::delta::parse_delta;
use crate::error::{Result, WhenError};
use crate::zone::{Instant, Zone, ZoneResolver};

/// Phrases that mean "the current instant". Matched case-insensitively after
/// trimming; the empty phrase counts too.
const NOW_SYNONYMS: &[&str] = &[
    "now",
    "current",
    "currently",
    "today",
    "current time",
    "local time",
];

/// A cascade result before zone attachment: either already zoned, or a
/// wall-clock value waiting for its zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingInstant {
    Zoned(Instant),
    Naive(NaiveDateTime),
}

/// Cascade output: the parsed value, an optional unresolved zone token, and
/// the name of the strategy that matched (surfaced by the CLI's extended
/// mode).
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: PendingInstant,
    pub hint: Option<String>,
    pub strategy: &'static str,
}

impl Parsed {
    fn zoned(instant: Instant, strategy: &'static str) -> Self {
        Self {
            value: PendingInstant::Zoned(instant),
            hint: None,
            strategy,
        }
    }
}

/// Run the cascade over one phrase.
pub fn parse_phrase(phrase: &str, now: &Instant, resolver: &ZoneResolver) -> Result<Parsed> {
    let trimmed = phrase.trim();
    let folded = trimmed.to_lowercase();

    // 1. now / blank
    if folded.is_empty() {
        return Ok(Parsed::zoned(*now, "blank"));
    }
    if NOW_SYNONYMS.contains(&folded.as_str()) {
        return Ok(Parsed::zoned(*now, "now prose"));
    }

    // 2. relative delta
    if let Some(delta) = parse_delta(trimmed) {
        let shifted = delta.apply(now).ok_or_else(|| {
            WhenError::InvalidOperation("shifted time is out of range".to_string())
        })?;
        return Ok(Parsed::zoned(shifted, "relative time specifier"));
    }

    // 3. tomorrow / yesterday
    if folded == "tomorrow" || folded == "yesterday" {
        let days = if folded == "tomorrow" { 1 } else { -1 };
        let shifted = now.add_days(days).ok_or_else(|| {
            WhenError::InvalidOperation("shifted time is out of range".to_string())
        })?;
        return Ok(Parsed::zoned(shifted, "relative time prose"));
    }

    // 4. next/last weekday
    if let Some(instant) = try_relative_weekday(&folded, now) {
        return Ok(Parsed::zoned(instant, "relative weekday"));
    }

    // 5. bare epoch numbers, classified by digit count
    if let Some((instant, strategy)) = try_epoch(trimmed) {
        return Ok(Parsed::zoned(instant, strategy));
    }

    // 6. general datetime forms
    if let Some(value) = try_general(trimmed, now) {
        return Ok(Parsed {
            value,
            hint: None,
            strategy: "general datetime",
        });
    }

    // 7. retry with the last token split off as a zone hint
    if let Some((left, right)) = trimmed.rsplit_once(' ') {
        if let Some(value) = try_general(left.trim(), now) {
            return Ok(Parsed {
                value,
                hint: Some(right.to_string()),
                strategy: "general datetime with trailing timezone",
            });
        }
    }

    // 8. the whole phrase is itself a timezone
    if let Ok(zone) = resolver.resolve(trimmed) {
        return Ok(Parsed::zoned(now.in_zone(zone), "solo timezone"));
    }

    Err(WhenError::UnparseableInput(trimmed.to_string()))
}

/// Enforce the zone invariant on a cascade result: exactly one of
/// {already zoned, hint on a naive value} must hold.
pub fn attach_zone(parsed: Parsed, resolver: &ZoneResolver) -> Result<Instant> {
    match (parsed.value, parsed.hint) {
        (PendingInstant::Zoned(instant), None) => Ok(instant),
        (PendingInstant::Zoned(_), Some(_)) => Err(WhenError::ConflictingTimezone),
        (PendingInstant::Naive(_), None) => Err(WhenError::AmbiguousTimezone),
        (PendingInstant::Naive(naive), Some(hint)) => {
            let zone = resolver.resolve(&hint)?;
            zone.localize(naive).ok_or_else(|| {
                WhenError::InvalidOperation(format!(
                    "local time {naive} is ambiguous or nonexistent in {hint}"
                ))
            })
        }
    }
}

/// Cascade plus zone attachment: phrase in, zoned instant out.
pub fn parse_instant(
    phrase: &str,
    now: &Instant,
    resolver: &ZoneResolver,
) -> Result<(Instant, &'static str)> {
    let parsed = parse_phrase(phrase, now, resolver)?;
    let strategy = parsed.strategy;
    Ok((attach_zone(parsed, resolver)?, strategy))
}

/// Strip a trailing `… in <tz>[,<tz>…]` / `… as <tz>` clause into extra
/// display-zone tokens. The clause names zones to *show*, not the zone of the
/// parse target itself.
pub fn split_display_clause(phrase: &str) -> (String, Vec<String>) {
    let bytes = phrase.as_bytes();
    let keyword_at = |i: usize| {
        bytes[i] == b' '
            && bytes[i + 3] == b' '
            && matches!(
                [
                    bytes[i + 1].to_ascii_lowercase(),
                    bytes[i + 2].to_ascii_lowercase(),
                ],
                [b'i', b'n'] | [b'a', b's']
            )
    };

    for cut in 0..bytes.len().saturating_sub(3) {
        if !keyword_at(cut) {
            continue;
        }
        let tail = &phrase[cut + 4..];
        if is_zone_list(tail) {
            let zones = tail
                .split(',')
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .collect();
            return (phrase[..cut].trim().to_string(), zones);
        }
    }
    (phrase.trim().to_string(), Vec::new())
}

fn is_zone_list(tail: &str) -> bool {
    !tail.trim().is_empty()
        && tail.split(',').all(|token| {
            let token = token.trim();
            token.len() >= 2
                && token
                    .chars()
                    .all(|c| c.is_ascii_alphabetic() || c == '/' || c == '_')
        })
}

// ── Strategy 4: next/last weekday ───────────────────────────────────────────

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn days_until(from: Weekday, to: Weekday) -> i64 {
    (to.num_days_from_monday() as i64 - from.num_days_from_monday() as i64).rem_euclid(7)
}

fn try_relative_weekday(folded: &str, now: &Instant) -> Option<Instant> {
    let mut words = folded.split_whitespace();
    let modifier = words.next()?;
    let weekday = parse_weekday(words.next()?)?;

    let base = match modifier {
        // Add a day first so naming the current weekday never returns today.
        "next" => now.add_days(1)?,
        "last" => now.add_days(-7)?,
        _ => return None,
    };
    base.add_days(days_until(base.weekday(), weekday))
}

// ── Strategy 5: epoch numbers ───────────────────────────────────────────────

/// Classify a digit string by length into an epoch unit.
///
/// The bands are a heuristic with documented blind spots: without leading
/// zeros the seconds band only covers 1973-03-03 through year 33658, the
/// millisecond band starts at 2001-09-09, and so on. The bands are behavior,
/// not a defect to fix.
fn try_epoch(s: &str) -> Option<(Instant, &'static str)> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (s, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let (utc, strategy) = match int_part.len() {
        // Only the seconds band accepts a decimal fraction.
        9..=12 => {
            let seconds: f64 = s.parse().ok()?;
            let whole = seconds.trunc();
            let nanos = ((seconds - whole) * 1e9).round() as u32;
            (DateTime::from_timestamp(whole as i64, nanos)?, "unix")
        }
        13..=15 => {
            frac_part.is_none().then_some(())?;
            (
                DateTime::from_timestamp_millis(int_part.parse().ok()?)?,
                "unix milliseconds",
            )
        }
        16..=18 => {
            frac_part.is_none().then_some(())?;
            (
                DateTime::from_timestamp_micros(int_part.parse().ok()?)?,
                "unix microseconds",
            )
        }
        19..=21 => {
            frac_part.is_none().then_some(())?;
            let nanos_total: i128 = int_part.parse().ok()?;
            let seconds = i64::try_from(nanos_total / 1_000_000_000).ok()?;
            let nanos = (nanos_total % 1_000_000_000) as u32;
            (DateTime::from_timestamp(seconds, nanos)?, "unix nanoseconds")
        }
        _ => return None,
    };
    Some((Instant::new(utc, Zone::Named(Tz::UTC)), strategy))
}

// ── Strategy 6: general datetime forms ──────────────────────────────────────

/// Date-time forms carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M %z",
    "%b %d, %Y %I:%M:%S %p %z",
    "%b %d, %Y %I:%M %p %z",
    "%b %d %Y %I:%M:%S %p %z",
    "%b %d %Y %I:%M %p %z",
    "%Y %b %d %I:%M:%S %p %z",
    "%Y %b %d %I:%M %p %z",
    "%d %b %Y %H:%M:%S %z",
];

/// Zone-less date-time forms.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d %Y %I:%M:%S %p",
    "%b %d %Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %b %Y %I:%M %p",
    "%Y %b %d %I:%M:%S %p",
    "%Y %b %d %I:%M %p",
    "%Y %b %d %H:%M:%S",
    "%Y %b %d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

/// Date-only forms; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%Y %b %d",
    "%m/%d/%Y",
];

/// The "host primitive" of the cascade: an ordered table of chrono parses,
/// fed a phrase normalized for two well-known footguns (POSIX-style
/// `GMT+6`/`UTC+6` sign inversion, ordinal day suffixes). Returns a zoned
/// value only when the text carries an explicit offset; everything else is
/// naive, with missing date components defaulted from `now`.
fn try_general(phrase: &str, now: &Instant) -> Option<PendingInstant> {
    let cleaned = rewrite_gmt_offsets(&strip_ordinal_suffixes(phrase));
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(zoned_fixed(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(zoned_fixed(dt));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, format) {
            return Some(zoned_fixed(dt));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(PendingInstant::Naive(naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(PendingInstant::Naive(date.and_time(NaiveTime::MIN)));
        }
    }

    let today = now.local_naive().date();

    // Month-day forms with no year take the current year.
    let year = today.year();
    for format in ["%b %d %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{cleaned} {year}"), format) {
            return Some(PendingInstant::Naive(date.and_time(NaiveTime::MIN)));
        }
    }

    // Time-of-day with a trailing numeric offset ("5pm +06:00" after the
    // GMT rewrite): today's date in that offset.
    if let Some((time_part, offset)) = split_trailing_offset(cleaned) {
        if let Some(time) = parse_time_of_day(time_part) {
            let zone = Zone::Fixed(offset);
            if let Some(instant) = zone.localize(today.and_time(time)) {
                return Some(PendingInstant::Zoned(instant));
            }
        }
    }

    // Bare time of day: today's date, zone still unknown.
    if let Some(time) = parse_time_of_day(cleaned) {
        return Some(PendingInstant::Naive(today.and_time(time)));
    }

    // Bare weekday name: the next such day at or after today, at midnight.
    if let Some(weekday) = parse_weekday(cleaned.to_lowercase().as_str()) {
        let date = today.checked_add_days(Days::new(days_until(today.weekday(), weekday) as u64))?;
        return Some(PendingInstant::Naive(date.and_time(NaiveTime::MIN)));
    }

    None
}

fn zoned_fixed(dt: DateTime<FixedOffset>) -> PendingInstant {
    PendingInstant::Zoned(Instant::new(dt.with_timezone(&Utc), Zone::Fixed(*dt.offset())))
}

/// `14:00`, `14:30:00`, `2pm`, `2:30pm`, `2 PM`, `02:30:15 am`.
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return Some(t);
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        return Some(t);
    }

    let compact = s.to_lowercase().replace(' ', "");
    let (body, is_pm) = if let Some(body) = compact.strip_suffix("pm") {
        (body, true)
    } else if let Some(body) = compact.strip_suffix("am") {
        (body, false)
    } else {
        return None;
    };
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let mut parts = body.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    let second: u32 = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let hour24 = match (hour, is_pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour24, minute, second)
}

/// Split `"… ±HH:MM"` / `"… ±HHMM"` into (prefix, parsed offset).
fn split_trailing_offset(s: &str) -> Option<(&str, FixedOffset)> {
    let (left, right) = s.rsplit_once(' ')?;
    let bytes = right.as_bytes();
    let sign: i32 = match bytes.first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = right[1..].chars().filter(|c| *c != ':').collect();
    if !(digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
    Some((left, offset))
}

/// Rewrite `GMT+6` / `UTC-0700` style tokens to bare `+06:00` / `-07:00`
/// offsets. POSIX (and parsers inheriting from it) read `UTC+6` as UTC-6;
/// stripping the prefix keeps the intuitive sign.
fn rewrite_gmt_offsets(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        let rest = &s[i..];
        if (rest.starts_with("GMT") || rest.starts_with("UTC")) && i + 3 < bytes.len() {
            let sign = bytes[i + 3];
            if sign == b'+' || sign == b'-' {
                let digits_start = i + 4;
                let digit_len = s[digits_start..]
                    .bytes()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if (1..=4).contains(&digit_len) {
                    let digits = &s[digits_start..digits_start + digit_len];
                    let (hours, minutes): (u32, u32) = match digit_len {
                        1 | 2 => (digits.parse().unwrap_or(0), 0),
                        3 => (
                            digits[..1].parse().unwrap_or(0),
                            digits[1..].parse().unwrap_or(0),
                        ),
                        _ => (
                            digits[..2].parse().unwrap_or(0),
                            digits[2..].parse().unwrap_or(0),
                        ),
                    };
                    out.push(sign as char);
                    out.push_str(&format!("{hours:02}:{minutes:02}"));
                    i = digits_start + digit_len;
                    continue;
                }
            }
        }
        let ch = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
        out.push_str(&s[i..i + ch]);
        i += ch;
    }
    out
}

/// Drop ordinal day suffixes: `15th` → `15`, `May 1st` → `May 1`.
fn strip_ordinal_suffixes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let after_digit = i > 0 && bytes[i - 1].is_ascii_digit();
        if after_digit && i + 1 < bytes.len() {
            let pair = [
                bytes[i].to_ascii_lowercase(),
                bytes[i + 1].to_ascii_lowercase(),
            ];
            let is_suffix = matches!(&pair, b"st" | b"nd" | b"rd" | b"th");
            let at_boundary = i + 2 >= bytes.len() || !bytes[i + 2].is_ascii_alphanumeric();
            if is_suffix && at_boundary {
                i += 2;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Timelike};

    fn resolver() -> ZoneResolver {
        ZoneResolver::new()
    }

    /// Thursday, September 22, 2022, 16:41:01.299 in Los Angeles.
    fn anchor() -> Instant {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let utc = Utc.with_ymd_and_hms(2022, 9, 22, 23, 41, 1).unwrap()
            + TimeDelta::milliseconds(299);
        Instant::new(utc, Zone::Named(tz))
    }

    fn resolve(phrase: &str) -> Instant {
        parse_instant(phrase, &anchor(), &resolver()).unwrap().0
    }

    #[test]
    fn blank_and_now_synonyms_return_the_anchor() {
        for phrase in ["", "  ", "now", "NOW", "currently", "today", "current time"] {
            assert_eq!(resolve(phrase), anchor(), "{phrase:?}");
        }
    }

    #[test]
    fn now_prose_wins_over_a_coincidental_zone_token() {
        let resolver = ZoneResolver::with_aliases(&[("NOW", "Asia/Tokyo")]);
        let parsed = parse_phrase("now", &anchor(), &resolver).unwrap();
        assert_eq!(parsed.strategy, "now prose");
        assert_eq!(parsed.value, PendingInstant::Zoned(anchor()));
    }

    #[test]
    fn delta_phrase_shifts_the_anchor() {
        assert_eq!(
            resolve("- 7d").to_rfc3339_millis(),
            "2022-09-15T16:41:01.299-07:00"
        );
    }

    #[test]
    fn one_month_forward_preserves_the_day_of_month() {
        assert_eq!(
            resolve("+1mo").to_rfc3339_millis(),
            "2022-10-22T16:41:01.299-07:00"
        );
    }

    #[test]
    fn tomorrow_and_yesterday() {
        assert_eq!(
            resolve("tomorrow").to_rfc3339_millis(),
            "2022-09-23T16:41:01.299-07:00"
        );
        assert_eq!(
            resolve("Yesterday").to_rfc3339_millis(),
            "2022-09-21T16:41:01.299-07:00"
        );
    }

    #[test]
    fn next_weekday_never_returns_today() {
        // The anchor is a Thursday.
        assert_eq!(anchor().weekday(), Weekday::Thu);
        assert_eq!(
            resolve("next thursday").to_rfc3339_millis(),
            "2022-09-29T16:41:01.299-07:00"
        );
        assert_eq!(
            resolve("next friday").to_rfc3339_millis(),
            "2022-09-23T16:41:01.299-07:00"
        );
    }

    #[test]
    fn last_weekday_lands_at_or_before_the_anchor() {
        assert_eq!(
            resolve("last thursday").to_rfc3339_millis(),
            "2022-09-15T16:41:01.299-07:00"
        );
        assert_eq!(
            resolve("last monday").to_rfc3339_millis(),
            "2022-09-19T16:41:01.299-07:00"
        );
    }

    #[test]
    fn epoch_seconds_band() {
        let instant = resolve("1621108906");
        assert_eq!(instant.epoch_seconds(), 1_621_108_906);
        assert_eq!(
            instant.to_rfc3339_millis(),
            "2021-05-15T20:01:46.000+00:00"
        );
    }

    #[test]
    fn epoch_seconds_band_accepts_a_fraction() {
        let instant = resolve("1621108906.250");
        assert_eq!(instant.utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn higher_epoch_bands_share_one_instant() {
        let expected = resolve("1621108906").utc();
        assert_eq!(resolve("1621108906000").utc(), expected);
        assert_eq!(resolve("1621108906000000").utc(), expected);
        assert_eq!(resolve("1621108906000000000").utc(), expected);
    }

    #[test]
    fn short_digit_strings_are_not_epochs() {
        let err = parse_instant("12345678", &anchor(), &resolver()).unwrap_err();
        assert!(matches!(err, WhenError::UnparseableInput(_)));
    }

    #[test]
    fn fraction_is_rejected_outside_the_seconds_band() {
        let err = parse_instant("1621108906000.5", &anchor(), &resolver()).unwrap_err();
        assert!(matches!(err, WhenError::UnparseableInput(_)));
    }

    #[test]
    fn rfc3339_input_is_fully_zoned() {
        let instant = resolve("2021-05-15T20:01:46.000+00:00");
        assert_eq!(instant.epoch_seconds(), 1_621_108_906);
        assert!(matches!(instant.zone(), Zone::Fixed(_)));
    }

    #[test]
    fn naive_input_without_a_hint_is_ambiguous() {
        let err = parse_instant("May 15, 2021 01:01:46 PM", &anchor(), &resolver()).unwrap_err();
        assert!(matches!(err, WhenError::AmbiguousTimezone));
    }

    #[test]
    fn zoned_input_with_a_hint_is_conflicting() {
        let err = parse_instant(
            "2021-05-15T20:01:46+00:00 PDT",
            &anchor(),
            &resolver(),
        )
        .unwrap_err();
        assert!(matches!(err, WhenError::ConflictingTimezone));
    }

    #[test]
    fn trailing_zone_hint_is_resolved() {
        let (instant, strategy) =
            parse_instant("May 15, 2021 01:01:46 PM PDT", &anchor(), &resolver()).unwrap();
        assert_eq!(instant.epoch_seconds(), 1_621_108_906);
        assert_eq!(strategy, "general datetime with trailing timezone");
        assert_eq!(
            instant.zone(),
            Zone::Named("America/Los_Angeles".parse().unwrap())
        );
    }

    #[test]
    fn ordinal_suffixes_and_gmt_offsets_are_rewritten() {
        let instant = resolve("2021 May 15th 1:01 PM GMT-0700");
        assert_eq!(
            instant.utc(),
            Utc.with_ymd_and_hms(2021, 5, 15, 20, 1, 0).unwrap()
        );
    }

    #[test]
    fn utc_plus_six_means_plus_six() {
        // POSIX would read UTC+6 as UTC-6; the rewrite keeps the intuitive sign.
        let instant = resolve("2021-05-15 12:00 UTC+6");
        assert_eq!(
            instant.utc(),
            Utc.with_ymd_and_hms(2021, 5, 15, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn time_of_day_with_hint_takes_the_anchor_date() {
        let instant = resolve("5pm PDT");
        assert_eq!(
            instant.to_rfc3339_millis(),
            "2022-09-22T17:00:00.000-07:00"
        );
        assert_eq!(instant.utc().hour(), 0);
    }

    #[test]
    fn bare_timezone_returns_now_in_that_zone() {
        let instant = resolve("Asia/Hong_Kong");
        assert_eq!(instant.utc(), anchor().utc());
        assert_eq!(instant.zone(), Zone::Named(chrono_tz::Asia::Hong_Kong));

        let abbreviated = resolve("pdt");
        assert_eq!(abbreviated.utc(), anchor().utc());
    }

    #[test]
    fn exhausted_cascade_reports_the_phrase() {
        let err = parse_instant("gobbledygook", &anchor(), &resolver()).unwrap_err();
        assert!(err.to_string().contains("gobbledygook"));
    }

    #[test]
    fn nonexistent_local_time_is_an_error() {
        // 2:30 AM on 2022-03-13 does not exist in Los Angeles (spring forward).
        let err = parse_instant("2022-03-13 02:30:00 PDT", &anchor(), &resolver()).unwrap_err();
        assert!(matches!(err, WhenError::InvalidOperation(_)));
    }

    #[test]
    fn display_clause_is_split_off() {
        let (rest, zones) = split_display_clause("now in Asia/Hong_Kong");
        assert_eq!(rest, "now");
        assert_eq!(zones, vec!["Asia/Hong_Kong"]);

        let (rest, zones) = split_display_clause("now in IST,EDT,CEST,Asia/Tokyo");
        assert_eq!(rest, "now");
        assert_eq!(zones, vec!["IST", "EDT", "CEST", "Asia/Tokyo"]);

        let (rest, zones) = split_display_clause("5pm PDT as CET");
        assert_eq!(rest, "5pm PDT");
        assert_eq!(zones, vec!["CET"]);
    }

    #[test]
    fn clause_keywords_inside_the_phrase_are_left_alone() {
        let (rest, zones) = split_display_clause("in 2 hours");
        assert_eq!(rest, "in 2 hours");
        assert!(zones.is_empty());

        let (rest, zones) = split_display_clause("now in 3");
        assert_eq!(rest, "now in 3");
        assert!(zones.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn seconds_band_round_trips(n in 100_000_000i64..999_999_999_999) {
                let instant = resolve(&n.to_string());
                prop_assert_eq!(instant.epoch_seconds(), n);
            }

            #[test]
            fn millisecond_band_round_trips(n in 1_000_000_000_000i64..999_999_999_999_999) {
                let instant = resolve(&n.to_string());
                prop_assert_eq!(instant.utc().timestamp_millis(), n);
            }

            #[test]
            fn microsecond_band_round_trips(n in 1_000_000_000_000_000i64..999_999_999_999_999_999) {
                let instant = resolve(&n.to_string());
                prop_assert_eq!(instant.utc().timestamp_micros(), n);
            }

            #[test]
            fn nanosecond_band_round_trips(n in 1_000_000_000_000_000_000i64..i64::MAX) {
                let instant = resolve(&n.to_string());
                let utc = instant.utc();
                prop_assert_eq!(utc.timestamp(), n / 1_000_000_000);
                prop_assert_eq!(utc.timestamp_subsec_nanos(), (n % 1_000_000_000) as u32);
            }
        }
    }
}
