//! Humanized rendering of the gap between two instants.
//!
//! Every style starts from the same two measurements: the flat duration
//! `a - b`, and a calendar decomposition of the same gap (whole months found
//! by walking the calendar from the earlier instant, then an exact
//! remainder). The sign is normalized so both agree on direction, and the
//! phrasing mode turns that direction into ` ago`/` from now` or a leading
//! minus.

use chrono::{Datelike, TimeDelta};

use crate::zone::Instant;

/// Weeks and fractional months/years use the same approximation as the delta
/// parser.
const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.417;

/// Which rendering of the gap to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Exact flat seconds: `604800.0 seconds`.
    Seconds,
    /// Single largest calendar unit, one decimal: `1.0 week`.
    OneTerm,
    /// Single largest unit of the flat duration instead of the calendar gap.
    OneTermAlt,
    /// Largest two non-zero calendar units: `2 months and 3 days`.
    MultiTerm,
    /// Every non-zero calendar unit down to microseconds.
    MultiTermPrecise,
}

/// How to express direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrasing {
    /// ` ago` / ` from now`, with zero gaps collapsing to the word `now`.
    RelativeToNow,
    /// A leading `-` for negative gaps (delta-arithmetic output).
    Signed,
}

/// Integer calendar decomposition of a non-negative gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CalendarGap {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    micros: i64,
}

/// Render the gap from `b` to `a` (`a - b`) in the given style.
pub fn humanize(a: &Instant, b: &Instant, style: Style, phrasing: Phrasing) -> String {
    let flat = a.utc().signed_duration_since(b.utc());
    let negative = flat < TimeDelta::zero();
    let magnitude = if negative { -flat } else { flat };
    let (earlier, later) = if negative { (a, b) } else { (b, a) };

    let rendered = match style {
        Style::Seconds => render_seconds(magnitude),
        Style::OneTerm => render_oneterm_calendar(&calendar_gap(earlier, later)),
        Style::OneTermAlt => render_oneterm_flat(magnitude),
        Style::MultiTerm => render_multiterm(&calendar_gap(earlier, later), false),
        Style::MultiTermPrecise => render_multiterm(&calendar_gap(earlier, later), true),
    };

    match phrasing {
        Phrasing::RelativeToNow => {
            if rendered == "identical" {
                // A casual statement for times indistinguishable from now.
                return "now".to_string();
            }
            let direction = if negative { " from now" } else { " ago" };
            format!("{rendered}{direction}")
        }
        Phrasing::Signed => {
            let sign = if negative { "-" } else { "" };
            format!("{sign}{rendered}")
        }
    }
}

// ── Calendar decomposition ──────────────────────────────────────────────────

/// Whole months between the instants (walking the calendar from `earlier` in
/// its own zone, day-of-month clamped) plus the exact sub-month remainder.
fn calendar_gap(earlier: &Instant, later: &Instant) -> CalendarGap {
    let e = earlier.local_naive();
    let l = later.local_naive();
    let mut months =
        i64::from(l.year() - e.year()) * 12 + i64::from(l.month() as i32 - e.month() as i32);

    // The field-wise estimate can be off by one around month ends; correct it
    // against absolute time.
    while let Some(anchor) = shifted_by_months(earlier, months + 1) {
        if anchor.utc() <= later.utc() {
            months += 1;
        } else {
            break;
        }
    }
    while months > 0 {
        match shifted_by_months(earlier, months) {
            Some(anchor) if anchor.utc() > later.utc() => months -= 1,
            _ => break,
        }
    }

    let anchor = shifted_by_months(earlier, months).unwrap_or(*earlier);
    let remainder = later.utc().signed_duration_since(anchor.utc());
    let total_micros = remainder.num_microseconds().unwrap_or(i64::MAX);

    let micros_per_day = 86_400_000_000i64;
    let days = total_micros / micros_per_day;
    let rest = total_micros % micros_per_day;
    let hours = rest / 3_600_000_000;
    let rest = rest % 3_600_000_000;
    let minutes = rest / 60_000_000;
    let rest = rest % 60_000_000;
    let seconds = rest / 1_000_000;
    let micros = rest % 1_000_000;

    CalendarGap {
        years: months / 12,
        months: months % 12,
        days,
        hours,
        minutes,
        seconds,
        micros,
    }
}

fn shifted_by_months(instant: &Instant, months: i64) -> Option<Instant> {
    instant.add_months(i32::try_from(months).ok()?)
}

// ── Renderers ───────────────────────────────────────────────────────────────

/// Python-style float repr: whole values keep one decimal (`604800.0`).
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn render_seconds(magnitude: TimeDelta) -> String {
    let seconds = magnitude.num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6;
    let plural = if seconds == 1.0 { "" } else { "s" };
    format!("{} second{plural}", format_float(seconds))
}

/// One decimal; singular only when the unrounded value is not above one.
fn render_unit(value: f64, unit: &str) -> String {
    let plural = if value > 1.0 { "s" } else { "" };
    let rounded = (value * 10.0).round() / 10.0;
    format!("{rounded:.1} {unit}{plural}")
}

/// Largest calendar unit ≥ 1, with lower units folded in as a fraction.
fn render_oneterm_calendar(gap: &CalendarGap) -> String {
    let seconds = gap.seconds as f64 + gap.micros as f64 / 1e6;
    let minutes = gap.minutes as f64 + seconds / 60.0;
    let hours = gap.hours as f64 + minutes / 60.0;
    let days = gap.days as f64 + hours / 24.0;
    let months = gap.months as f64 + days / DAYS_PER_MONTH;
    let years = gap.years as f64 + months / 12.0;
    let weeks = days / 7.0;
    let days_past_weeks = days % 7.0;
    let millis = gap.micros as f64 / 1_000.0;
    let micros_past_millis = (gap.micros % 1_000) as f64;

    let cascade = [
        ("year", years),
        ("month", months),
        ("week", weeks),
        ("day", days_past_weeks),
        ("hour", hours),
        ("minute", minutes),
        ("second", seconds),
        ("millisecond", millis),
        ("microsecond", micros_past_millis),
    ];
    for (unit, value) in cascade {
        if value >= 1.0 {
            return render_unit(value, unit);
        }
    }
    "identical".to_string()
}

/// Largest unit of the flat duration, ignoring the calendar.
fn render_oneterm_flat(magnitude: TimeDelta) -> String {
    let total_micros = magnitude.num_microseconds().unwrap_or(i64::MAX);
    let day_raw = total_micros as f64 / 86_400_000_000.0;
    let whole_days = total_micros / 86_400_000_000;
    let within_day = total_micros - whole_days * 86_400_000_000;
    let second_raw = (within_day / 1_000_000) as f64;
    let micro_raw = (within_day % 1_000_000) as f64;

    let (years, days) = (day_raw / DAYS_PER_YEAR, day_raw % DAYS_PER_YEAR);
    let (months, days) = (days / DAYS_PER_MONTH, days % DAYS_PER_MONTH);
    let (weeks, days) = (days / 7.0, days % 7.0);
    let (hours, seconds) = (second_raw / 3_600.0, second_raw % 3_600.0);
    let (minutes, seconds) = (seconds / 60.0, seconds % 60.0);
    let (millis, micros) = (micro_raw / 1_000.0, micro_raw % 1_000.0);

    let cascade = [
        ("year", years),
        ("month", months),
        ("week", weeks),
        ("day", days),
        ("hour", hours),
        ("minute", minutes),
        ("second", seconds),
        ("millisecond", millis),
        ("microsecond", micros),
    ];
    for (unit, value) in cascade {
        if value >= 1.0 {
            let plural = if value == 1.0 { "" } else { "s" };
            let rounded = (value * 10.0).round() / 10.0;
            return format!("{rounded:.1} {unit}{plural}");
        }
    }
    "identical".to_string()
}

/// First two non-zero integer units (or all of them when `precise`), joined
/// with "and".
fn render_multiterm(gap: &CalendarGap, precise: bool) -> String {
    let entries = [
        ("year", gap.years),
        ("month", gap.months),
        ("week", gap.days / 7),
        ("day", gap.days % 7),
        ("hour", gap.hours),
        ("minute", gap.minutes),
        ("second", gap.seconds),
        ("microsecond", gap.micros),
    ];

    let mut terms: Vec<String> = Vec::new();
    for (unit, value) in entries {
        if value < 1 {
            if !terms.is_empty() && !precise {
                break;
            }
            continue;
        }
        let plural = if value == 1 { "" } else { "s" };
        terms.push(format!("{value} {unit}{plural}"));
        if terms.len() >= 2 && !precise {
            break;
        }
    }

    if terms.is_empty() {
        "identical".to_string()
    } else {
        terms.join(" and ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;

    /// Thursday, September 22, 2022, 16:41:01.299 in Los Angeles.
    fn anchor() -> Instant {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let utc = Utc.with_ymd_and_hms(2022, 9, 22, 23, 41, 1).unwrap()
            + TimeDelta::milliseconds(299);
        Instant::new(utc, Zone::Named(tz))
    }

    fn shifted(delta: TimeDelta) -> Instant {
        anchor().checked_shift(delta).unwrap()
    }

    #[test]
    fn a_week_ago_renders_one_week() {
        let earlier = shifted(TimeDelta::days(-7));
        assert_eq!(
            humanize(&anchor(), &earlier, Style::OneTerm, Phrasing::RelativeToNow),
            "1.0 week ago"
        );
        assert_eq!(
            humanize(&anchor(), &earlier, Style::Seconds, Phrasing::RelativeToNow),
            "604800.0 seconds ago"
        );
    }

    #[test]
    fn future_instants_phrase_from_now() {
        let later = shifted(TimeDelta::minutes(19));
        assert_eq!(
            humanize(&anchor(), &later, Style::OneTerm, Phrasing::RelativeToNow),
            "19.0 minutes from now"
        );
    }

    #[test]
    fn signed_phrasing_uses_a_minus_sign() {
        let later = shifted(TimeDelta::hours(2));
        assert_eq!(
            humanize(&anchor(), &later, Style::Seconds, Phrasing::Signed),
            "-7200.0 seconds"
        );
        assert_eq!(
            humanize(&later, &anchor(), Style::Seconds, Phrasing::Signed),
            "7200.0 seconds"
        );
    }

    #[test]
    fn identical_instants_collapse_to_now_in_prose() {
        let a = anchor();
        assert_eq!(
            humanize(&a, &a, Style::OneTerm, Phrasing::RelativeToNow),
            "now"
        );
        assert_eq!(
            humanize(&a, &a, Style::MultiTerm, Phrasing::RelativeToNow),
            "now"
        );
        assert_eq!(
            humanize(&a, &a, Style::MultiTermPrecise, Phrasing::RelativeToNow),
            "now"
        );
        assert_eq!(
            humanize(&a, &a, Style::OneTermAlt, Phrasing::RelativeToNow),
            "now"
        );
    }

    #[test]
    fn identical_instants_render_zero_seconds_in_seconds_style() {
        let a = anchor();
        assert_eq!(
            humanize(&a, &a, Style::Seconds, Phrasing::RelativeToNow),
            "0.0 seconds ago"
        );
        assert_eq!(
            humanize(&a, &a, Style::MultiTerm, Phrasing::Signed),
            "identical"
        );
    }

    #[test]
    fn one_second_is_singular() {
        let earlier = shifted(TimeDelta::seconds(-1));
        assert_eq!(
            humanize(&anchor(), &earlier, Style::Seconds, Phrasing::Signed),
            "1.0 second"
        );
    }

    #[test]
    fn multiterm_takes_the_top_two_units() {
        let earlier = shifted(-(TimeDelta::days(10) + TimeDelta::hours(5) + TimeDelta::minutes(3)));
        assert_eq!(
            humanize(&anchor(), &earlier, Style::MultiTerm, Phrasing::Signed),
            "1 week and 3 days"
        );
    }

    #[test]
    fn multiterm_precise_keeps_every_unit() {
        let earlier = shifted(-(TimeDelta::days(10) + TimeDelta::hours(5) + TimeDelta::minutes(3)));
        assert_eq!(
            humanize(
                &anchor(),
                &earlier,
                Style::MultiTermPrecise,
                Phrasing::Signed
            ),
            "1 week and 3 days and 5 hours and 3 minutes"
        );
    }

    #[test]
    fn calendar_styles_count_whole_months_across_uneven_month_lengths() {
        let utc_zone = Zone::Named(Tz::UTC);
        let a = Instant::new(Utc.with_ymd_and_hms(2023, 3, 31, 12, 0, 0).unwrap(), utc_zone);
        let b = Instant::new(Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap(), utc_zone);
        assert_eq!(
            humanize(&a, &b, Style::MultiTerm, Phrasing::Signed),
            "2 months"
        );
        // The flat view of the same gap sees 59 days, not two clean months.
        assert_eq!(
            humanize(&a, &b, Style::OneTermAlt, Phrasing::Signed),
            "1.9 months"
        );
    }

    #[test]
    fn oneterm_prefers_the_largest_nonzero_unit() {
        let earlier = shifted(-(TimeDelta::hours(36)));
        assert_eq!(
            humanize(&anchor(), &earlier, Style::OneTerm, Phrasing::Signed),
            "1.5 days"
        );
    }

    #[test]
    fn sub_second_gaps_render_milliseconds() {
        let earlier = shifted(TimeDelta::milliseconds(-250));
        assert_eq!(
            humanize(&anchor(), &earlier, Style::OneTerm, Phrasing::Signed),
            "250.0 milliseconds"
        );
    }
}
