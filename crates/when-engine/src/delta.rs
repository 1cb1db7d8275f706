//! Signed duration expressions: `+1.5h`, `-7d`, `+1mo`, `+01:30:00`.
//!
//! Two mutually exclusive grammars, tried in order. The unit-suffixed grammar
//! produces a calendar-relative delta (whole months move the calendar, so
//! `+1mo` on Jan 31 lands on Feb 28, not 30 days later); the clock grammar
//! produces a flat duration. The distinction is kept in the type.

use chrono::TimeDelta;
use std::ops::Neg;

use crate::zone::Instant;

/// Approximate day lengths used to fold fractional years/months into days.
/// Fractional calendar units cannot be exact; these constants are the
/// documented approximation.
const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.417;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A parsed delta expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeltaSpec {
    /// Unit-suffixed grammar: whole calendar months plus an exact remainder.
    Calendar { months: i32, remainder: TimeDelta },
    /// `H:M:S` grammar: a flat clock duration.
    Clock(TimeDelta),
}

impl DeltaSpec {
    /// Apply to an instant, preserving its viewing zone. `None` when the
    /// result falls outside the representable calendar range.
    pub fn apply(&self, instant: &Instant) -> Option<Instant> {
        match self {
            DeltaSpec::Calendar { months, remainder } => {
                instant.add_months(*months)?.checked_shift(*remainder)
            }
            DeltaSpec::Clock(duration) => instant.checked_shift(*duration),
        }
    }
}

impl Neg for DeltaSpec {
    type Output = DeltaSpec;

    fn neg(self) -> DeltaSpec {
        match self {
            DeltaSpec::Calendar { months, remainder } => DeltaSpec::Calendar {
                months: -months,
                remainder: -remainder,
            },
            DeltaSpec::Clock(duration) => DeltaSpec::Clock(-duration),
        }
    }
}

/// Parse a delta expression. `None` (not an error) when the text does not
/// match either grammar; callers use this for speculative matching.
pub fn parse_delta(input: &str) -> Option<DeltaSpec> {
    parse_unit_delta(input).or_else(|| parse_clock_delta(input))
}

/// `<sign>[ ]<number>[ ]<unit>` with trailing text ignored after whitespace.
fn parse_unit_delta(input: &str) -> Option<DeltaSpec> {
    let (sign, rest) = split_sign(input)?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let int_len = leading_digits(rest);
    if int_len == 0 || int_len > 8 {
        return None;
    }
    let mut number_len = int_len;
    if rest.as_bytes().get(number_len) == Some(&b'.') {
        let frac_len = leading_digits(&rest[number_len + 1..]);
        if frac_len == 0 {
            return None;
        }
        number_len += 1 + frac_len;
    }
    let magnitude: f64 = rest[..number_len].parse().ok()?;
    let value = sign * magnitude;

    let rest = &rest[number_len..];
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    let unit_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if unit_len == 0 {
        return None;
    }
    match rest[unit_len..].chars().next() {
        None => {}
        Some(c) if c.is_whitespace() => {}
        Some(_) => return None,
    }

    let spec = match rest[..unit_len].to_lowercase().as_str() {
        "y" | "yr" | "yrs" | "year" | "years" => calendar_split(value, 12, DAYS_PER_YEAR),
        "mo" | "month" | "months" => calendar_split(value, 1, DAYS_PER_MONTH),
        "w" | "wk" | "week" | "weeks" => exact_delta(value * 7.0 * SECONDS_PER_DAY),
        "d" | "day" | "days" => exact_delta(value * SECONDS_PER_DAY),
        "h" | "hr" | "hrs" | "hour" | "hours" => exact_delta(value * 3_600.0),
        "m" | "min" | "mins" | "minute" | "minutes" => exact_delta(value * 60.0),
        "s" | "sec" | "secs" | "seconds" => exact_delta(value),
        "ms" | "millisecond" | "milliseconds" => exact_delta(value / 1_000.0),
        _ => return None,
    };
    Some(spec)
}

/// `<sign>[ ]H:M:S` with any component possibly empty. Flat seconds.
fn parse_clock_delta(input: &str) -> Option<DeltaSpec> {
    let (sign, rest) = split_sign(input)?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let (hours, rest) = clock_component(rest)?;
    let rest = rest.strip_prefix(':')?;
    let (minutes, rest) = clock_component(rest)?;
    let rest = rest.strip_prefix(':')?;
    let (seconds, rest) = clock_component(rest)?;
    match rest.chars().next() {
        None => {}
        Some(c) if c.is_whitespace() => {}
        Some(_) => return None,
    }

    let total = hours * 3_600 + minutes * 60 + seconds;
    let signed = if sign < 0.0 { -total } else { total };
    Some(DeltaSpec::Clock(TimeDelta::seconds(signed)))
}

fn split_sign(input: &str) -> Option<(f64, &str)> {
    match input.as_bytes().first()? {
        b'+' => Some((1.0, &input[1..])),
        b'-' => Some((-1.0, &input[1..])),
        _ => None,
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

/// Up to two digits; empty counts as zero.
fn clock_component(s: &str) -> Option<(i64, &str)> {
    let len = leading_digits(s);
    if len > 2 {
        return None;
    }
    let value = if len == 0 { 0 } else { s[..len].parse().ok()? };
    Some((value, &s[len..]))
}

/// Split a fractional year/month count into whole calendar months plus a
/// sign-applied approximate day remainder. Truncating the magnitude (rather
/// than flooring the signed value) keeps `parse_delta` sign-antisymmetric.
fn calendar_split(value: f64, months_per_unit: i32, days_per_unit: f64) -> DeltaSpec {
    let whole = value.trunc();
    let fraction = value - whole;
    DeltaSpec::Calendar {
        months: (whole as i32) * months_per_unit,
        remainder: delta_from_seconds(fraction * days_per_unit * SECONDS_PER_DAY),
    }
}

fn exact_delta(seconds: f64) -> DeltaSpec {
    DeltaSpec::Calendar {
        months: 0,
        remainder: delta_from_seconds(seconds),
    }
}

fn delta_from_seconds(seconds: f64) -> TimeDelta {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round() as i64;
    TimeDelta::seconds(whole as i64) + TimeDelta::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;

    #[test]
    fn unit_delta_hours_with_fraction() {
        assert_eq!(
            parse_delta("+1.5h"),
            Some(DeltaSpec::Calendar {
                months: 0,
                remainder: TimeDelta::seconds(5_400),
            })
        );
    }

    #[test]
    fn unit_delta_days_with_space_after_sign() {
        assert_eq!(
            parse_delta("- 7d"),
            Some(DeltaSpec::Calendar {
                months: 0,
                remainder: TimeDelta::days(-7),
            })
        );
    }

    #[test]
    fn unit_delta_whole_month_is_calendar_relative() {
        assert_eq!(
            parse_delta("+1mo"),
            Some(DeltaSpec::Calendar {
                months: 1,
                remainder: TimeDelta::zero(),
            })
        );
    }

    #[test]
    fn clock_delta_is_flat() {
        assert_eq!(
            parse_delta("+01:30:00"),
            Some(DeltaSpec::Clock(TimeDelta::seconds(5_400)))
        );
    }

    #[test]
    fn clock_delta_allows_empty_components() {
        assert_eq!(
            parse_delta("-1:30:"),
            Some(DeltaSpec::Clock(TimeDelta::seconds(-5_400)))
        );
    }

    #[test]
    fn trailing_text_after_whitespace_is_ignored() {
        assert_eq!(parse_delta("+1h later"), parse_delta("+1h"));
        assert_eq!(parse_delta("+1hx"), None);
    }

    #[test]
    fn sign_is_required() {
        assert_eq!(parse_delta("7d"), None);
        assert_eq!(parse_delta("01:30:00"), None);
    }

    #[test]
    fn unit_spelling_variants_agree() {
        for spelling in ["+2w", "+2wk", "+2week", "+2 weeks", "+2WEEKS"] {
            assert_eq!(parse_delta(spelling), parse_delta("+2w"), "{spelling}");
        }
    }

    #[test]
    fn integer_part_is_capped_at_eight_digits() {
        assert!(parse_delta("+99999999d").is_some());
        assert_eq!(parse_delta("+999999999d"), None);
    }

    #[test]
    fn fractional_year_splits_into_months_and_days() {
        match parse_delta("+1.5y") {
            Some(DeltaSpec::Calendar { months, remainder }) => {
                assert_eq!(months, 12);
                assert_eq!(remainder, delta_from_seconds(0.5 * 365.0 * 86_400.0));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn applying_a_month_clamps_the_day() {
        let instant = Instant::new(
            Utc.with_ymd_and_hms(2023, 1, 31, 9, 0, 0).unwrap(),
            Zone::Named(Tz::UTC),
        );
        let shifted = parse_delta("+1mo").unwrap().apply(&instant).unwrap();
        assert_eq!(
            shifted.utc(),
            Utc.with_ymd_and_hms(2023, 2, 28, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn milliseconds_scale_down_to_seconds() {
        assert_eq!(
            parse_delta("+250ms"),
            Some(DeltaSpec::Calendar {
                months: 0,
                remainder: TimeDelta::milliseconds(250),
            })
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn units() -> impl Strategy<Value = &'static str> {
            prop::sample::select(vec![
                "y", "yr", "years", "mo", "months", "w", "weeks", "d", "days", "h", "hours",
                "m", "minutes", "s", "seconds", "ms",
            ])
        }

        proptest! {
            #[test]
            fn unit_grammar_is_sign_antisymmetric(
                int in 0u32..100_000_000,
                frac in 0u32..10,
                unit in units(),
            ) {
                let body = format!("{int}.{frac}{unit}");
                let plus = parse_delta(&format!("+{body}"));
                let minus = parse_delta(&format!("-{body}"));
                prop_assert!(plus.is_some());
                prop_assert_eq!(plus.map(|d| -d), minus);
            }

            #[test]
            fn clock_grammar_is_sign_antisymmetric(
                h in 0u32..100,
                m in 0u32..100,
                s in 0u32..100,
            ) {
                let body = format!("{h}:{m}:{s}");
                let plus = parse_delta(&format!("+{body}"));
                let minus = parse_delta(&format!("-{body}"));
                prop_assert!(plus.is_some());
                prop_assert_eq!(plus.map(|d| -d), minus);
            }
        }
    }
}
