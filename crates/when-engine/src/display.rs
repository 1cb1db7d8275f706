//! Assembles the set of timezones to show for one resolved instant.
//!
//! The zone list is ordered: the input's own zone, the machine's zone, any
//! explicitly requested extra zones, then the always-shown set. Zones whose
//! fingerprint (abbreviation-or-offset label plus UTC offset) has already
//! been seen are dropped, so two tokens that currently mean the same clock
//! produce one line.

use chrono::Timelike;
use chrono_tz::Tz;
use serde::Serialize;

use crate::humanize::{humanize, Phrasing, Style};
use crate::locale::{format_in_zone, DateStyle};
use crate::zone::{Instant, Zone, ZoneFingerprint};

/// Zones appended to every display regardless of input.
const ALWAYS_SHOWN: &[Tz] = &[Tz::UTC];

/// One displayed timezone: machine-readable and locale-formatted renderings
/// of the same instant.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneLine {
    /// RFC 3339 with millisecond precision and numeric offset.
    pub iso: String,
    /// The same instant the way the zone's primary locale writes it.
    pub localized: String,
}

/// Everything the primary display mode needs, already rendered.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayReport {
    /// Unix epoch seconds of the displayed instant.
    pub epoch_seconds: i64,
    /// One entry per deduplicated display zone, first-seen order.
    pub zone_lines: Vec<ZoneLine>,
    /// Consolidated single-sentence rendering, when requested.
    pub consolidated: Option<String>,
    /// `~<oneterm> (<exact seconds>)` relative to now.
    pub relative: String,
    /// Extended-mode extras: multiterm-precise, multiterm, oneterm-alt.
    pub relative_extended: Vec<String>,
}

/// Output-shaping switches for [`compose`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// Add the consolidated one-line sentence.
    pub oneline: bool,
    /// Add the extended relative-time renderings (also implies the
    /// consolidated sentence).
    pub extended: bool,
}

/// The deduplicated views of `input` in every zone the display should show.
pub fn display_views(input: &Instant, local: Zone, extra: &[Zone]) -> Vec<Instant> {
    let mut zones = vec![input.zone(), local];
    zones.extend_from_slice(extra);
    zones.extend(ALWAYS_SHOWN.iter().map(|tz| Zone::Named(*tz)));

    let mut seen: Vec<ZoneFingerprint> = Vec::new();
    let mut views = Vec::new();
    for zone in zones {
        let view = input.in_zone(zone);
        let fingerprint = view.fingerprint();
        if seen.contains(&fingerprint) {
            continue;
        }
        seen.push(fingerprint);
        views.push(view);
    }
    views
}

/// Build the full display report for one resolved instant.
pub fn compose(
    input: &Instant,
    now: &Instant,
    local: Zone,
    extra: &[Zone],
    options: &DisplayOptions,
) -> DisplayReport {
    let views = display_views(input, local, extra);

    let zone_lines = views
        .iter()
        .map(|view| ZoneLine {
            iso: view.to_rfc3339_millis(),
            localized: format_in_zone(view, true, DateStyle::Long),
        })
        .collect();

    let consolidated = (options.oneline || options.extended).then(|| consolidated_line(&views));

    let relative = format!(
        "~{} ({})",
        humanize(now, input, Style::OneTerm, Phrasing::RelativeToNow),
        humanize(now, input, Style::Seconds, Phrasing::RelativeToNow),
    );
    let relative_extended = if options.extended {
        vec![
            humanize(now, input, Style::MultiTermPrecise, Phrasing::RelativeToNow),
            format!(
                "~{}",
                humanize(now, input, Style::MultiTerm, Phrasing::RelativeToNow)
            ),
            format!(
                "~{}",
                humanize(now, input, Style::OneTermAlt, Phrasing::RelativeToNow)
            ),
        ]
    } else {
        Vec::new()
    };

    DisplayReport {
        epoch_seconds: input.epoch_seconds(),
        zone_lines,
        consolidated,
        relative,
        relative_extended,
    }
}

/// All displayed zones in one sentence, omitting dates that repeat.
fn consolidated_line(views: &[Instant]) -> String {
    let shared_date = views
        .windows(2)
        .all(|pair| pair[0].local_naive().date() == pair[1].local_naive().date());
    let with_seconds = views
        .first()
        .map(|view| view.utc().second() != 0)
        .unwrap_or(false);

    let mut line = match views.first() {
        Some(first) => format_in_zone(first, with_seconds, DateStyle::Long),
        None => return String::new(),
    };

    let date_style = if shared_date {
        DateStyle::None
    } else {
        DateStyle::Short
    };
    let rest: Vec<String> = views[1..]
        .iter()
        .map(|view| format_in_zone(view, with_seconds, date_style))
        .collect();
    if !rest.is_empty() {
        line.push_str(&format!(" ({})", rest.join(" / ")));
    }
    line
}

/// The humanized block for the difference between two absolute instants.
pub fn compose_difference(a: &Instant, b: &Instant, extended: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "~{} ({})",
        humanize(a, b, Style::OneTerm, Phrasing::Signed),
        humanize(a, b, Style::Seconds, Phrasing::Signed),
    )];
    if extended {
        lines.push(humanize(a, b, Style::MultiTermPrecise, Phrasing::Signed));
        lines.push(format!(
            "~{}",
            humanize(a, b, Style::MultiTerm, Phrasing::Signed)
        ));
        lines.push(format!(
            "~{}",
            humanize(a, b, Style::OneTermAlt, Phrasing::Signed)
        ));
    }
    lines
}

/// ISO-only mode: the single UTC RFC 3339 instant and nothing else.
pub fn iso_utc(input: &Instant) -> String {
    input.in_zone(Zone::Named(Tz::UTC)).to_rfc3339_millis()
}
