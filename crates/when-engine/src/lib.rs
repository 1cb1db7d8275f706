//! # when-engine
//!
//! Deterministic resolution of human-typed time phrases.
//!
//! One phrase (an absolute timestamp, a natural-language relative
//! expression, a bare timezone, or delta arithmetic) becomes a zoned
//! instant, a set of aligned per-timezone renderings, and a humanized
//! statement of how far that moment is from "now". All functions take
//! explicit inputs: the caller reads the clock once and threads the anchor
//! through, so one invocation is internally consistent and tests inject a
//! frozen instant instead of stubbing a clock.
//!
//! ## Modules
//!
//! - [`parse`] — the ordered parsing cascade and zone-attachment invariant
//! - [`delta`] — signed duration expressions (`+1.5h`, `-7d`, `+01:30:00`)
//! - [`humanize`] — relative-time rendering in several phrasing styles
//! - [`zone`] — timezone resolution and the zoned-instant type
//! - [`locale`] — 12h/24h clock selection per zone territory
//! - [`display`] — display-zone collection, dedup, and report assembly
//! - [`error`] — error types

pub mod delta;
pub mod display;
pub mod error;
pub mod humanize;
pub mod locale;
pub mod parse;
pub mod zone;

pub use delta::{parse_delta, DeltaSpec};
pub use display::{
    compose, compose_difference, display_views, iso_utc, DisplayOptions, DisplayReport, ZoneLine,
};
pub use error::{Result, WhenError};
pub use humanize::{humanize, Phrasing, Style};
pub use locale::{format_in_zone, DateStyle};
pub use parse::{
    attach_zone, parse_instant, parse_phrase, split_display_clause, Parsed, PendingInstant,
};
pub use zone::{Instant, Zone, ZoneFingerprint, ZoneResolver, DEFAULT_ALIASES};
