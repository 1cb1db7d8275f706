//! when - convert a human-typed time phrase across timezones.
//!
//! Everything interesting lives in when-engine; this binary owns argv
//! handling, the ` + `/` - ` arithmetic infix, and terminal output.

use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use when_engine::{
    compose, compose_difference, format_in_zone, iso_utc, parse_delta, parse_instant,
    split_display_clause, DateStyle, DisplayOptions, Instant, WhenError, Zone, ZoneResolver,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Convert a human-typed time phrase into aligned timestamps across
/// timezones.
#[derive(Parser, Debug)]
#[command(name = "when")]
#[command(version, about, long_about = None)]
#[command(after_help = "\
Examples:
  when
  when 1621108906
  when 1621108906000
  when May 15, 2021 01:01:46 PM PDT
  when 2021 May 15th 1:01 PM GMT-0700
  when 2021-05-15T20:01:46.000+00:00
  when 5pm PDT in CEST
  when now in Asia/Hong_Kong
  when now in IST,EDT,CEST,Asia/Tokyo
  when - 7d
  when + 1.5h
  when + 01:30:00")]
struct Cli {
    /// Consolidate every displayed timezone into one line
    #[arg(short = 'o', long = "one-line")]
    one_line: bool,

    /// Show extended relative-time formats
    #[arg(short = 'e', long = "extended")]
    extended: bool,

    /// Output just an ISO 8601 UTC time, for use in scripts
    #[arg(short = 'i', long = "iso8601")]
    iso8601: bool,

    /// Show the full error detail on failure
    #[arg(long)]
    debug: bool,

    /// The time phrase; all arguments are joined with single spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    phrase: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.debug {
                eprintln!("Error: {err:?}");
            } else {
                eprintln!("Error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Read the clock once; every later step sees this same instant.
    let resolver = ZoneResolver::new();
    let now = Instant::new(Utc::now(), resolver.local_zone());

    let phrase = cli
        .phrase
        .iter()
        .map(|arg| arg.trim())
        .collect::<Vec<_>>()
        .join(" ");

    let (phrase, zone_tokens) = split_display_clause(&phrase);
    let extra_zones = zone_tokens
        .iter()
        .map(|token| resolver.resolve(token))
        .collect::<when_engine::Result<Vec<Zone>>>()?;

    if let Some((a_phrase, b_phrase, operator)) = split_arithmetic(&phrase) {
        return run_arithmetic(
            cli, &resolver, &now, &extra_zones, a_phrase, b_phrase, operator,
        );
    }

    let (instant, strategy) = parse_instant(&phrase, &now, &resolver)?;
    if cli.extended {
        println!("Input parsed using format: {strategy}");
    }
    print_instant(cli, &resolver, &now, &instant, &extra_zones, "");
    Ok(())
}

/// `a - b` and `a + b` time arithmetic. `b` may be another absolute time
/// (subtraction only) or a delta expression.
fn run_arithmetic(
    cli: &Cli,
    resolver: &ZoneResolver,
    now: &Instant,
    extra_zones: &[Zone],
    a_phrase: &str,
    b_phrase: &str,
    operator: char,
) -> Result<()> {
    let (a, _) = parse_instant(a_phrase, now, resolver)?;

    match parse_instant(b_phrase, now, resolver) {
        Ok((b, _)) => {
            if operator == '+' {
                return Err(WhenError::InvalidOperation(
                    "cannot add two absolute times together".to_string(),
                )
                .into());
            }
            if !cli.iso8601 {
                println!(
                    "{} {operator} {}",
                    format_in_zone(&a, true, DateStyle::Long),
                    format_in_zone(&b, true, DateStyle::Long),
                );
            }
            for line in compose_difference(&a, &b, cli.extended) {
                println!("= {line}");
            }
            Ok(())
        }
        Err(parse_err) => {
            // Not an absolute time; maybe the right operand is a delta.
            let delta =
                parse_delta(&format!("{operator} {b_phrase}")).ok_or(parse_err)?;
            if !cli.iso8601 {
                println!(
                    "{} {operator} {b_phrase}",
                    format_in_zone(&a, true, DateStyle::Long),
                );
            }
            let shifted = delta.apply(&a).ok_or_else(|| {
                WhenError::InvalidOperation("shifted time is out of range".to_string())
            })?;
            print_instant(cli, resolver, now, &shifted, extra_zones, "= ");
            Ok(())
        }
    }
}

fn print_instant(
    cli: &Cli,
    resolver: &ZoneResolver,
    now: &Instant,
    instant: &Instant,
    extra_zones: &[Zone],
    prefix: &str,
) {
    if cli.iso8601 {
        println!("{}", iso_utc(instant));
        return;
    }

    let options = DisplayOptions {
        oneline: cli.one_line,
        extended: cli.extended,
    };
    let report = compose(instant, now, resolver.local_zone(), extra_zones, &options);

    let mut lines = vec![format!("{BOLD}{}{RESET}", report.epoch_seconds)];
    for zone_line in &report.zone_lines {
        lines.push(format!("{}     {}", zone_line.iso, zone_line.localized));
    }
    if let Some(consolidated) = &report.consolidated {
        lines.push(consolidated.clone());
    }
    lines.push(report.relative.clone());
    lines.extend(report.relative_extended.iter().cloned());

    for line in lines {
        println!("{prefix}{line}");
    }
}

/// Split at a ` - ` or ` + ` infix; a leading sign (`- 7d`) is not an infix.
fn split_arithmetic(phrase: &str) -> Option<(&str, &str, char)> {
    if let Some((a, b)) = phrase.split_once(" - ") {
        return Some((a, b, '-'));
    }
    if let Some((a, b)) = phrase.split_once(" + ") {
        return Some((a, b, '+'));
    }
    None
}
