//! Availability commands - the provider's weekly working hours.

use clap::Subcommand;
use console::style;

use sb_core::config::ConfigHandle;
use sb_core::error::{SbError, SbResult};
use sb_models::{Availability, TimeRange};

use super::{new_table, print_json, require_session};
use crate::OutputFormat;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Subcommand)]
pub enum AvailabilityAction {
    /// Show the weekly schedule.
    Show,
    /// Change one day, or the slot settings.
    Set {
        /// Day of the week (e.g. monday).
        #[arg(short, long)]
        day: Option<String>,
        /// Working interval as HH:MM-HH:MM; repeat for split shifts.
        #[arg(long = "hours")]
        hours: Vec<String>,
        /// Mark the day as off.
        #[arg(long, conflicts_with = "hours")]
        off: bool,
        /// Minutes per bookable slot.
        #[arg(long)]
        slot_duration: Option<u32>,
        /// Minutes between slots.
        #[arg(long)]
        buffer_time: Option<u32>,
    },
}

pub async fn run(config: ConfigHandle, action: AvailabilityAction, format: OutputFormat) -> SbResult<()> {
    let (session, _user) = require_session(&config).await?;
    let api = session.api();

    match action {
        AvailabilityAction::Show => {
            let availability = api.provider_availability().await?;
            print_availability(&availability, format)
        }
        AvailabilityAction::Set {
            day,
            hours,
            off,
            slot_duration,
            buffer_time,
        } => {
            let mut availability = api.provider_availability().await?;

            if let Some(day) = day {
                let day = normalize_day(&day)?;
                if off {
                    availability.availability.remove(day);
                } else if hours.is_empty() {
                    return Err(SbError::Config(format!("give --hours or --off for {day}")));
                } else {
                    let ranges = hours
                        .iter()
                        .map(|h| parse_range(h))
                        .collect::<SbResult<Vec<_>>>()?;
                    availability.availability.insert(day.to_string(), ranges);
                }
            } else if off || !hours.is_empty() {
                return Err(SbError::Config("--hours and --off need --day".into()));
            }
            if let Some(minutes) = slot_duration {
                availability.slot_duration = minutes;
            }
            if let Some(minutes) = buffer_time {
                availability.buffer_time = minutes;
            }

            let invalid = availability.invalid_days();
            if !invalid.is_empty() {
                return Err(SbError::Config(format!(
                    "start time must be before end time on {}",
                    invalid.join(", ")
                )));
            }

            let saved = api.update_provider_availability(&availability).await?;
            if let OutputFormat::Text = format {
                println!("{}", style("Availability updated.").green());
            }
            print_availability(&saved, format)
        }
    }
}

/// Canonical weekday name for user input like "mon" or "MONDAY".
fn normalize_day(input: &str) -> SbResult<&'static str> {
    let lower = input.trim().to_ascii_lowercase();
    if lower.len() >= 3 {
        for day in WEEKDAYS {
            if day.to_ascii_lowercase().starts_with(&lower) {
                return Ok(day);
            }
        }
    }
    Err(SbError::Config(format!("not a day of the week: {input}")))
}

/// Parse "9:00-17:30" into a zero-padded range.
fn parse_range(input: &str) -> SbResult<TimeRange> {
    let (from, to) = input
        .split_once('-')
        .ok_or_else(|| SbError::Config(format!("expected HH:MM-HH:MM, got {input}")))?;
    Ok(TimeRange::new(parse_time(from)?, parse_time(to)?))
}

fn parse_time(input: &str) -> SbResult<String> {
    let input = input.trim();
    let invalid = || SbError::Config(format!("not a time of day: {input}"));
    let (h, m) = input.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(format!("{hour:02}:{minute:02}"))
}

fn print_availability(availability: &Availability, format: OutputFormat) -> SbResult<()> {
    match format {
        OutputFormat::Json => print_json(availability)?,
        OutputFormat::Text => {
            let mut table = new_table(vec!["Day", "Hours"]);
            for day in WEEKDAYS {
                let hours = match availability.availability.get(day) {
                    Some(ranges) if !ranges.is_empty() => ranges
                        .iter()
                        .map(|r| format!("{}-{}", r.from, r.to))
                        .collect::<Vec<_>>()
                        .join(", "),
                    _ => "off".to_string(),
                };
                table.add_row(vec![day.to_string(), hours]);
            }
            println!("{table}");
            println!(
                "Slots of {} min with {} min buffer",
                availability.slot_duration, availability.buffer_time
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_day() {
        assert_eq!(normalize_day("mon").unwrap(), "Monday");
        assert_eq!(normalize_day("SATURDAY").unwrap(), "Saturday");
        assert!(normalize_day("mo").is_err());
        assert!(normalize_day("someday").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("9:00-17:30").unwrap(), TimeRange::new("09:00", "17:30"));
        assert!(parse_range("9-17").is_err());
        assert!(parse_range("25:00-26:00").is_err());
        assert!(parse_range("09:00").is_err());
    }
}
