//! Outbound-leg metrics: stop count and flown duration
//!
//! Offers for round trips arrive with the outbound and return segments
//! concatenated into a single list. The outbound leg is taken to end at the
//! first segment that lands at the searched destination; when no segment
//! does (or no destination is known) the whole list counts as outbound.
//! Multi-city trips, or trips that pass through the destination twice, are
//! not split correctly by this rule.

use crate::{FlightOffer, FlightSegment};
use regex::Regex;
use std::sync::OnceLock;

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").expect("duration pattern is valid")
    })
}

/// Parse an ISO-8601 `PT[nH][mM]` duration into minutes.
///
/// Anything else yields 0 rather than an error so that sorting and
/// filtering stay total over malformed provider data.
pub fn parse_iso_duration_minutes(iso: &str) -> u32 {
    if !iso.starts_with("PT") {
        return 0;
    }

    let Some(captures) = duration_regex().captures(iso) else {
        return 0;
    };

    let component = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    component(1).saturating_mul(60).saturating_add(component(2))
}

/// Segments from the origin up to and including the first arrival at
/// `destination` (ASCII case-insensitive).
pub fn outbound_segments<'a>(offer: &'a FlightOffer, destination: &str) -> &'a [FlightSegment] {
    let destination = destination.trim();
    if destination.is_empty() {
        return &offer.segments;
    }

    match offer
        .segments
        .iter()
        .position(|seg| seg.arrival_airport.eq_ignore_ascii_case(destination))
    {
        Some(index) => &offer.segments[..=index],
        None => &offer.segments,
    }
}

/// Number of intermediate landings on the outbound leg
pub fn outbound_stops(offer: &FlightOffer, destination: &str) -> u32 {
    let legs = outbound_segments(offer, destination).len();
    legs.saturating_sub(1) as u32
}

/// Sum of the outbound segments' flown durations, in minutes
pub fn outbound_duration_minutes(offer: &FlightOffer, destination: &str) -> u32 {
    outbound_segments(offer, destination)
        .iter()
        .map(|seg| parse_iso_duration_minutes(&seg.duration))
        .fold(0u32, u32::saturating_add)
}

/// Human readable duration: `2h 30m`, `3h`, `45m`, or `-` when unknown.
pub fn format_duration(minutes: u32) -> String {
    if minutes == 0 {
        return "-".to_string();
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

pub fn stops_label(stops: u32) -> String {
    match stops {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}
