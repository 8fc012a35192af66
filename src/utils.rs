use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Airport, Flight};

pub const UNKNOWN: &str = "Unknown";

static REPUTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Reputation: (\d{1,2}\.\d{2}%)").unwrap());
static DISTANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for ([0-9,]{1,5}) NM").unwrap());

pub fn reputation_delta(narrative: &str) -> String {
    REPUTATION
        .captures(narrative)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn distance(narrative: &str) -> String {
    DISTANCE
        .captures(narrative)
        .map(|caps| format!("{}nm", &caps[1]))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn icao(airport: Option<&Airport>) -> &str {
    airport
        .map(|a| a.icao.as_str())
        .filter(|code| !code.is_empty())
        .unwrap_or(UNKNOWN)
}

pub fn format_message(flight: &Flight) -> String {
    let narrative = flight.narrative();

    let origin = icao(flight.departure_airport.as_ref());
    let destination = icao(flight.arrival_actual_airport.as_ref());

    format!(
        "Company {} ({}) completed a flight!\n\n\
        Flew from {} to {} ({})\n\
        Earned {}xp and {} reputation",
        flight.company.name,
        flight.company.airline_code,
        origin,
        destination,
        distance(narrative),
        flight.xp_missions,
        reputation_delta(narrative),
    )
}
