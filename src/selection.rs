use std::cmp::Reverse;

use uuid::Uuid;

use crate::{error::JobError, types::Flight};

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub registered: usize,
    pub cursor_index: usize,
    /// Flights completed after the cursor, oldest first.
    pub new_flights: Vec<Flight>,
}

/// Picks the flights completed since `cursor` out of one poll.
///
/// Unregistered flights are dropped before anything else, so they never count
/// as new. The poll is ordered by completion time here since OnAir does not
/// guarantee any order; flights without a completion time sort last. If the
/// cursor isn't among the registered flights nothing is selected.
pub fn select_new_flights(flights: Vec<Flight>, cursor: Uuid) -> Result<Selection, JobError> {
    let mut flights: Vec<Flight> = flights.into_iter().filter(|f| f.registered).collect();

    flights.sort_by_key(|f| Reverse(f.engine_off_real_time));

    let cursor_index = flights
        .iter()
        .position(|f| f.id == cursor)
        .ok_or(JobError::CursorNotFound(cursor))?;

    let registered = flights.len();

    flights.truncate(cursor_index);
    flights.reverse();

    Ok(Selection {
        registered,
        cursor_index,
        new_flights: flights,
    })
}
