//! RealTimeTrains URL generation.
//!
//! Generates links to RealTimeTrains for service verification.
//! Since Darwin doesn't provide train UIDs, we link to RTT's search
//! page rather than directly to a service.

use chrono::NaiveDate;

use crate::domain::{Crs, RailTime};

/// Generate an RTT search URL for services at a station around a given time.
///
/// This creates a URL to RTT's detailed search page, showing departures
/// from the station within a time window around the specified time.
///
/// # Arguments
///
/// * `station` - The station to search from
/// * `date` - The date of travel
/// * `time` - The approximate departure time
/// * `window_mins` - Minutes either side of `time` to include (default: 15)
///
/// # Example
///
/// ```ignore
/// // For a train departing Woodbridge at 10:23 on 2026-01-03:
/// let url = rtt_search_url(&crs("WDB"), date, time, 15);
/// // Returns: "https://www.realtimetrains.co.uk/search/detailed/WDB/2026-01-03/1008-1038"
/// ```
pub fn rtt_search_url(station: &Crs, date: NaiveDate, time: RailTime, window_mins: u16) -> String {
    let mins = (time.hour() * 60 + time.minute()) as u16;
    let start_mins = mins.saturating_sub(window_mins);
    let end_mins = (mins + window_mins).min(1439); // Cap at 23:59

    format!(
        "https://www.realtimetrains.co.uk/search/detailed/{}/{}/{:02}{:02}-{:02}{:02}",
        station.as_str(),
        date.format("%Y-%m-%d"),
        start_mins / 60,
        start_mins % 60,
        end_mins / 60,
        end_mins % 60,
    )
}

/// Generate an RTT search URL with a default 15-minute window.
pub fn rtt_search_url_default(station: &Crs, date: NaiveDate, time: RailTime) -> String {
    rtt_search_url(station, date, time, 15)
}
