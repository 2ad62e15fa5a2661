//! Conversion from Darwin DTOs to domain types.
//!
//! This module handles the transformation of raw Darwin API responses into
//! our validated domain types, including time parsing with rollover detection.

use chrono::NaiveDate;

use crate::domain::{
    AtocCode, Call, CallIndex, Crs, Headcode, RailTime, Service, ServiceCandidate, ServiceRef,
    parse_time_sequence, parse_time_sequence_reverse,
};

use super::types::{CallingPoint, ServiceItemWithCallingPoints, StationBoardWithDetails};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a CRS code
    #[error("invalid CRS code: {0}")]
    InvalidCrs(String),

    /// Failed to parse a time string
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid service structure
    #[error("invalid service: {0}")]
    InvalidService(&'static str),
}

/// Result of converting a Darwin service item.
pub struct ConvertedService {
    /// Summary info for display on departure boards
    pub candidate: ServiceCandidate,
    /// Full service with calling points
    pub service: Service,
}

/// Convert a departure board response to domain types.
///
/// Returns converted services paired with candidates for display.
pub fn convert_station_board(
    board: &StationBoardWithDetails,
    board_date: NaiveDate,
) -> Result<Vec<ConvertedService>, ConversionError> {
    let board_crs =
        Crs::parse(&board.crs).map_err(|_| ConversionError::InvalidCrs(board.crs.clone()))?;

    let train_services = board.train_services.as_deref().unwrap_or(&[]);

    let mut results = Vec::with_capacity(train_services.len());

    for service_item in train_services {
        match convert_service_item(service_item, &board_crs, &board.location_name, board_date) {
            Ok(converted) => results.push(converted),
            Err(e) => {
                // Log and skip invalid services rather than failing the whole board
                // In production, we'd use proper logging here
                eprintln!(
                    "Warning: skipping service {}: {}",
                    service_item.service_id, e
                );
            }
        }
    }

    Ok(results)
}

/// Convert a single service item to domain types.
pub fn convert_service_item(
    item: &ServiceItemWithCallingPoints,
    board_crs: &Crs,
    board_station_name: &str,
    board_date: NaiveDate,
) -> Result<ConvertedService, ConversionError> {
    // Parse the service reference
    let service_ref = ServiceRef::new(item.service_id.clone(), *board_crs);

    // Parse headcode from RSID if available (format: "GW123400" -> "1234")
    let headcode = item.rsid.as_ref().and_then(|rsid| {
        // RSID format is typically "XX1234YY" where XX is operator, 1234 is headcode
        if rsid.len() >= 6 {
            Headcode::parse(&rsid[2..6])
        } else {
            None
        }
    });

    // Parse operator code
    let operator_code = item
        .operator_code
        .as_ref()
        .and_then(|c| AtocCode::parse(c).ok());

    // Parse scheduled departure time at board station
    let scheduled_departure = item
        .std
        .as_ref()
        .ok_or(ConversionError::MissingField("std (scheduled departure)"))?;
    let scheduled_departure = RailTime::parse_hhmm(scheduled_departure, board_date)
        .map_err(|_| ConversionError::InvalidTime(scheduled_departure.clone()))?;

    // Parse expected departure (may be "On time", "Delayed", "Cancelled", or a time)
    let expected_departure = parse_expected_time(item.etd.as_deref(), &scheduled_departure);

    // Parse destination info
    let (destination, destination_crs) = parse_destination(item);

    // Build the ServiceCandidate
    let candidate = ServiceCandidate {
        service_ref: service_ref.clone(),
        headcode,
        scheduled_departure,
        expected_departure,
        destination,
        destination_crs,
        operator: item.operator.clone().unwrap_or_default(),
        operator_code,
        platform: item.platform.clone(),
        is_cancelled: item.is_cancelled.unwrap_or(false),
    };

    // Build the full Service with calling points
    let (calls, board_station_idx) = build_calls(item, board_crs, board_station_name, board_date)?;

    let service = Service {
        service_ref,
        headcode,
        operator: item.operator.clone().unwrap_or_default(),
        operator_code,
        calls,
        board_station_idx,
    };

    Ok(ConvertedService { candidate, service })
}

/// Parse an expected time field, which may be a time or a status string.
fn parse_expected_time(etd: Option<&str>, scheduled: &RailTime) -> Option<RailTime> {
    let etd = etd?;

    // Check for status strings
    match etd {
        "On time" => Some(*scheduled),
        "Cancelled" | "Delayed" | "" => None,
        time_str => {
            // Try to parse as time
            RailTime::parse_hhmm(time_str, scheduled.date()).ok()
        }
    }
}

/// Extract destination name and CRS from service item.
fn parse_destination(item: &ServiceItemWithCallingPoints) -> (String, Option<Crs>) {
    let destinations = item.destination.as_ref();

    match destinations {
        Some(dests) if !dests.is_empty() => {
            let first = &dests[0];
            let crs = Crs::parse(&first.crs).ok();

            // Build destination string, handling multiple destinations
            let name = if dests.len() == 1 {
                first.location_name.clone()
            } else {
                // Multiple destinations (split service)
                dests
                    .iter()
                    .map(|d| d.location_name.as_str())
                    .collect::<Vec<_>>()
                    .join(" & ")
            };

            (name, crs)
        }
        _ => ("Unknown".to_string(), None),
    }
}

/// Build the calls list and determine board station index.
fn build_calls(
    item: &ServiceItemWithCallingPoints,
    board_crs: &Crs,
    board_station_name: &str,
    board_date: NaiveDate,
) -> Result<(Vec<Call>, CallIndex), ConversionError> {
    let mut calls = Vec::new();

    // 1. Parse previous calling points (if any)
    let previous_calls = parse_previous_calling_points(item, board_date)?;

    // 2. Create the board station call
    let board_call = create_board_station_call(item, board_crs, board_station_name, board_date)?;

    // 3. Parse subsequent calling points (if any)
    // Pass the board station's scheduled departure for midnight rollover detection
    // Fall back to sta if std is not available (e.g., at a terminus)
    let anchor_time = item.std.as_deref().or(item.sta.as_deref());
    let subsequent_calls = parse_subsequent_calling_points(item, anchor_time, board_date)?;

    // 4. Merge: previous + board + subsequent
    calls.extend(previous_calls);
    let board_station_idx = CallIndex(calls.len());
    calls.push(board_call);
    calls.extend(subsequent_calls);

    Ok((calls, board_station_idx))
}

/// Parse previous calling points into domain Calls.
fn parse_previous_calling_points(
    item: &ServiceItemWithCallingPoints,
    board_date: NaiveDate,
) -> Result<Vec<Call>, ConversionError> {
    let previous = match &item.previous_calling_points {
        Some(arrays) if !arrays.is_empty() => &arrays[0].calling_point,
        _ => return Ok(Vec::new()),
    };

    if previous.is_empty() {
        return Ok(Vec::new());
    }

    // Previous calling points are in forward chronological order (origin first).
    // We need to:
    // 1. Reverse them to get reverse chronological order (most recent first)
    // 2. Parse with parse_time_sequence_reverse from board_date
    // 3. Reverse the result back to forward chronological order

    let reversed: Vec<&CallingPoint> = previous.iter().rev().collect();

    // Extract times for parsing
    let times: Vec<Option<&str>> = reversed.iter().map(|cp| cp.st.as_deref()).collect();

    let parsed_times = parse_time_sequence_reverse(&times, board_date)
        .map_err(|e| ConversionError::InvalidTime(e.to_string()))?;

    // Build calls in reverse order (which we'll reverse again)
    // Previous calling points are never the final destination
    let mut calls: Vec<Call> = reversed
        .iter()
        .zip(parsed_times.iter())
        .map(|(cp, time)| calling_point_to_call(cp, *time, false))
        .collect::<Result<Vec<_>, _>>()?;

    // Reverse back to forward chronological order
    calls.reverse();

    Ok(calls)
}

/// Parse subsequent calling points into domain Calls.
///
/// Takes the board station's scheduled departure time to properly handle
/// overnight services that cross midnight.
fn parse_subsequent_calling_points(
    item: &ServiceItemWithCallingPoints,
    board_std: Option<&str>,
    board_date: NaiveDate,
) -> Result<Vec<Call>, ConversionError> {
    let subsequent = match &item.subsequent_calling_points {
        Some(arrays) if !arrays.is_empty() => &arrays[0].calling_point,
        _ => return Ok(Vec::new()),
    };

    if subsequent.is_empty() {
        return Ok(Vec::new());
    }

    // Include the board station departure time as first element to detect midnight rollover.
    // For example: board at 23:30, first subsequent at 00:15 -> should be next day.
    let mut times: Vec<Option<&str>> = Vec::with_capacity(subsequent.len() + 1);
    times.push(board_std);
    times.extend(subsequent.iter().map(|cp| cp.st.as_deref()));

    let parsed_times = parse_time_sequence(&times, board_date)
        .map_err(|e| ConversionError::InvalidTime(e.to_string()))?;

    // Skip the first parsed time (board station) and use the rest
    let count = subsequent.len();
    subsequent
        .iter()
        .zip(parsed_times.iter().skip(1))
        .enumerate()
        .map(|(idx, (cp, time))| {
            let is_final_destination = idx == count - 1;
            calling_point_to_call(cp, *time, is_final_destination)
        })
        .collect()
}

/// Convert a CallingPoint DTO to a domain Call.
///
/// `is_final_destination` indicates whether this is the last stop (terminus),
/// in which case the time represents arrival, not departure.
fn calling_point_to_call(
    cp: &CallingPoint,
    scheduled_time: Option<RailTime>,
    is_final_destination: bool,
) -> Result<Call, ConversionError> {
    let station = Crs::parse(&cp.crs).map_err(|_| ConversionError::InvalidCrs(cp.crs.clone()))?;

    let mut call = Call::new(station, cp.location_name.clone());

    // Set times based on whether this is arrival or departure
    // For calling points, `st` is the scheduled time (departure for intermediate,
    // arrival for terminus), and `et`/`at` is the expected/actual time.
    if let Some(st) = scheduled_time {
        if is_final_destination {
            // Final destination: time is arrival
            call.booked_arrival = Some(st);

            // Parse realtime (et or at)
            let realtime = cp.at.as_deref().or(cp.et.as_deref());
            if let Some(rt_str) = realtime
                && let Ok(rt) = RailTime::parse_hhmm(rt_str, st.date())
            {
                call.realtime_arrival = Some(rt);
            }
        } else {
            // Intermediate stop: time is departure
            call.booked_departure = Some(st);

            // Parse realtime (et or at)
            let realtime = cp.at.as_deref().or(cp.et.as_deref());
            if let Some(rt_str) = realtime
                && let Ok(rt) = RailTime::parse_hhmm(rt_str, st.date())
            {
                call.realtime_departure = Some(rt);
            }
        }
    }

    call.is_cancelled = cp.is_cancelled.unwrap_or(false);

    Ok(call)
}

/// Create the Call for the board station itself.
fn create_board_station_call(
    item: &ServiceItemWithCallingPoints,
    board_crs: &Crs,
    board_station_name: &str,
    board_date: NaiveDate,
) -> Result<Call, ConversionError> {
    let mut call = Call::new(*board_crs, board_station_name.to_string());

    // Parse arrival time (sta/eta) if present
    if let Some(sta) = &item.sta
        && let Ok(t) = RailTime::parse_hhmm(sta, board_date)
    {
        call.booked_arrival = Some(t);

        // Parse expected arrival
        if let Some(rt) = parse_expected_time(item.eta.as_deref(), &t) {
            call.realtime_arrival = Some(rt);
        }
    }

    // Parse departure time (std/etd)
    if let Some(std) = &item.std
        && let Ok(t) = RailTime::parse_hhmm(std, board_date)
    {
        call.booked_departure = Some(t);

        // Parse expected departure
        if let Some(rt) = parse_expected_time(item.etd.as_deref(), &t) {
            call.realtime_departure = Some(rt);
        }
    }

    call.platform = item.platform.clone();
    call.is_cancelled = item.is_cancelled.unwrap_or(false);

    Ok(call)
}
