//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Journey, Leg, RailTime, Segment, Service, Walk};

/// Request to search for services.
#[derive(Debug, Deserialize)]
pub struct SearchServiceRequest {
    /// Origin station CRS code
    pub origin: String,

    /// Optional destination to filter results
    pub destination: Option<String>,

    /// Time in HH:MM format (defaults to now)
    pub time: Option<String>,

    /// Optional headcode to search for (e.g., "1A23")
    pub headcode: Option<String>,
}

/// A service in search results.
#[derive(Debug, Serialize)]
pub struct ServiceResult {
    /// Darwin service ID (ephemeral)
    pub service_id: String,

    /// Headcode (e.g., "1A23")
    pub headcode: Option<String>,

    /// Operator name
    pub operator: String,

    /// Destination name
    pub destination: String,

    /// Scheduled departure time
    pub scheduled_departure: String,

    /// Expected departure time (may differ from scheduled)
    pub expected_departure: Option<String>,

    /// Platform number
    pub platform: Option<String>,

    /// Whether the service is cancelled
    pub is_cancelled: bool,

    /// Calling points
    pub calls: Vec<CallResult>,
}

/// A calling point in a service.
#[derive(Debug, Serialize)]
pub struct CallResult {
    /// Station CRS code
    pub crs: String,

    /// Station name
    pub name: String,

    /// Scheduled arrival time
    pub scheduled_arrival: Option<String>,

    /// Scheduled departure time
    pub scheduled_departure: Option<String>,

    /// Expected arrival time
    pub expected_arrival: Option<String>,

    /// Expected departure time
    pub expected_departure: Option<String>,

    /// Platform
    pub platform: Option<String>,

    /// Whether this call is cancelled
    pub is_cancelled: bool,

    /// Index in the service calls (for journey planning)
    pub index: usize,
}

/// Response for service search.
#[derive(Debug, Serialize)]
pub struct SearchServiceResponse {
    /// Matching services
    pub services: Vec<ServiceResult>,
}

/// Request to plan a journey.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    /// Darwin service ID of the current train
    pub service_id: String,

    /// Current position index in the service
    pub position: usize,

    /// Destination station CRS code
    pub destination: String,
}

/// A journey option.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Journey segments
    pub segments: Vec<SegmentResult>,

    /// Departure time from origin
    pub departure_time: String,

    /// Arrival time at destination
    pub arrival_time: String,

    /// Total duration in minutes
    pub duration_mins: i64,

    /// Number of changes
    pub changes: usize,
}

/// A segment of a journey.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SegmentResult {
    Train(LegResult),
    Walk(WalkResult),
}

/// A train leg in a journey.
#[derive(Debug, Serialize)]
pub struct LegResult {
    /// Operator name
    pub operator: String,

    /// Headcode
    pub headcode: Option<String>,

    /// Origin station
    pub origin: StationInfo,

    /// Destination station
    pub destination: StationInfo,

    /// Intermediate stops
    pub stops: Vec<StationInfo>,
}

/// A walking segment.
#[derive(Debug, Serialize)]
pub struct WalkResult {
    /// From station
    pub from: StationInfo,

    /// To station
    pub to: StationInfo,

    /// Duration in minutes
    pub duration_mins: i64,
}

/// Station information for display.
#[derive(Debug, Serialize)]
pub struct StationInfo {
    /// CRS code
    pub crs: String,

    /// Station name
    pub name: String,

    /// Time at this station
    pub time: Option<String>,

    /// Platform
    pub platform: Option<String>,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
pub struct PlanJourneyResponse {
    /// Found journey options, best first
    pub journeys: Vec<JourneyResult>,

    /// Number of routes explored
    pub routes_explored: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl ServiceResult {
    /// Create from a domain Service.
    pub fn from_service(service: &Service) -> Self {
        let calls: Vec<CallResult> = service
            .calls
            .iter()
            .enumerate()
            .map(|(i, c)| CallResult {
                crs: c.station.as_str().to_string(),
                name: c.station_name.clone(),
                scheduled_arrival: c.booked_arrival.map(|t| format_time(&t)),
                scheduled_departure: c.booked_departure.map(|t| format_time(&t)),
                expected_arrival: c.expected_arrival().map(|t| format_time(&t)),
                expected_departure: c.expected_departure().map(|t| format_time(&t)),
                platform: c.platform.clone(),
                is_cancelled: c.is_cancelled,
                index: i,
            })
            .collect();

        let destination = service
            .calls
            .last()
            .map(|c| c.station_name.clone())
            .unwrap_or_default();

        let scheduled_departure = service
            .calls
            .get(service.board_station_idx.0)
            .and_then(|c| c.booked_departure)
            .map(|t| format_time(&t))
            .unwrap_or_default();

        let expected_departure = service
            .calls
            .get(service.board_station_idx.0)
            .and_then(|c| c.expected_departure())
            .map(|t| format_time(&t));

        let platform = service
            .calls
            .get(service.board_station_idx.0)
            .and_then(|c| c.platform.clone());

        let is_cancelled = service
            .calls
            .get(service.board_station_idx.0)
            .is_some_and(|c| c.is_cancelled);

        Self {
            service_id: service.service_ref.darwin_id.clone(),
            headcode: service.headcode.as_ref().map(|h| h.to_string()),
            operator: service.operator.clone(),
            destination,
            scheduled_departure,
            expected_departure,
            platform,
            is_cancelled,
            calls,
        }
    }
}

impl JourneyResult {
    /// Create from a domain Journey.
    pub fn from_journey(journey: &Journey) -> Self {
        let segments: Vec<SegmentResult> = journey
            .segments()
            .iter()
            .map(|s| match s {
                Segment::Train(leg) => SegmentResult::Train(LegResult::from_leg(leg)),
                Segment::Walk(walk) => SegmentResult::Walk(WalkResult::from_walk(walk)),
            })
            .collect();

        Self {
            segments,
            departure_time: format_time(&journey.departure_time()),
            arrival_time: format_time(&journey.arrival_time()),
            duration_mins: journey.total_duration().num_minutes(),
            changes: journey.change_count(),
        }
    }
}

impl LegResult {
    /// Create from a domain Leg.
    pub fn from_leg(leg: &Leg) -> Self {
        let origin = StationInfo {
            crs: leg.board_call().station.as_str().to_string(),
            name: leg.board_call().station_name.clone(),
            time: leg
                .board_call()
                .expected_departure()
                .map(|t| format_time(&t)),
            platform: leg.board_call().platform.clone(),
        };

        let destination = StationInfo {
            crs: leg.alight_call().station.as_str().to_string(),
            name: leg.alight_call().station_name.clone(),
            time: leg
                .alight_call()
                .expected_arrival()
                .map(|t| format_time(&t)),
            platform: leg.alight_call().platform.clone(),
        };

        // Get intermediate stops (exclude board and alight)
        let all_calls = leg.calls();
        let stops: Vec<StationInfo> = if all_calls.len() > 2 {
            all_calls[1..all_calls.len() - 1]
                .iter()
                .map(|c| StationInfo {
                    crs: c.station.as_str().to_string(),
                    name: c.station_name.clone(),
                    time: c.expected_arrival().map(|t| format_time(&t)),
                    platform: c.platform.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            operator: leg.service().operator.clone(),
            headcode: leg.service().headcode.as_ref().map(|h| h.to_string()),
            origin,
            destination,
            stops,
        }
    }
}

impl WalkResult {
    /// Create from a domain Walk.
    pub fn from_walk(walk: &Walk) -> Self {
        Self {
            from: StationInfo {
                crs: walk.from.as_str().to_string(),
                name: walk.from.as_str().to_string(), // We don't have the name
                time: None,
                platform: None,
            },
            to: StationInfo {
                crs: walk.to.as_str().to_string(),
                name: walk.to.as_str().to_string(), // We don't have the name
                time: None,
                platform: None,
            },
            duration_mins: walk.duration.num_minutes(),
        }
    }
}

/// Format a RailTime as "HH:MM".
fn format_time(time: &RailTime) -> String {
    time.to_string()
}
