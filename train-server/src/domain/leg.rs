//! Train leg type.
//!
//! A `Leg` represents a single train journey segment from boarding
//! to alighting. It uses `Arc<Service>` for cheap cloning in BFS search.

use std::sync::Arc;

use super::{Call, CallIndex, Crs, DomainError, RailTime, Service};

/// A leg of a journey (one train).
///
/// Uses `Arc<Service>` for cheap cloning in BFS search algorithms.
/// Times are validated at construction to guarantee `departure_time()`
/// and `arrival_time()` never fail.
///
/// # Invariants
///
/// - `alight_idx > board_idx` (must travel forward on the train)
/// - Both indices are valid for the service's calls
/// - Departure time exists at board index
/// - Arrival time exists at alight index
#[derive(Debug, Clone)]
pub struct Leg {
    service: Arc<Service>,
    board_idx: CallIndex,
    alight_idx: CallIndex,
    // Cached validated times (guaranteed present - validated at construction)
    departure: RailTime,
    arrival: RailTime,
}

impl Leg {
    /// Construct a leg, validating that required times exist and indices are valid.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `alight_idx <= board_idx` (must travel forward)
    /// - Either index is out of bounds
    /// - Required departure/arrival times are missing
    ///
    /// # Examples
    ///
    /// ```
    /// use train_server::domain::{Leg, Service, ServiceRef, Call, CallIndex, Crs, RailTime};
    /// use std::sync::Arc;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let pad = Crs::parse("PAD").unwrap();
    /// let rdg = Crs::parse("RDG").unwrap();
    ///
    /// // Create a simple service with two stops
    /// let mut call1 = Call::new(pad, "London Paddington".into());
    /// call1.booked_departure = Some(RailTime::parse_hhmm("10:00", date).unwrap());
    ///
    /// let mut call2 = Call::new(rdg, "Reading".into());
    /// call2.booked_arrival = Some(RailTime::parse_hhmm("10:25", date).unwrap());
    ///
    /// let service = Arc::new(Service {
    ///     service_ref: ServiceRef::new("ABC".into(), pad),
    ///     headcode: None,
    ///     operator: "GWR".into(),
    ///     operator_code: None,
    ///     calls: vec![call1, call2],
    ///     board_station_idx: CallIndex(0),
    /// });
    ///
    /// let leg = Leg::new(service, CallIndex(0), CallIndex(1)).unwrap();
    /// assert_eq!(leg.departure_time().to_string(), "10:00");
    /// assert_eq!(leg.arrival_time().to_string(), "10:25");
    /// ```
    pub fn new(
        service: Arc<Service>,
        board_idx: CallIndex,
        alight_idx: CallIndex,
    ) -> Result<Self, DomainError> {
        if alight_idx.0 <= board_idx.0 {
            return Err(DomainError::InvalidLeg(
                "alight index must be after board index",
            ));
        }

        let board_call = service
            .calls
            .get(board_idx.0)
            .ok_or(DomainError::InvalidCallIndex)?;
        let alight_call = service
            .calls
            .get(alight_idx.0)
            .ok_or(DomainError::InvalidCallIndex)?;

        let departure = board_call
            .expected_departure()
            .ok_or_else(|| DomainError::MissingTime("boarding departure".into()))?;
        let arrival = alight_call
            .expected_arrival()
            .ok_or_else(|| DomainError::MissingTime("alighting arrival".into()))?;

        Ok(Leg {
            service,
            board_idx,
            alight_idx,
            departure,
            arrival,
        })
    }

    /// Returns the service this leg is on.
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Returns the boarding call index.
    pub fn board_idx(&self) -> CallIndex {
        self.board_idx
    }

    /// Returns the alighting call index.
    pub fn alight_idx(&self) -> CallIndex {
        self.alight_idx
    }

    /// Returns the boarding call.
    pub fn board_call(&self) -> &Call {
        // Safe: validated at construction
        &self.service.calls[self.board_idx.0]
    }

    /// Returns the alighting call.
    pub fn alight_call(&self) -> &Call {
        // Safe: validated at construction
        &self.service.calls[self.alight_idx.0]
    }

    /// Returns the departure time (guaranteed present).
    pub fn departure_time(&self) -> RailTime {
        self.departure
    }

    /// Returns the arrival time (guaranteed present).
    pub fn arrival_time(&self) -> RailTime {
        self.arrival
    }

    /// Returns the boarding platform, if known.
    pub fn board_platform(&self) -> Option<&str> {
        self.board_call().platform.as_deref()
    }

    /// Returns the alighting platform, if known.
    pub fn alight_platform(&self) -> Option<&str> {
        self.alight_call().platform.as_deref()
    }

    /// Returns the boarding station CRS.
    pub fn board_station(&self) -> &Crs {
        &self.board_call().station
    }

    /// Returns the alighting station CRS.
    pub fn alight_station(&self) -> &Crs {
        &self.alight_call().station
    }

    /// Returns the boarding station name.
    pub fn board_station_name(&self) -> &str {
        &self.board_call().station_name
    }

    /// Returns the alighting station name.
    pub fn alight_station_name(&self) -> &str {
        &self.alight_call().station_name
    }

    /// Returns the journey duration.
    pub fn duration(&self) -> chrono::Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    /// Returns the number of intermediate stops (excluding board and alight).
    pub fn intermediate_stop_count(&self) -> usize {
        self.alight_idx.0 - self.board_idx.0 - 1
    }

    /// Returns all calls for this leg (from board to alight, inclusive).
    pub fn calls(&self) -> &[Call] {
        &self.service.calls[self.board_idx.0..=self.alight_idx.0]
    }

    /// Returns true if this leg has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.board_call().is_cancelled || self.alight_call().is_cancelled
    }
}

impl PartialEq for Leg {
    fn eq(&self, other: &Self) -> bool {
        // Two legs are equal if they're on the same service (by reference)
        // and have the same board/alight indices
        Arc::ptr_eq(&self.service, &other.service)
            && self.board_idx == other.board_idx
            && self.alight_idx == other.alight_idx
    }
}

impl Eq for Leg {}
