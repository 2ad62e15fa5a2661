//! Calling point types for train services.
//!
//! A `Call` represents a station stop on a train service, with scheduled
//! and realtime arrival/departure times. A `CallIndex` provides an
//! unambiguous position within a service's calling pattern.

use super::{Crs, RailTime};

/// Index of a call within a service's calling pattern.
///
/// Used instead of `Crs` to disambiguate services that call at the same
/// station multiple times (loops, turnbacks, out-and-back workings).
///
/// # Examples
///
/// ```
/// use train_server::domain::CallIndex;
///
/// let idx = CallIndex(0);
/// assert_eq!(idx.0, 0);
///
/// // CallIndex is Copy, so it's cheap to pass around
/// let idx2 = idx;
/// assert_eq!(idx, idx2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallIndex(pub usize);

impl CallIndex {
    /// Returns the next index.
    pub fn next(self) -> Self {
        CallIndex(self.0 + 1)
    }

    /// Returns the previous index, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(CallIndex)
    }
}

impl std::fmt::Display for CallIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for CallIndex {
    fn from(value: usize) -> Self {
        CallIndex(value)
    }
}

impl From<CallIndex> for usize {
    fn from(value: CallIndex) -> Self {
        value.0
    }
}

/// A station call on a train service.
///
/// Represents a single stop with scheduled ("booked") times and realtime
/// estimates or actuals. Darwin provides:
/// - `st` (scheduled time) → `booked_*`
/// - `et` (estimated time) or `at` (actual time) → `realtime_*`
///
/// # Time Semantics
///
/// - For origin stations: only departure times are meaningful
/// - For destination stations: only arrival times are meaningful
/// - For intermediate stations: both arrival and departure may be present
/// - Realtime times override booked times when available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Station CRS code
    pub station: Crs,
    /// Station display name
    pub station_name: String,
    /// Platform number/letter (if known)
    pub platform: Option<String>,
    /// Scheduled arrival time
    pub booked_arrival: Option<RailTime>,
    /// Scheduled departure time
    pub booked_departure: Option<RailTime>,
    /// Realtime (estimated or actual) arrival time
    pub realtime_arrival: Option<RailTime>,
    /// Realtime (estimated or actual) departure time
    pub realtime_departure: Option<RailTime>,
    /// Whether this call is cancelled
    pub is_cancelled: bool,
}

impl Call {
    /// Creates a new call with the given station and times.
    pub fn new(station: Crs, station_name: String) -> Self {
        Self {
            station,
            station_name,
            platform: None,
            booked_arrival: None,
            booked_departure: None,
            realtime_arrival: None,
            realtime_departure: None,
            is_cancelled: false,
        }
    }

    /// Returns the best available arrival time (realtime if available, else booked).
    ///
    /// # Examples
    ///
    /// ```
    /// use train_server::domain::{Call, Crs, RailTime};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let crs = Crs::parse("PAD").unwrap();
    ///
    /// let mut call = Call::new(crs, "London Paddington".into());
    /// call.booked_arrival = Some(RailTime::parse_hhmm("14:30", date).unwrap());
    ///
    /// // Without realtime, returns booked
    /// assert_eq!(call.expected_arrival().unwrap().to_string(), "14:30");
    ///
    /// // With realtime, returns realtime
    /// call.realtime_arrival = Some(RailTime::parse_hhmm("14:35", date).unwrap());
    /// assert_eq!(call.expected_arrival().unwrap().to_string(), "14:35");
    /// ```
    pub fn expected_arrival(&self) -> Option<RailTime> {
        self.realtime_arrival.or(self.booked_arrival)
    }

    /// Returns the best available departure time (realtime if available, else booked).
    pub fn expected_departure(&self) -> Option<RailTime> {
        self.realtime_departure.or(self.booked_departure)
    }

    /// Returns the booked arrival time.
    pub fn booked_arrival(&self) -> Option<RailTime> {
        self.booked_arrival
    }

    /// Returns the booked departure time.
    pub fn booked_departure(&self) -> Option<RailTime> {
        self.booked_departure
    }

    /// Returns true if the arrival is delayed (realtime later than booked).
    pub fn is_arrival_delayed(&self) -> bool {
        match (self.realtime_arrival, self.booked_arrival) {
            (Some(rt), Some(booked)) => rt > booked,
            _ => false,
        }
    }

    /// Returns true if the departure is delayed (realtime later than booked).
    pub fn is_departure_delayed(&self) -> bool {
        match (self.realtime_departure, self.booked_departure) {
            (Some(rt), Some(booked)) => rt > booked,
            _ => false,
        }
    }

    /// Returns the arrival delay as a duration, if delayed.
    pub fn arrival_delay(&self) -> Option<chrono::Duration> {
        match (self.realtime_arrival, self.booked_arrival) {
            (Some(rt), Some(booked)) if rt > booked => Some(rt.signed_duration_since(booked)),
            _ => None,
        }
    }

    /// Returns the departure delay as a duration, if delayed.
    pub fn departure_delay(&self) -> Option<chrono::Duration> {
        match (self.realtime_departure, self.booked_departure) {
            (Some(rt), Some(booked)) if rt > booked => Some(rt.signed_duration_since(booked)),
            _ => None,
        }
    }
}
