//! Rail time handling for Darwin API.
//!
//! Darwin provides times as "HH:MM" strings. This module provides types for
//! working with these times in a date-aware manner, handling overnight
//! services that cross midnight.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A date-aware time for rail services.
///
/// Rail times need to track both the time of day and the date, because
/// overnight services cross midnight. Two times at "01:30" might be on
/// different dates.
///
/// # Examples
///
/// ```
/// use train_server::domain::RailTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = RailTime::parse_hhmm("14:30", date).unwrap();
/// assert_eq!(time.to_string(), "14:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RailTime {
    date: NaiveDate,
    time: NaiveTime,
}

impl RailTime {
    /// Create a new RailTime from date and time components.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse a time from "HH:MM" format with a given base date.
    ///
    /// # Examples
    ///
    /// ```
    /// use train_server::domain::RailTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    ///
    /// // Valid times
    /// assert!(RailTime::parse_hhmm("00:00", date).is_ok());
    /// assert!(RailTime::parse_hhmm("23:59", date).is_ok());
    /// assert!(RailTime::parse_hhmm("14:30", date).is_ok());
    ///
    /// // Invalid formats
    /// assert!(RailTime::parse_hhmm("1430", date).is_err());
    /// assert!(RailTime::parse_hhmm("14:3", date).is_err());
    /// assert!(RailTime::parse_hhmm("25:00", date).is_err());
    /// ```
    pub fn parse_hhmm(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        // Check colon position
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        // Parse hours
        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        // Parse minutes
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self { date, time })
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the time component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Add a duration to this time.
    ///
    /// This properly handles crossing midnight by advancing the date.
    ///
    /// # Examples
    ///
    /// ```
    /// use train_server::domain::RailTime;
    /// use chrono::{Duration, NaiveDate};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let time = RailTime::parse_hhmm("23:30", date).unwrap();
    ///
    /// // Adding 1 hour crosses midnight
    /// let later = time + Duration::hours(1);
    /// assert_eq!(later.to_string(), "00:30");
    /// assert_eq!(later.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    /// ```
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let dt = self.to_datetime().checked_add_signed(duration)?;
        Some(Self {
            date: dt.date(),
            time: dt.time(),
        })
    }

    /// Subtract a duration from this time.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        let dt = self.to_datetime().checked_sub_signed(duration)?;
        Some(Self {
            date: dt.date(),
            time: dt.time(),
        })
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is before `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.to_datetime()
            .signed_duration_since(other.to_datetime())
    }
}

impl Add<Duration> for RailTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).expect("time overflow")
    }
}

impl Ord for RailTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_datetime().cmp(&other.to_datetime())
    }
}

impl PartialOrd for RailTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RailTime({} {:02}:{:02})",
            self.date,
            self.hour(),
            self.minute()
        )
    }
}

impl fmt::Display for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Threshold for detecting midnight rollover in time sequences.
///
/// If a time appears more than 6 hours before the previous time in the
/// sequence, we assume it has rolled over to the next day.
const ROLLOVER_THRESHOLD_HOURS: i64 = 6;

/// Parse a sequence of times with rollover detection for overnight services.
///
/// Darwin provides calling point times as "HH:MM" strings in chronological
/// order. For overnight services that cross midnight, times will appear to
/// go backwards (e.g., "23:30", "00:15"). This function detects such
/// rollovers and assigns the correct date to each time.
///
/// The rollover detection uses a threshold: if a time appears more than
/// 6 hours earlier than the previous time, it's assumed to be on the next day.
///
/// # Arguments
///
/// * `times` - A sequence of optional time strings. `None` entries are preserved.
/// * `base_date` - The date to use for the first time in the sequence.
///
/// # Examples
///
/// ```
/// use train_server::domain::parse_time_sequence;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
///
/// // Normal daytime service - all on same day
/// let times = vec![Some("10:00"), Some("10:30"), Some("11:00")];
/// let parsed = parse_time_sequence(&times, date).unwrap();
/// assert_eq!(parsed[0].unwrap().date(), date);
/// assert_eq!(parsed[1].unwrap().date(), date);
/// assert_eq!(parsed[2].unwrap().date(), date);
///
/// // Overnight service - crosses midnight
/// let times = vec![Some("23:00"), Some("23:30"), Some("00:15"), Some("01:00")];
/// let parsed = parse_time_sequence(&times, date).unwrap();
/// assert_eq!(parsed[0].unwrap().date(), date);
/// assert_eq!(parsed[1].unwrap().date(), date);
/// let next_day = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
/// assert_eq!(parsed[2].unwrap().date(), next_day);  // Rolled over
/// assert_eq!(parsed[3].unwrap().date(), next_day);
/// ```
pub fn parse_time_sequence(
    times: &[Option<&str>],
    base_date: NaiveDate,
) -> Result<Vec<Option<RailTime>>, TimeError> {
    let mut result = Vec::with_capacity(times.len());
    let mut current_date = base_date;
    let mut prev_time: Option<NaiveTime> = None;

    for time_opt in times {
        match time_opt {
            None => {
                result.push(None);
            }
            Some(time_str) => {
                let parsed = RailTime::parse_hhmm(time_str, base_date)?;
                let time = parsed.time();

                // Check for rollover: if this time is more than 6 hours before
                // the previous time, we've crossed midnight
                if let Some(prev) = prev_time {
                    let prev_minutes = prev.hour() as i64 * 60 + prev.minute() as i64;
                    let curr_minutes = time.hour() as i64 * 60 + time.minute() as i64;
                    let diff_minutes = curr_minutes - prev_minutes;

                    // If current time is more than 6 hours "before" previous,
                    // assume we crossed midnight
                    if diff_minutes < -(ROLLOVER_THRESHOLD_HOURS * 60) {
                        current_date = current_date
                            .succ_opt()
                            .ok_or_else(|| TimeError::new("date overflow"))?;
                    }
                }

                result.push(Some(RailTime::new(current_date, time)));
                prev_time = Some(time);
            }
        }
    }

    Ok(result)
}

/// Parse a sequence of times going backwards in time (for previous calling points).
///
/// Darwin provides previous calling points in reverse chronological order
/// (most recent first, going backwards to origin). This function handles
/// that by detecting when times appear significantly later than the previous,
/// indicating we've crossed midnight going backwards.
///
/// # Arguments
///
/// * `times` - A sequence of optional time strings, in reverse chronological order.
/// * `base_date` - The date of the most recent (first) time in the sequence.
///
/// # Examples
///
/// ```
/// use train_server::domain::parse_time_sequence_reverse;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
///
/// // Previous stops going backwards, crossing midnight
/// // Order: current station at 00:30, then 00:00, 23:30, 23:00
/// let times = vec![Some("00:30"), Some("00:00"), Some("23:30"), Some("23:00")];
/// let parsed = parse_time_sequence_reverse(&times, date).unwrap();
///
/// assert_eq!(parsed[0].unwrap().date(), date);  // 00:30 on 16th
/// assert_eq!(parsed[1].unwrap().date(), date);  // 00:00 on 16th
/// let prev_day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(parsed[2].unwrap().date(), prev_day);  // 23:30 on 15th
/// assert_eq!(parsed[3].unwrap().date(), prev_day);  // 23:00 on 15th
/// ```
pub fn parse_time_sequence_reverse(
    times: &[Option<&str>],
    base_date: NaiveDate,
) -> Result<Vec<Option<RailTime>>, TimeError> {
    let mut result = Vec::with_capacity(times.len());
    let mut current_date = base_date;
    let mut prev_time: Option<NaiveTime> = None;

    for time_opt in times {
        match time_opt {
            None => {
                result.push(None);
            }
            Some(time_str) => {
                let parsed = RailTime::parse_hhmm(time_str, base_date)?;
                let time = parsed.time();

                // Check for rollover going backwards: if this time is more than
                // 6 hours after the previous time, we've crossed midnight backwards
                if let Some(prev) = prev_time {
                    let prev_minutes = prev.hour() as i64 * 60 + prev.minute() as i64;
                    let curr_minutes = time.hour() as i64 * 60 + time.minute() as i64;
                    let diff_minutes = curr_minutes - prev_minutes;

                    // If current time is more than 6 hours "after" previous,
                    // and we're going backwards, we crossed midnight
                    if diff_minutes > ROLLOVER_THRESHOLD_HOURS * 60 {
                        current_date = current_date
                            .pred_opt()
                            .ok_or_else(|| TimeError::new("date underflow"))?;
                    }
                }

                result.push(Some(RailTime::new(current_date, time)));
                prev_time = Some(time);
            }
        }
    }

    Ok(result)
}
