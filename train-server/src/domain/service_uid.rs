//! RTT service UID type.

use std::fmt;

/// Error returned when parsing an invalid service UID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service UID: {reason}")]
pub struct InvalidServiceUid {
    reason: &'static str,
}

/// An RTT (Realtime Trains) service unique identifier.
///
/// Service UIDs are opaque identifiers assigned by RTT to uniquely identify
/// a train service. The only validation is that they must be non-empty.
///
/// # Examples
///
/// ```
/// use train_server::domain::ServiceUid;
///
/// let uid = ServiceUid::new("P12345".to_string()).unwrap();
/// assert_eq!(uid.as_str(), "P12345");
///
/// // Empty strings are rejected
/// assert!(ServiceUid::new("".to_string()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ServiceUid(String);

impl ServiceUid {
    /// Create a new service UID from a string.
    ///
    /// Returns an error if the string is empty.
    pub fn new(s: String) -> Result<Self, InvalidServiceUid> {
        if s.is_empty() {
            return Err(InvalidServiceUid {
                reason: "service UID cannot be empty",
            });
        }
        Ok(ServiceUid(s))
    }

    /// Returns the service UID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ServiceUid and returns the inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for ServiceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceUid({})", self.0)
    }
}

impl fmt::Display for ServiceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
