//! Train operator (ATOC) code type.

use std::fmt;

/// Error returned when parsing an invalid ATOC code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ATOC code: {reason}")]
pub struct InvalidAtocCode {
    reason: &'static str,
}

/// A valid 2-letter ATOC (Association of Train Operating Companies) operator code.
///
/// ATOC codes identify train operating companies (e.g., "GW" for Great Western Railway,
/// "VT" for Avanti West Coast). They are always 2 uppercase ASCII letters.
///
/// # Examples
///
/// ```
/// use train_server::domain::AtocCode;
///
/// let gw = AtocCode::parse("GW").unwrap();
/// assert_eq!(gw.as_str(), "GW");
///
/// // Lowercase is rejected
/// assert!(AtocCode::parse("gw").is_err());
///
/// // Wrong length is rejected
/// assert!(AtocCode::parse("G").is_err());
/// assert!(AtocCode::parse("GWR").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtocCode([u8; 2]);

impl AtocCode {
    /// Parse an ATOC code from a string.
    ///
    /// The input must be exactly 2 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidAtocCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 2 {
            return Err(InvalidAtocCode {
                reason: "must be exactly 2 characters",
            });
        }

        for &b in bytes {
            if !b.is_ascii_uppercase() {
                return Err(InvalidAtocCode {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        Ok(AtocCode([bytes[0], bytes[1]]))
    }

    /// Returns the ATOC code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtocCode({})", self.as_str())
    }
}

impl fmt::Display for AtocCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
