//! Train headcode (train identity) type.

use std::fmt;

/// A validated train headcode (train identity).
///
/// Standard UK headcodes follow the format: digit, letter, two digits (e.g., "1A23").
/// The first digit indicates the train class, the letter indicates the route/destination area,
/// and the final two digits distinguish services.
///
/// Non-standard headcodes exist (charter trains, light engine movements, etc.) but are rare.
/// `Headcode::parse` returns `None` for these rather than an error, since they're not
/// invalid—just not in the standard format.
///
/// # Examples
///
/// ```
/// use train_server::domain::Headcode;
///
/// // Standard headcodes parse successfully
/// let hc = Headcode::parse("1A23").unwrap();
/// assert_eq!(hc.as_str(), "1A23");
///
/// // Non-standard formats return None
/// assert!(Headcode::parse("ABCD").is_none());
/// assert!(Headcode::parse("1234").is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Headcode([u8; 4]);

impl Headcode {
    /// Parse a headcode from a string.
    ///
    /// Standard format: digit (0-9), uppercase letter (A-Z), two digits (00-99).
    /// Returns `None` for non-standard headcodes (which exist but are uncommon).
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();

        if bytes.len() != 4 {
            return None;
        }

        // First character: digit
        if !bytes[0].is_ascii_digit() {
            return None;
        }

        // Second character: uppercase letter
        if !bytes[1].is_ascii_uppercase() {
            return None;
        }

        // Third and fourth characters: digits
        if !bytes[2].is_ascii_digit() || !bytes[3].is_ascii_digit() {
            return None;
        }

        Some(Headcode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Returns the headcode as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII characters
        std::str::from_utf8(&self.0).unwrap()
    }

    /// Returns the train class digit (first character).
    ///
    /// This indicates the type of service:
    /// - 0: Light locomotive
    /// - 1: Express passenger
    /// - 2: Ordinary passenger
    /// - 3: Parcels/mail
    /// - 4-6: Freight
    /// - 9: Eurostar (historically)
    pub fn class_digit(&self) -> char {
        self.0[0] as char
    }

    /// Returns the route letter (second character).
    pub fn route_letter(&self) -> char {
        self.0[1] as char
    }
}

impl fmt::Debug for Headcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Headcode({})", self.as_str())
    }
}

impl fmt::Display for Headcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
