//! Country code types.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid country code query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid country code {code:?}: {reason}")]
pub struct InvalidCountryCode {
    code: String,
    reason: &'static str,
}

impl InvalidCountryCode {
    /// The rejected input, as given.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// One country-code pair from the composite ISO hierarchy.
///
/// `alpha2` is the two-letter form the hierarchy is keyed by. `alpha3` is
/// taken from the entry's first sub-node and may be absent when the
/// registry carries no sub-node code for that country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCode {
    pub alpha2: String,
    pub alpha3: Option<String>,
}

/// A validated country-code translation query.
///
/// The registry only knows two forms: two-letter (alpha-2) and three-letter
/// (alpha-3) codes. Anything else is rejected at parse time, before any
/// lookup happens.
///
/// # Examples
///
/// ```
/// use kodeverk_client::domain::CountryQuery;
///
/// assert!(matches!(CountryQuery::parse("SE"), Ok(CountryQuery::Alpha2(_))));
/// assert!(matches!(CountryQuery::parse("SWE"), Ok(CountryQuery::Alpha3(_))));
///
/// // Empty and wrong-length input is rejected
/// assert!(CountryQuery::parse("").is_err());
/// assert!(CountryQuery::parse("S").is_err());
/// assert!(CountryQuery::parse("SWED").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryQuery {
    Alpha2(String),
    Alpha3(String),
}

impl CountryQuery {
    /// Parse a translation query from caller input.
    ///
    /// The input must be exactly 2 or 3 ASCII letters.
    pub fn parse(code: &str) -> Result<Self, InvalidCountryCode> {
        if code.is_empty() {
            return Err(InvalidCountryCode {
                code: code.to_string(),
                reason: "must not be empty",
            });
        }

        if !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(InvalidCountryCode {
                code: code.to_string(),
                reason: "must be ASCII letters only",
            });
        }

        match code.len() {
            2 => Ok(CountryQuery::Alpha2(code.to_string())),
            3 => Ok(CountryQuery::Alpha3(code.to_string())),
            _ => Err(InvalidCountryCode {
                code: code.to_string(),
                reason: "must be 2 or 3 letters",
            }),
        }
    }

    /// Returns the queried code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            CountryQuery::Alpha2(code) | CountryQuery::Alpha3(code) => code,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any 2-letter input parses as an alpha-2 query
        #[test]
        fn two_letters_parse_as_alpha2(s in "[A-Za-z]{2}") {
            prop_assert!(matches!(CountryQuery::parse(&s), Ok(CountryQuery::Alpha2(_))));
        }

        /// Any 3-letter input parses as an alpha-3 query
        #[test]
        fn three_letters_parse_as_alpha3(s in "[A-Za-z]{3}") {
            prop_assert!(matches!(CountryQuery::parse(&s), Ok(CountryQuery::Alpha3(_))));
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn wrong_length_rejected(s in "[A-Z]{0,1}|[A-Z]{4,10}") {
            prop_assert!(CountryQuery::parse(&s).is_err());
        }

        /// Strings with digits are rejected
        #[test]
        fn digits_rejected(s in "[A-Z0-9]{2,3}".prop_filter("has digit", |s| s.chars().any(|c| c.is_ascii_digit()))) {
            prop_assert!(CountryQuery::parse(&s).is_err());
        }

        /// Parsing never changes the queried string
        #[test]
        fn parse_preserves_input(s in "[A-Z]{2,3}") {
            let parsed = CountryQuery::parse(&s).unwrap();
            prop_assert_eq!(parsed.as_str(), s.as_str());
        }
    }
}
