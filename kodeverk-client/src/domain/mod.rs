//! Domain types for the code directory.
//!
//! Records decoded from the registry and the validated query types the
//! lookup surface accepts. Validation happens at construction time, so
//! code that receives these types can trust their invariants.

mod country;
mod postal;

pub use country::{CountryCode, CountryQuery, InvalidCountryCode};
pub use postal::{PLACE_NAME_UNKNOWN, PostalEntry};
