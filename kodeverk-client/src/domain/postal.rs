//! Postal code types.

use serde::{Deserialize, Serialize};

/// Place name used when the registry has no description for a code.
pub const PLACE_NAME_UNKNOWN: &str = "UNKNOWN";

/// A postal code and its place name, as decoded from the registry's
/// flat code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalEntry {
    pub code: String,
    pub place_name: String,
}

impl PostalEntry {
    /// Create an entry, substituting the sentinel when no place name is known.
    pub fn new(code: impl Into<String>, place_name: Option<String>) -> Self {
        Self {
            code: code.into(),
            place_name: place_name.unwrap_or_else(|| PLACE_NAME_UNKNOWN.to_string()),
        }
    }
}
