//! Decoding of registry responses into domain records.
//!
//! Both functions are pure: they take a response body and produce sorted
//! domain records, or a `DecodeError` when the body does not match the
//! expected shape. A missing sub-node code degrades to an absent alpha-3
//! instead of failing the whole decode.

use crate::domain::{CountryCode, PostalEntry};

use super::types::{CodeTableResponse, HierarchyResponse};

/// Error when a response body does not match the expected shape.
///
/// The message carries the offending path as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected registry payload: {message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    fn new(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Decode a hierarchy response into country-code pairs.
///
/// Each top-level node contributes one record: the node's `kode` is the
/// alpha-2 form, the first sub-node's `kode` (if any) the alpha-3 form.
/// The result is sorted ascending by alpha-2.
pub fn decode_hierarchy(body: &str) -> Result<Vec<CountryCode>, DecodeError> {
    let response: HierarchyResponse = serde_json::from_str(body).map_err(DecodeError::new)?;

    let mut codes: Vec<CountryCode> = response
        .noder
        .into_values()
        .map(|node| {
            let alpha3 = node.undernoder.into_values().next().and_then(|sub| sub.kode);
            CountryCode {
                alpha2: node.kode,
                alpha3,
            }
        })
        .collect();

    codes.sort_by(|a, b| a.alpha2.cmp(&b.alpha2));
    Ok(codes)
}

/// Decode a flat code-table response into postal entries.
///
/// The place name is the first meaning's Norwegian term; codes without any
/// description get the `"UNKNOWN"` sentinel. The result is sorted
/// ascending by code.
pub fn decode_flat_table(body: &str) -> Result<Vec<PostalEntry>, DecodeError> {
    let response: CodeTableResponse = serde_json::from_str(body).map_err(DecodeError::new)?;

    let mut entries: Vec<PostalEntry> = response
        .betydninger
        .into_iter()
        .map(|(code, meanings)| {
            let term = meanings
                .into_iter()
                .next()
                .and_then(|meaning| meaning.beskrivelser.nb)
                .map(|description| description.term);
            PostalEntry::new(code, term)
        })
        .collect();

    entries.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(entries)
}
