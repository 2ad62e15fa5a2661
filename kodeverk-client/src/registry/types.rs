//! Wire format of registry responses.
//!
//! Field names follow the registry's own (Norwegian) JSON vocabulary, so
//! the structs deserialize without rename attributes. Unknown fields are
//! ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Response of the hierarchy endpoint: a tree of nodes keyed by code.
#[derive(Debug, Deserialize)]
pub struct HierarchyResponse {
    pub noder: BTreeMap<String, HierarchyNode>,
}

/// One top-level hierarchy node. `kode` is the node's own code; nested
/// codes hang off `undernoder`.
#[derive(Debug, Deserialize)]
pub struct HierarchyNode {
    pub kode: String,
    #[serde(default)]
    pub undernoder: BTreeMap<String, HierarchySubNode>,
}

/// A nested hierarchy node. The code may be absent for malformed entries.
#[derive(Debug, Deserialize)]
pub struct HierarchySubNode {
    pub kode: Option<String>,
}

/// Response of the code-table endpoint: meanings keyed by code.
#[derive(Debug, Deserialize)]
pub struct CodeTableResponse {
    pub betydninger: BTreeMap<String, Vec<CodeMeaning>>,
}

/// One meaning of a code, carrying its localized descriptions.
#[derive(Debug, Deserialize)]
pub struct CodeMeaning {
    pub beskrivelser: Descriptions,
}

/// Localized descriptions. Only Norwegian bokmål is requested.
#[derive(Debug, Deserialize)]
pub struct Descriptions {
    pub nb: Option<Description>,
}

/// A single localized description.
#[derive(Debug, Deserialize)]
pub struct Description {
    pub term: String,
}
