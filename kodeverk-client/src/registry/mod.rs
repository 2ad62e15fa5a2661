//! Code-directory registry client.
//!
//! HTTP access to the remote reference-data service and the decoding of
//! its two response shapes:
//! - hierarchies (`/api/v1/hierarki/{name}/noder`): a tree of codes with
//!   nested sub-codes, used for country-code pairs
//! - flat code tables (`/api/v1/kodeverk/{name}/koder/betydninger`): a map
//!   from code to localized descriptions, used for postal codes
//!
//! Token exchange and ambient correlation ids are collaborator traits;
//! the client itself owns header assembly, bounded retry of transient
//! connection failures, and error translation.

mod auth;
mod client;
mod decode;
mod error;
mod types;

pub use auth::{
    CorrelationProvider, NoAmbientCorrelation, StaticTokenProvider, TokenError, TokenProvider,
};
pub use client::{RegistryClient, RegistryConfig, RegistryConfigError};
pub use decode::{DecodeError, decode_flat_table, decode_hierarchy};
pub use error::RegistryError;
pub use types::{
    CodeMeaning, CodeTableResponse, Description, Descriptions, HierarchyNode, HierarchyResponse,
    HierarchySubNode,
};
