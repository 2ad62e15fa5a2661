//! Caching client for a remote code-directory service.
//!
//! Fetches hierarchical code sets (country-code pairs) and flat code
//! tables (postal-code → place-name) from the registry, decodes them into
//! typed lookup structures, and serves them from a process-lifetime cache
//! behind a small lookup facade.

pub mod cache;
pub mod domain;
pub mod legacy;
pub mod lookup;
pub mod registry;
