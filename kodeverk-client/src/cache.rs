//! Read-through caching for registry lookups.
//!
//! The registry's reference data changes on the order of months, so cached
//! entries never expire and are never evicted: a key fetched once is served
//! from memory for the rest of the process lifetime.
//!
//! Two independent cache spaces exist. The country-code list is cached
//! whole under its hierarchy name; postal entries are cached per code and
//! batch-populated from a single table fetch, so one remote round-trip
//! amortizes every later lookup.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::{debug, info};

use crate::domain::{CountryCode, PostalEntry};
use crate::registry::{RegistryClient, RegistryError, decode_flat_table, decode_hierarchy};

/// Hierarchy holding the composite ISO country-code pairs.
pub const COUNTRY_HIERARCHY: &str = "LandkoderSammensattISO2";
/// Flat code table mapping postal codes to place names.
pub const POSTAL_TABLE: &str = "Postnummer";

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Collapse concurrent first access to the country list into a single
    /// in-flight fetch. With this off, concurrent misses may each fetch
    /// remotely; the fetch is idempotent and the last write wins.
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
        }
    }
}

/// Registry client with process-lifetime caching.
///
/// Wraps a [`RegistryClient`] and serves decoded lookup structures from
/// memory after the first successful fetch.
pub struct CachedRegistry {
    client: RegistryClient,
    /// Country-code lists keyed by hierarchy name.
    countries: MokaCache<String, Arc<Vec<CountryCode>>>,
    /// Postal entries keyed per code.
    postal: MokaCache<String, PostalEntry>,
    single_flight: bool,
}

impl CachedRegistry {
    /// Create a new cached registry with the given configuration.
    pub fn new(client: RegistryClient, config: &CacheConfig) -> Self {
        Self {
            client,
            countries: MokaCache::builder().build(),
            postal: MokaCache::builder().build(),
            single_flight: config.single_flight,
        }
    }

    /// The decoded country-code list, fetched at most once.
    ///
    /// Under single-flight, concurrent first callers collapse onto one
    /// remote fetch and all observe the same list. Every later call is
    /// answered from memory without network access.
    pub async fn country_codes(&self) -> Result<Arc<Vec<CountryCode>>, RegistryError> {
        if self.single_flight {
            return self
                .countries
                .try_get_with(COUNTRY_HIERARCHY.to_string(), self.fetch_country_codes())
                .await
                .map_err(|shared| (*shared).clone());
        }

        if let Some(codes) = self.countries.get(COUNTRY_HIERARCHY).await {
            return Ok(codes);
        }

        let codes = self.fetch_country_codes().await?;
        self.countries
            .insert(COUNTRY_HIERARCHY.to_string(), codes.clone())
            .await;
        Ok(codes)
    }

    async fn fetch_country_codes(&self) -> Result<Arc<Vec<CountryCode>>, RegistryError> {
        let body = self.client.fetch_hierarchy(COUNTRY_HIERARCHY).await?;
        let codes = decode_hierarchy(&body)?;
        info!(count = codes.len(), "imported country codes");
        Ok(Arc::new(codes))
    }

    /// Resolve one postal code through the per-code cache.
    ///
    /// A miss fetches the whole table once and stores every decoded entry
    /// under its own code, so later lookups for any code in the table are
    /// served from memory. A code the registry does not know is answered
    /// from the fetched batch with `None` and is not cached.
    pub async fn postal_entry(&self, code: &str) -> Result<Option<PostalEntry>, RegistryError> {
        if let Some(entry) = self.postal.get(code).await {
            debug!(code, "postal entry served from cache");
            return Ok(Some(entry));
        }

        let body = self.client.fetch_code_table(POSTAL_TABLE).await?;
        let entries = decode_flat_table(&body)?;
        info!(count = entries.len(), "imported postal entries from registry");

        for entry in &entries {
            self.postal.insert(entry.code.clone(), entry.clone()).await;
        }

        Ok(entries.into_iter().find(|entry| entry.code == code))
    }

    /// Cache-only read of a postal entry. Never touches the network.
    pub async fn cached_postal_entry(&self, code: &str) -> Option<PostalEntry> {
        self.postal.get(code).await
    }

    /// Number of postal entries currently cached.
    pub async fn postal_entry_count(&self) -> u64 {
        self.postal.run_pending_tasks().await;
        self.postal.entry_count()
    }
}
