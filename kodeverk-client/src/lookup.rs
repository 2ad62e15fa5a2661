//! Public lookup surface for the code directory.
//!
//! Thin facade over the cached registry: country-code translation and
//! listing, and postal-code resolution reconciled against the optional
//! legacy register.

use std::sync::Arc;

use tracing::warn;

use crate::cache::CachedRegistry;
use crate::domain::{CountryQuery, InvalidCountryCode, PostalEntry};
use crate::legacy::PostalRegister;
use crate::registry::RegistryError;

/// Errors surfaced by lookup operations.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Malformed caller input; rejected before any lookup happens
    #[error(transparent)]
    InvalidInput(#[from] InvalidCountryCode),

    /// Registry failure after the transport pipeline gave up
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The country-code list could not be serialized
    #[error("failed to serialize country codes: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Lookup facade over the cached code directory.
pub struct CodeLookup {
    registry: CachedRegistry,
    legacy: Option<Arc<dyn PostalRegister>>,
}

impl CodeLookup {
    /// Create a lookup facade without a legacy register.
    pub fn new(registry: CachedRegistry) -> Self {
        Self {
            registry,
            legacy: None,
        }
    }

    /// Attach a legacy postal register for cross-checking and fallback.
    pub fn with_legacy_register(mut self, register: Arc<dyn PostalRegister>) -> Self {
        self.legacy = Some(register);
        self
    }

    /// The full country-code list as a JSON document.
    pub async fn all_country_codes_json(&self) -> Result<String, LookupError> {
        let codes = self.registry.country_codes().await?;
        Ok(serde_json::to_string_pretty(codes.as_ref())?)
    }

    /// Alpha-2 codes of every country, in list order.
    pub async fn alpha2_codes(&self) -> Result<Vec<String>, LookupError> {
        let codes = self.registry.country_codes().await?;
        Ok(codes.iter().map(|code| code.alpha2.clone()).collect())
    }

    /// Translate between the alpha-2 and alpha-3 country-code forms.
    ///
    /// A two-letter query answers with the matching record's alpha-3 form,
    /// a three-letter query with the matching record's alpha-2 form;
    /// `None` when the code is not in the decoded set. No partial
    /// matching.
    pub async fn translate_country_code(&self, code: &str) -> Result<Option<String>, LookupError> {
        let query = CountryQuery::parse(code)?;
        let codes = self.registry.country_codes().await?;

        let translated = match &query {
            CountryQuery::Alpha2(alpha2) => codes
                .iter()
                .find(|candidate| candidate.alpha2 == *alpha2)
                .and_then(|candidate| candidate.alpha3.clone()),
            CountryQuery::Alpha3(alpha3) => codes
                .iter()
                .find(|candidate| candidate.alpha3.as_deref() == Some(alpha3))
                .map(|candidate| candidate.alpha2.clone()),
        };

        Ok(translated)
    }

    /// Resolve a postal code to its place name.
    ///
    /// Empty or absent input answers `None` without touching the network.
    /// The remote registry is authoritative: when a configured legacy
    /// register disagrees, the discrepancy is logged and the remote value
    /// is returned. The legacy value is used only when the registry does
    /// not know the code, or as a fallback when the remote lookup fails.
    pub async fn resolve_postal_place(
        &self,
        code: Option<&str>,
    ) -> Result<Option<PostalEntry>, LookupError> {
        let Some(code) = code.filter(|code| !code.is_empty()) else {
            warn!("postal code is empty or absent");
            return Ok(None);
        };

        let remote = match self.registry.postal_entry(code).await {
            Ok(remote) => remote,
            Err(err) => {
                if let Some(entry) = self.legacy_entry(code) {
                    warn!(code, error = %err, "registry lookup failed, using legacy postal register");
                    return Ok(Some(entry));
                }
                return Err(err.into());
            }
        };

        match (remote, self.legacy_entry(code)) {
            (Some(remote), Some(legacy)) => {
                if remote.place_name != legacy.place_name {
                    warn!(
                        code,
                        registry = %remote.place_name,
                        legacy = %legacy.place_name,
                        "place name differs between registry and legacy register"
                    );
                }
                Ok(Some(remote))
            }
            (Some(remote), None) => Ok(Some(remote)),
            (None, legacy) => Ok(legacy),
        }
    }

    fn legacy_entry(&self, code: &str) -> Option<PostalEntry> {
        let register = self.legacy.as_deref()?;
        let place_name = register.place_name(code)?;
        Some(PostalEntry {
            code: code.to_string(),
            place_name,
        })
    }
}
