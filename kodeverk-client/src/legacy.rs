//! Legacy flat-file postal register.
//!
//! Historical deployments shipped the postal table as a tab-separated
//! snapshot file. The register is optional: where configured, it is used
//! to cross-check the remote registry and as a fallback when the registry
//! is unavailable.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

/// Error loading the register file.
#[derive(Debug, thiserror::Error)]
pub enum LegacyRegisterError {
    #[error("failed to read postal register file: {0}")]
    Io(#[from] std::io::Error),
}

/// Read access to a postal-code → place-name source.
pub trait PostalRegister: Send + Sync {
    fn place_name(&self, code: &str) -> Option<String>;
}

/// Postal register backed by a `code<TAB>place` snapshot file.
pub struct FilePostalRegister {
    table: HashMap<String, String>,
}

impl FilePostalRegister {
    /// Load the register from a tab-separated file.
    ///
    /// Lines without a tab separator are skipped with a warning.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LegacyRegisterError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(Self {
            table: build_table(&contents),
        })
    }

    /// Number of codes in the register.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the register holds any codes.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl PostalRegister for FilePostalRegister {
    fn place_name(&self, code: &str) -> Option<String> {
        let place = self.table.get(code).cloned();
        if place.is_none() {
            warn!(code, "postal code not in legacy register, snapshot file may be outdated");
        }
        place
    }
}

/// Parse the snapshot contents into a code → place map.
fn build_table(contents: &str) -> HashMap<String, String> {
    let mut table = HashMap::new();

    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        match line.split_once('\t') {
            Some((code, place)) if !code.is_empty() => {
                table.insert(code.to_string(), place.trim_end().to_string());
            }
            _ => warn!(line, "skipping malformed postal register line"),
        }
    }

    table
}
