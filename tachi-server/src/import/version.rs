//! Version inference for an import batch
//!
//! Each row names the version it came from; the batch's version is the
//! newest one seen. That version must be in the allowlist configured for the
//! import type, because it decides which rules apply to every score in the
//! batch.

use tachi_common::versions::{VersionRank, VersionTable};
use tracing::{debug, info};

use super::error::{ImportError, ImportResult};

/// Tracks the newest version label across a batch
pub struct VersionTracker<'t> {
    table: &'t VersionTable,
    newest: Option<VersionRank>,
}

impl<'t> VersionTracker<'t> {
    pub fn new(table: &'t VersionTable) -> Self {
        Self {
            table,
            newest: None,
        }
    }

    /// Resolve a row's version label and fold it into the batch maximum
    pub fn observe(&mut self, label: &str) -> ImportResult<VersionRank> {
        let rank = self.table.resolve(label).ok_or_else(|| {
            info!(label, "Invalid/unsupported version name");
            ImportError::bad_request(format!("Invalid/Unsupported Version Name '{}'.", label))
        })?;

        if self.newest.map_or(true, |newest| rank > newest) {
            self.newest = Some(rank);
        }

        Ok(rank)
    }

    pub fn newest(&self) -> Option<VersionRank> {
        self.newest
    }

    /// Finish the batch, returning the newest version's token
    pub fn finish(self, allowed: &[String]) -> ImportResult<String> {
        match self.newest {
            Some(rank) => {
                let version = rank.to_string();
                debug!(version = %version, label = ?self.table.label(rank), "Newest version in batch");
                ensure_supported(&version, allowed)?;
                Ok(version)
            }
            None => Err(ImportError::bad_request(format!(
                "Could not determine a game version, as this import contained no scores. {}",
                describe_allowed(allowed)
            ))),
        }
    }
}

/// Reject a batch whose version is outside the allowlist
pub fn ensure_supported(version: &str, allowed: &[String]) -> ImportResult<()> {
    if allowed.iter().any(|v| v == version) {
        return Ok(());
    }

    info!(version, "Import version is outside the supported set");
    Err(ImportError::bad_request(format!(
        "Version {} is not supported. {}",
        version,
        describe_allowed(allowed)
    )))
}

/// e.g. "Only versions 26, 27, 28 and 29 are supported."
fn describe_allowed(allowed: &[String]) -> String {
    match allowed {
        [] => "No versions are supported for this import type.".to_string(),
        [only] => format!("Only version {} is supported.", only),
        [init @ .., last] => format!("Only versions {} and {} are supported.", init.join(", "), last),
    }
}
