//! Import-wide context
//!
//! The context is decided once per import from the request metadata (and,
//! for hook payloads, the payload itself) and shared by every score in the
//! batch.

use serde::Serialize;
use serde_json::{Map, Value};
use tachi_common::{Game, Playtype};
use tracing::info;

use super::error::{ImportError, ImportResult};

/// Free-form key/value metadata sent alongside an import
pub type ImportMetadata = Map<String, Value>;

/// Metadata key holding the playtype selector
pub const PLAYTYPE_KEY: &str = "playtype";

/// Metadata key that disables the filename/playtype sanity check
pub const ASSERT_PLAYTYPE_KEY: &str = "assertPlaytypeCorrect";

/// Layout details that downstream conversion needs to know about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatFlags {
    pub has_beginner_and_legg: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportContext {
    pub game: Game,
    pub playtype: Playtype,
    pub version: String,
    /// Display name of `version`, e.g. "HEROIC VERSE"
    pub version_name: Option<String>,
    pub service: String,
    pub flags: FormatFlags,
}

/// Context fields known before the payload's rows are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBuilder {
    playtype: Playtype,
    service: String,
}

impl ContextBuilder {
    /// Context for an uploaded IIDX file
    ///
    /// Requires an explicit SP/DP selector and the uploaded file's name, and
    /// refuses files whose name suggests the other playtype unless the caller
    /// overrides the check.
    pub fn for_file(
        metadata: &ImportMetadata,
        filename: Option<&str>,
        service: &str,
    ) -> ImportResult<Self> {
        let playtype = require_iidx_playtype(metadata)?;

        let filename = filename.ok_or_else(|| {
            info!(service, "File import without a filename");
            ImportError::bad_request("Missing X-Filename header. File imports must name the uploaded file.")
        })?;
        if !asserted_playtype_correct(metadata) {
            check_filename(filename, playtype)?;
        }

        Ok(Self::new(playtype, service))
    }

    /// Context for a vendor API pull, where the caller names the playtype
    pub fn for_api(metadata: &ImportMetadata, service: &str) -> ImportResult<Self> {
        Ok(Self::new(require_iidx_playtype(metadata)?, service))
    }

    /// Context whose playtype was read from the payload
    pub fn new(playtype: Playtype, service: &str) -> Self {
        Self {
            playtype,
            service: service.to_string(),
        }
    }

    pub fn playtype(&self) -> Playtype {
        self.playtype
    }

    pub fn build(self, version: String, flags: FormatFlags) -> ImportContext {
        ImportContext {
            game: Game::Iidx,
            playtype: self.playtype,
            version,
            version_name: None,
            service: self.service,
            flags,
        }
    }
}

fn require_iidx_playtype(metadata: &ImportMetadata) -> ImportResult<Playtype> {
    match metadata.get(PLAYTYPE_KEY) {
        Some(Value::String(s)) if s == "SP" => Ok(Playtype::SP),
        Some(Value::String(s)) if s == "DP" => Ok(Playtype::DP),
        other => {
            let shown = match other {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => "undefined".to_string(),
            };
            info!(playtype = %shown, "Invalid playtype passed to import");
            Err(ImportError::bad_request(format!(
                "Invalid playtype of {} given. Expected SP or DP.",
                shown
            )))
        }
    }
}

fn asserted_playtype_correct(metadata: &ImportMetadata) -> bool {
    match metadata.get(ASSERT_PLAYTYPE_KEY) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Refuse a filename that names the other playtype
fn check_filename(filename: &str, playtype: Playtype) -> ImportResult<()> {
    let other = match playtype {
        Playtype::SP => "DP",
        _ => "SP",
    };

    if filename.to_lowercase().contains(&other.to_lowercase()) {
        info!(
            filename,
            playtype = %playtype,
            "Filename names the other playtype, sanity check refusing"
        );
        return Err(ImportError::bad_request(format!(
            "Safety Triggered: Filename contained '{}', but was marked as a {} import. \
             Are you *absolutely* sure this is right? Set {} to skip this check.",
            other, playtype, ASSERT_PLAYTYPE_KEY
        )));
    }

    Ok(())
}
