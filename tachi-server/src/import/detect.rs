//! Source format detection
//!
//! Picks the row-shape rules for a payload from its shape alone: the exact
//! header count for CSV exports, the top-level keys for JSON payloads.
//! Anything that doesn't match a known shape is rejected outright.

use serde_json::Value;
use tachi_common::ImportType;
use tracing::{debug, info};

use super::error::{ImportError, ImportResult};

/// CSV exports from before HEROIC VERSE: NORMAL, HYPER, ANOTHER
pub const PRE_HV_HEADER_COUNT: usize = 27;

/// CSV exports from HEROIC VERSE onwards: adds BEGINNER and LEGGENDARIA
pub const HV_HEADER_COUNT: usize = 41;

/// Keys every fervidex score submission carries
const FERVIDEX_REQUIRED_KEYS: &[&str] = &[
    "chart", "entry_id", "ex_score", "pgreat", "great", "good", "bad", "poor", "clear_type",
];

/// Source format families this server can extract scores from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Spreadsheet export of an e-amusement (or compatible) IIDX profile
    EamusementCsv,
    /// Paginated score listing from the ARC vendor API
    ArcApi,
    /// Single score pushed by the fervidex game-client hook
    FervidexHook,
}

impl SourceFormat {
    /// Format family handling an import type, if this server supports it
    pub fn for_import_type(import_type: ImportType) -> Option<Self> {
        match import_type {
            ImportType::FileEamusementIidxCsv | ImportType::FilePliIidxCsv => {
                Some(SourceFormat::EamusementCsv)
            }
            ImportType::ApiArcIidx => Some(SourceFormat::ArcApi),
            ImportType::IrFervidex => Some(SourceFormat::FervidexHook),
            _ => None,
        }
    }

    /// Service name recorded against scores from an import type
    pub fn service(import_type: ImportType) -> &'static str {
        match import_type {
            ImportType::FilePliIidxCsv => "PLI",
            ImportType::ApiArcIidx => "ARC",
            ImportType::IrFervidex => "Fervidex",
            _ => "e-amusement",
        }
    }
}

/// Row-shape rules selected for a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVariant {
    /// 27-column CSV
    EamCsvPreHeroicVerse,
    /// 41-column CSV
    EamCsvHeroicVerse,
    /// `{"_items": [...]}` page of ARC scores
    ArcPage,
    /// One fervidex score object
    FervidexScore,
}

impl FormatVariant {
    pub fn has_beginner_and_legg(&self) -> bool {
        matches!(self, FormatVariant::EamCsvHeroicVerse)
    }
}

/// Select the CSV layout from the exact header count
pub fn detect_csv(headers: &[String]) -> ImportResult<FormatVariant> {
    match headers.len() {
        PRE_HV_HEADER_COUNT => {
            debug!("Pre-HEROIC VERSE CSV received");
            Ok(FormatVariant::EamCsvPreHeroicVerse)
        }
        HV_HEADER_COUNT => {
            debug!("HEROIC VERSE+ CSV received");
            Ok(FormatVariant::EamCsvHeroicVerse)
        }
        count => {
            info!(header_count = count, "Invalid CSV header count received");
            Err(ImportError::bad_request(format!(
                "Invalid CSV provided. CSV has {} headers, but expected exactly {} or {}.",
                count, PRE_HV_HEADER_COUNT, HV_HEADER_COUNT
            )))
        }
    }
}

/// Select the variant for a JSON payload from its top-level shape
pub fn detect_json(format: SourceFormat, payload: &Value) -> ImportResult<FormatVariant> {
    let object = payload.as_object().ok_or_else(|| {
        ImportError::bad_request("Invalid payload provided. Expected a JSON object.")
    })?;

    match format {
        SourceFormat::ArcApi => match object.get("_items") {
            Some(Value::Array(_)) => Ok(FormatVariant::ArcPage),
            Some(_) => Err(ImportError::bad_request(
                "Invalid ARC response. '_items' is not an array.",
            )),
            None => Err(ImportError::bad_request(
                "Invalid ARC response. Missing '_items'.",
            )),
        },
        SourceFormat::FervidexHook => {
            let missing: Vec<&str> = FERVIDEX_REQUIRED_KEYS
                .iter()
                .copied()
                .filter(|key| !object.contains_key(*key))
                .collect();

            if missing.is_empty() {
                Ok(FormatVariant::FervidexScore)
            } else {
                Err(ImportError::bad_request(format!(
                    "Invalid fervidex score. Missing {}.",
                    missing.join(", ")
                )))
            }
        }
        SourceFormat::EamusementCsv => Err(ImportError::internal(
            "CSV formats are detected from their headers, not JSON.",
        )),
    }
}
