//! Records produced by the import pipeline

use serde::Serialize;
use tachi_common::Difficulty;

use super::context::ImportContext;

/// How a source identifies the chart a score was set on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ChartIdentifier {
    /// Song title as written by the source
    Title(String),
    /// The game's internal song ID
    InGameId(u32),
}

/// Score fields exactly as a source reported them
///
/// Nothing here is validated against game rules; lamps, grades and
/// judgement counts are interpreted downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RawScoreFields {
    Eamusement {
        level: String,
        exscore: String,
        pgreat: String,
        great: String,
        bp: String,
        lamp: String,
    },
    Arc {
        level: u32,
        ex_score: u32,
        lamp: String,
        miss_count: Option<u32>,
    },
    Fervidex {
        ex_score: u32,
        pgreat: u32,
        great: u32,
        good: u32,
        bad: u32,
        poor: u32,
        clear_type: u8,
        max_combo: Option<u32>,
        fast: Option<u32>,
        slow: Option<u32>,
    },
}

/// One score on one difficulty, as extracted from a source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateScoreRecord {
    pub difficulty: Difficulty,
    pub identifier: ChartIdentifier,
    pub timestamp_raw: Option<String>,
    pub score: RawScoreFields,
}

/// Pipeline output unit, ready for chart matching and score conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalScoreCandidate {
    pub identifier: ChartIdentifier,
    pub timestamp: Option<String>,
    pub difficulty: Difficulty,
    pub score: RawScoreFields,
    pub context: ImportContext,
}
