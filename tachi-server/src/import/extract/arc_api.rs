//! ARC vendor API score listings
//!
//! A page looks like:
//!
//! ```json
//! {
//!   "_items": [{
//!     "chart": { "difficulty": "ANOTHER", "play_style": "SINGLE", "level": 12 },
//!     "music": { "title": "5.1.1." },
//!     "ex_score": 1800, "lamp": "HARD_CLEAR", "miss_count": 4,
//!     "timestamp": "2021-03-01T12:00:00Z", "game_version": "HEROIC VERSE"
//!   }],
//!   "_links": { "_next": null }
//! }
//! ```
//!
//! The API returns both play styles; items for the other style are skipped.

use serde::Deserialize;
use serde_json::Value;
use tachi_common::{Difficulty, ImportType, Playtype};
use tracing::debug;

use crate::import::context::{ContextBuilder, FormatFlags};
use crate::import::detect::{self, SourceFormat};
use crate::import::error::{ImportError, ImportResult};
use crate::import::types::{ChartIdentifier, IntermediateScoreRecord, RawScoreFields};
use crate::import::version::VersionTracker;
use crate::import::{Extracted, ImportTables, RawPayload};

#[derive(Debug, Deserialize)]
struct ArcPage {
    #[serde(rename = "_items")]
    items: Vec<ArcScore>,
}

#[derive(Debug, Deserialize)]
struct ArcScore {
    chart: ArcChart,
    music: ArcMusic,
    ex_score: u32,
    lamp: String,
    #[serde(default)]
    miss_count: Option<u32>,
    timestamp: String,
    game_version: String,
}

#[derive(Debug, Deserialize)]
struct ArcChart {
    difficulty: Difficulty,
    play_style: ArcPlayStyle,
    level: u32,
}

#[derive(Debug, Deserialize)]
struct ArcMusic {
    title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum ArcPlayStyle {
    Single,
    Double,
}

impl ArcPlayStyle {
    fn playtype(self) -> Playtype {
        match self {
            ArcPlayStyle::Single => Playtype::SP,
            ArcPlayStyle::Double => Playtype::DP,
        }
    }
}

fn extract_item(
    item: ArcScore,
    playtype: Playtype,
    versions: &mut VersionTracker<'_>,
) -> ImportResult<Option<IntermediateScoreRecord>> {
    if item.chart.play_style.playtype() != playtype {
        return Ok(None);
    }

    versions.observe(&item.game_version)?;

    if item.lamp == "NO_PLAY" {
        return Ok(None);
    }

    Ok(Some(IntermediateScoreRecord {
        difficulty: item.chart.difficulty,
        identifier: ChartIdentifier::Title(item.music.title),
        timestamp_raw: Some(item.timestamp),
        score: RawScoreFields::Arc {
            level: item.chart.level,
            ex_score: item.ex_score,
            lamp: item.lamp,
            miss_count: item.miss_count,
        },
    }))
}

pub fn parse(
    payload: &RawPayload,
    import_type: ImportType,
    tables: &ImportTables,
) -> ImportResult<Extracted> {
    let builder = ContextBuilder::for_api(&payload.metadata, SourceFormat::service(import_type))?;

    let value: Value = serde_json::from_slice(&payload.bytes)
        .map_err(|e| ImportError::bad_request(format!("Invalid ARC response. {}", e)))?;
    detect::detect_json(SourceFormat::ArcApi, &value)?;

    let page: ArcPage = serde_json::from_value(value)
        .map_err(|e| ImportError::bad_request(format!("Invalid ARC score. {}", e)))?;

    let item_count = page.items.len();
    let mut versions = VersionTracker::new(&tables.eamusement_versions);
    let mut records = Vec::new();
    for item in page.items {
        records.extend(extract_item(item, builder.playtype(), &mut versions)?);
    }

    let version = versions.finish(tables.config.allowed_versions(import_type))?;
    debug!(
        items = item_count,
        scores = records.len(),
        version = %version,
        "Parsed ARC page"
    );

    Ok(Extracted {
        records,
        context: builder.build(version, FormatFlags::default()),
    })
}
