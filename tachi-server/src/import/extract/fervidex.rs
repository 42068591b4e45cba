//! fervidex game-client hook submissions
//!
//! The hook posts one score per request. The chart is written as play style
//! plus difficulty letter (`spa` = SP ANOTHER), and the game version comes
//! from the `X-Software-Model` header rather than the body.

use serde::Deserialize;
use serde_json::Value;
use tachi_common::{Difficulty, ImportType, Playtype};
use tracing::{debug, info};

use crate::import::context::{ContextBuilder, FormatFlags};
use crate::import::detect::{self, SourceFormat};
use crate::import::error::{ImportError, ImportResult};
use crate::import::types::{ChartIdentifier, IntermediateScoreRecord, RawScoreFields};
use crate::import::version::ensure_supported;
use crate::import::{Extracted, ImportTables, RawPayload};

/// `clear_type` the hook reports for a chart that was never played
const NO_PLAY: u8 = 0;

#[derive(Debug, Deserialize)]
struct FervidexScore {
    chart: String,
    entry_id: u32,
    ex_score: u32,
    pgreat: u32,
    great: u32,
    good: u32,
    bad: u32,
    poor: u32,
    clear_type: u8,
    #[serde(default)]
    max_combo: Option<u32>,
    #[serde(default)]
    fast: Option<u32>,
    #[serde(default)]
    slow: Option<u32>,
}

/// Split a chart code such as `dph` into playtype and difficulty
fn parse_chart(chart: &str) -> ImportResult<(Playtype, Difficulty)> {
    let invalid = || ImportError::bad_request(format!("Invalid chart '{}'.", chart));

    let playtype = match chart.get(..2) {
        Some("sp") => Playtype::SP,
        Some("dp") => Playtype::DP,
        _ => return Err(invalid()),
    };
    let difficulty = match &chart[2..] {
        "b" => Difficulty::Beginner,
        "n" => Difficulty::Normal,
        "h" => Difficulty::Hyper,
        "a" => Difficulty::Another,
        "l" => Difficulty::Leggendaria,
        _ => return Err(invalid()),
    };

    Ok((playtype, difficulty))
}

pub fn parse(
    payload: &RawPayload,
    import_type: ImportType,
    tables: &ImportTables,
) -> ImportResult<Extracted> {
    let model = payload.software_model.as_deref().ok_or_else(|| {
        ImportError::bad_request("Missing X-Software-Model header.")
    })?;
    let version = tables.software_models.resolve(model).ok_or_else(|| {
        info!(model, "Unsupported software model");
        ImportError::bad_request(format!("Unsupported Software Model '{}'.", model))
    })?;
    ensure_supported(version, tables.config.allowed_versions(import_type))?;

    let value: Value = serde_json::from_slice(&payload.bytes)
        .map_err(|e| ImportError::bad_request(format!("Invalid fervidex score. {}", e)))?;
    detect::detect_json(SourceFormat::FervidexHook, &value)?;

    let score: FervidexScore = serde_json::from_value(value)
        .map_err(|e| ImportError::bad_request(format!("Invalid fervidex score. {}", e)))?;
    let (playtype, difficulty) = parse_chart(&score.chart)?;

    let mut records = Vec::new();
    if score.clear_type != NO_PLAY {
        records.push(IntermediateScoreRecord {
            difficulty,
            identifier: ChartIdentifier::InGameId(score.entry_id),
            timestamp_raw: None,
            score: RawScoreFields::Fervidex {
                ex_score: score.ex_score,
                pgreat: score.pgreat,
                great: score.great,
                good: score.good,
                bad: score.bad,
                poor: score.poor,
                clear_type: score.clear_type,
                max_combo: score.max_combo,
                fast: score.fast,
                slow: score.slow,
            },
        });
    }

    debug!(chart = %score.chart, entry_id = score.entry_id, version, "Parsed fervidex score");

    let flags = FormatFlags {
        has_beginner_and_legg: true,
    };

    Ok(Extracted {
        records,
        context: ContextBuilder::new(playtype, SourceFormat::service(import_type))
            .build(version.to_string(), flags),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tachi_common::config::ImportConfig;
    use tachi_common::game::GameConfigTable;

    fn tables() -> ImportTables {
        ImportTables::new(
            Arc::new(ImportConfig::default()),
            Arc::new(GameConfigTable::builtin()),
        )
    }

    fn submission(chart: &str, clear_type: u8, model: Option<&str>) -> RawPayload {
        let body = json!({
            "chart": chart,
            "entry_id": 25094,
            "ex_score": 2500,
            "pgreat": 1100,
            "great": 300,
            "good": 10,
            "bad": 2,
            "poor": 5,
            "clear_type": clear_type,
            "max_combo": 900,
        });
        RawPayload {
            bytes: serde_json::to_vec(&body).unwrap(),
            metadata: Default::default(),
            filename: None,
            software_model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_chart_codes() {
        assert_eq!(parse_chart("spa").unwrap(), (Playtype::SP, Difficulty::Another));
        assert_eq!(parse_chart("dpl").unwrap(), (Playtype::DP, Difficulty::Leggendaria));
        assert!(parse_chart("sp").is_err());
        assert!(parse_chart("xpa").is_err());
        assert!(parse_chart("spx").is_err());
        assert!(parse_chart("spaa").is_err());
    }

    #[test]
    fn test_score_takes_playtype_from_chart() {
        let payload = submission("dph", 5, Some("LDJ:J:B:A:2020102800"));
        let extracted = parse(&payload, ImportType::IrFervidex, &tables()).unwrap();

        assert_eq!(extracted.records.len(), 1);
        assert_eq!(extracted.records[0].difficulty, Difficulty::Hyper);
        assert_eq!(extracted.records[0].identifier, ChartIdentifier::InGameId(25094));
        assert_eq!(extracted.context.playtype, Playtype::DP);
        assert_eq!(extracted.context.version, "28");
        assert_eq!(extracted.context.service, "Fervidex");
    }

    #[test]
    fn test_infinitas_model_is_accepted() {
        let payload = submission("spa", 4, Some("P2D:J:B:A:2021090600"));
        let extracted = parse(&payload, ImportType::IrFervidex, &tables()).unwrap();

        assert_eq!(extracted.context.version, "inf");
        assert_eq!(extracted.records.len(), 1);
    }

    #[test]
    fn test_no_play_yields_no_records() {
        let payload = submission("spa", 0, Some("LDJ:J:B:A:2021101300"));
        let extracted = parse(&payload, ImportType::IrFervidex, &tables()).unwrap();
        assert!(extracted.records.is_empty());
    }

    #[test]
    fn test_software_model_is_required_and_checked() {
        let err = parse(&submission("spa", 4, None), ImportType::IrFervidex, &tables()).unwrap_err();
        assert!(err.message.contains("X-Software-Model"));

        let err = parse(
            &submission("spa", 4, Some("KFC:J:B:A:2020102800")),
            ImportType::IrFervidex,
            &tables(),
        )
        .unwrap_err();
        assert!(err.message.contains("'KFC:J:B:A:2020102800'"));

        // ROOTAGE is recognised but not accepted from the hook
        let err = parse(
            &submission("spa", 4, Some("LDJ:J:B:A:2019010100")),
            ImportType::IrFervidex,
            &tables(),
        )
        .unwrap_err();
        assert!(err.message.contains("Only versions 27, 28, 29 and inf are supported."));
    }
}
