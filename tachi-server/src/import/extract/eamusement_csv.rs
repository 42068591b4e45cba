//! e-amusement IIDX CSV exports (also produced by PLI)
//!
//! Row layout:
//!
//! ```text
//! version, title, genre, artist, playcount,
//! [BEGINNER slot,] NORMAL slot, HYPER slot, ANOTHER slot, [LEGGENDARIA slot,]
//! timestamp
//! ```
//!
//! Each slot is [`SLOT_WIDTH`] cells starting at [`FIRST_SLOT`]:
//! level, exscore, pgreat, great, bp, lamp, grade. BEGINNER and LEGGENDARIA
//! slots only exist in the 41-column layout.

use tachi_common::{Difficulty, ImportType};
use tracing::debug;

use crate::import::context::{ContextBuilder, FormatFlags};
use crate::import::csv::{NaiveCsv, ParsedRow};
use crate::import::detect::{self, FormatVariant};
use crate::import::error::{ImportError, ImportResult};
use crate::import::types::{ChartIdentifier, IntermediateScoreRecord, RawScoreFields};
use crate::import::version::VersionTracker;
use crate::import::{Extracted, ImportTables, RawPayload};

/// Index of the first difficulty slot
pub const FIRST_SLOT: usize = 5;

/// Cells per difficulty slot
pub const SLOT_WIDTH: usize = 7;

const VERSION_CELL: usize = 0;
const TITLE_CELL: usize = 1;

// Offsets within a slot
const LEVEL: usize = 0;
const EXSCORE: usize = 1;
const PGREAT: usize = 2;
const GREAT: usize = 3;
const BP: usize = 4;
const LAMP: usize = 5;

const PRE_HV_DIFFICULTIES: &[Difficulty] =
    &[Difficulty::Normal, Difficulty::Hyper, Difficulty::Another];

const HV_DIFFICULTIES: &[Difficulty] = &[
    Difficulty::Beginner,
    Difficulty::Normal,
    Difficulty::Hyper,
    Difficulty::Another,
    Difficulty::Leggendaria,
];

fn slot_difficulties(variant: FormatVariant) -> ImportResult<&'static [Difficulty]> {
    match variant {
        FormatVariant::EamCsvPreHeroicVerse => Ok(PRE_HV_DIFFICULTIES),
        FormatVariant::EamCsvHeroicVerse => Ok(HV_DIFFICULTIES),
        other => Err(ImportError::internal(format!(
            "{:?} is not an e-amusement CSV layout.",
            other
        ))),
    }
}

/// A slot the player has never played has level 0 or lamp NO PLAY
fn is_unplayed(level: &str, lamp: &str) -> bool {
    level.is_empty() || level == "0" || lamp == "NO PLAY"
}

/// Extract the played difficulty slots of one row
pub fn extract_row(
    row: &ParsedRow,
    variant: FormatVariant,
    versions: &mut VersionTracker<'_>,
) -> ImportResult<Vec<IntermediateScoreRecord>> {
    versions.observe(row.cell(VERSION_CELL)?)?;

    let title = row.cell(TITLE_CELL)?.trim();
    let timestamp = row.cell(row.len().saturating_sub(1))?.trim();

    let mut records = Vec::new();
    for (slot, difficulty) in slot_difficulties(variant)?.iter().enumerate() {
        let base = FIRST_SLOT + slot * SLOT_WIDTH;
        let level = row.cell(base + LEVEL)?;
        let lamp = row.cell(base + LAMP)?;

        if is_unplayed(level, lamp) {
            continue;
        }

        records.push(IntermediateScoreRecord {
            difficulty: *difficulty,
            identifier: ChartIdentifier::Title(title.to_string()),
            timestamp_raw: Some(timestamp.to_string()),
            score: RawScoreFields::Eamusement {
                level: level.to_string(),
                exscore: row.cell(base + EXSCORE)?.to_string(),
                pgreat: row.cell(base + PGREAT)?.to_string(),
                great: row.cell(base + GREAT)?.to_string(),
                bp: row.cell(base + BP)?.to_string(),
                lamp: lamp.to_string(),
            },
        });
    }

    Ok(records)
}

/// Parse an uploaded CSV into scores and context
pub fn parse(
    payload: &RawPayload,
    import_type: ImportType,
    tables: &ImportTables,
) -> ImportResult<Extracted> {
    let service = detect::SourceFormat::service(import_type);
    let builder = ContextBuilder::for_file(&payload.metadata, payload.filename.as_deref(), service)?;

    let text = NaiveCsv::decode(&payload.bytes)?;
    let csv = NaiveCsv::open(text)?;
    let variant = detect::detect_csv(&csv.headers)?;
    let rows = csv.rows()?;

    let mut versions = VersionTracker::new(&tables.eamusement_versions);
    let mut records = Vec::new();
    for row in &rows {
        records.extend(extract_row(row, variant, &mut versions)?);
    }

    let version = versions.finish(tables.config.allowed_versions(import_type))?;
    debug!(
        rows = rows.len(),
        scores = records.len(),
        version = %version,
        "Parsed e-amusement CSV"
    );

    let flags = FormatFlags {
        has_beginner_and_legg: variant.has_beginner_and_legg(),
    };

    Ok(Extracted {
        records,
        context: builder.build(version, flags),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tachi_common::versions::VersionTable;

    fn slot(level: &str, exscore: &str, lamp: &str) -> Vec<String> {
        [level, exscore, "100", "50", "12", lamp, "AA"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row_text(version: &str, title: &str, slots: Vec<Vec<String>>) -> String {
        let mut cells: Vec<String> = vec![
            version.to_string(),
            title.to_string(),
            "GENRE".to_string(),
            "ARTIST".to_string(),
            "3".to_string(),
        ];
        for s in slots {
            cells.extend(s);
        }
        cells.push("2021-04-02 13:20".to_string());
        cells.join(",")
    }

    fn parse_rows(text: &str) -> Vec<ParsedRow> {
        NaiveCsv::open(text).unwrap().rows().unwrap()
    }

    #[test]
    fn test_slot_offsets_cover_the_whole_row() {
        assert_eq!(FIRST_SLOT + PRE_HV_DIFFICULTIES.len() * SLOT_WIDTH + 1, 27);
        assert_eq!(FIRST_SLOT + HV_DIFFICULTIES.len() * SLOT_WIDTH + 1, 41);
    }

    #[test]
    fn test_extracts_played_slots_only() {
        let header = vec!["h"; 27].join(",");
        let row = row_text(
            "Rootage",
            " 5.1.1. ",
            vec![
                slot("3", "400", "CLEAR"),
                slot("0", "0", "NO PLAY"),
                slot("10", "1500", "HARD CLEAR"),
            ],
        );
        let rows = parse_rows(&format!("{}\n{}\n", header, row));

        let table = VersionTable::eamusement_iidx();

        let mut versions = VersionTracker::new(&table);
        let records =
            extract_row(&rows[0], FormatVariant::EamCsvPreHeroicVerse, &mut versions).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].difficulty, Difficulty::Normal);
        assert_eq!(records[1].difficulty, Difficulty::Another);
        assert_eq!(records[0].identifier, ChartIdentifier::Title("5.1.1.".to_string()));
        assert_eq!(records[1].timestamp_raw.as_deref(), Some("2021-04-02 13:20"));
        match &records[1].score {
            RawScoreFields::Eamusement { level, exscore, lamp, bp, .. } => {
                assert_eq!(level, "10");
                assert_eq!(exscore, "1500");
                assert_eq!(lamp, "HARD CLEAR");
                assert_eq!(bp, "12");
            }
            other => panic!("unexpected score fields {:?}", other),
        }
        assert_eq!(versions.newest().map(|r| r.0), Some(26));
    }

    #[test]
    fn test_heroic_verse_layout_reads_beginner_and_leggendaria() {
        let header = vec!["h"; 41].join(",");
        let row = row_text(
            "HEROIC VERSE",
            "Song",
            vec![
                slot("1", "100", "CLEAR"),
                slot("0", "0", "NO PLAY"),
                slot("0", "0", "NO PLAY"),
                slot("0", "0", "NO PLAY"),
                slot("12", "2500", "FAILED"),
            ],
        );
        let rows = parse_rows(&format!("{}\n{}\n", header, row));

        let table = VersionTable::eamusement_iidx();

        let mut versions = VersionTracker::new(&table);
        let records =
            extract_row(&rows[0], FormatVariant::EamCsvHeroicVerse, &mut versions).unwrap();

        let difficulties: Vec<_> = records.iter().map(|r| r.difficulty).collect();
        assert_eq!(difficulties, [Difficulty::Beginner, Difficulty::Leggendaria]);
    }

    #[test]
    fn test_unknown_version_label_fails_the_row() {
        let header = vec!["h"; 27].join(",");
        let row = row_text(
            "BEATMANIA US",
            "Song",
            vec![slot("1", "1", "CLEAR"), slot("1", "1", "CLEAR"), slot("1", "1", "CLEAR")],
        );
        let rows = parse_rows(&format!("{}\n{}\n", header, row));

        let table = VersionTable::eamusement_iidx();

        let mut versions = VersionTracker::new(&table);
        let err = extract_row(&rows[0], FormatVariant::EamCsvPreHeroicVerse, &mut versions)
            .unwrap_err();
        assert!(err.message.contains("'BEATMANIA US'"));
    }

    #[test]
    fn test_non_csv_variant_is_internal_error() {
        let err = slot_difficulties(FormatVariant::ArcPage).unwrap_err();
        assert_eq!(err.status.as_u16(), 500);
    }
}
