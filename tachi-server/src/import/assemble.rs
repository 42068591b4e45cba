//! Canonical score assembly
//!
//! Everything that can reject an import has already run by the time records
//! reach this stage, so assembly cannot fail.

use super::context::ImportContext;
use super::types::{CanonicalScoreCandidate, IntermediateScoreRecord};

/// Attach the import context to every record, preserving order
pub fn assemble(
    records: Vec<IntermediateScoreRecord>,
    context: &ImportContext,
) -> Vec<CanonicalScoreCandidate> {
    records
        .into_iter()
        .map(|record| CanonicalScoreCandidate {
            identifier: record.identifier,
            timestamp: record.timestamp_raw,
            difficulty: record.difficulty,
            score: record.score,
            context: context.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::context::FormatFlags;
    use crate::import::types::{ChartIdentifier, RawScoreFields};
    use tachi_common::{Difficulty, Game, Playtype};

    fn record(title: &str, difficulty: Difficulty) -> IntermediateScoreRecord {
        IntermediateScoreRecord {
            difficulty,
            identifier: ChartIdentifier::Title(title.to_string()),
            timestamp_raw: Some("2021-01-01 00:00".to_string()),
            score: RawScoreFields::Arc {
                level: 12,
                ex_score: 2000,
                lamp: "CLEAR".to_string(),
                miss_count: None,
            },
        }
    }

    #[test]
    fn test_preserves_order_and_attaches_context() {
        let context = ImportContext {
            game: Game::Iidx,
            playtype: Playtype::SP,
            version: "28".to_string(),
            version_name: Some("BISTROVER".to_string()),
            service: "ARC".to_string(),
            flags: FormatFlags::default(),
        };
        let records = vec![
            record("B", Difficulty::Hyper),
            record("A", Difficulty::Another),
            record("B", Difficulty::Normal),
        ];

        let candidates = assemble(records.clone(), &context);

        assert_eq!(candidates.len(), 3);
        for (candidate, record) in candidates.iter().zip(&records) {
            assert_eq!(candidate.identifier, record.identifier);
            assert_eq!(candidate.difficulty, record.difficulty);
            assert_eq!(candidate.context, context);
        }
    }

    #[test]
    fn test_empty_input() {
        let context = ImportContext {
            game: Game::Iidx,
            playtype: Playtype::DP,
            version: "27".to_string(),
            version_name: None,
            service: "ARC".to_string(),
            flags: FormatFlags::default(),
        };
        assert!(assemble(Vec::new(), &context).is_empty());
    }
}
