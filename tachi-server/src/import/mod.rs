//! Score import pipeline
//!
//! An import runs as a straight line of stages:
//!
//! 1. **Detect** - pick the format family from the import type, then the row
//!    layout from the payload's shape
//! 2. **Extract** - read scores out of each row, skipping unplayed slots
//! 3. **Version** - fold row versions into the batch's newest version and
//!    check it against the configured allowlist and the game's known versions
//! 4. **Context** - settle game, playtype, service and version once per batch
//! 5. **Assemble** - attach the context to every record
//!
//! Any failure aborts the whole import. No partial output is returned.

pub mod assemble;
pub mod context;
pub mod csv;
pub mod detect;
pub mod error;
pub mod extract;
pub mod types;
pub mod version;

use std::sync::Arc;

use serde::Serialize;
use tachi_common::config::ImportConfig;
use tachi_common::game::{pretty_version, GameConfigTable};
use tachi_common::versions::{ModelVersionTable, VersionTable};
use tachi_common::{Game, GamePlaytype, ImportType};
use tracing::info;

use context::{ImportContext, ImportMetadata};
use detect::SourceFormat;
use error::{ImportError, ImportResult};
use types::{CanonicalScoreCandidate, IntermediateScoreRecord};

/// An import request as received
#[derive(Debug, Clone, Default)]
pub struct RawPayload {
    pub bytes: Vec<u8>,
    pub metadata: ImportMetadata,
    /// Name of the uploaded file, for file imports
    pub filename: Option<String>,
    /// Game client model string, for hook imports
    pub software_model: Option<String>,
}

/// Lookup tables the pipeline reads from
///
/// Passed in explicitly so tests and alternate deployments can swap them.
#[derive(Debug, Clone)]
pub struct ImportTables {
    /// e-amusement version names, shared by the CSV and ARC extractors
    pub eamusement_versions: Arc<VersionTable>,
    /// Hook software model to version token
    pub software_models: Arc<ModelVersionTable>,
    pub game_config: Arc<GameConfigTable>,
    pub config: Arc<ImportConfig>,
}

impl ImportTables {
    /// Built-in IIDX tables with the given allowlist and game configuration
    pub fn new(config: Arc<ImportConfig>, game_config: Arc<GameConfigTable>) -> Self {
        Self {
            eamusement_versions: Arc::new(VersionTable::eamusement_iidx()),
            software_models: Arc::new(ModelVersionTable::iidx()),
            game_config,
            config,
        }
    }
}

/// Output of a format extractor
#[derive(Debug)]
pub struct Extracted {
    pub records: Vec<IntermediateScoreRecord>,
    pub context: ImportContext,
}

/// Final result of a successful import
#[derive(Debug, Clone, Serialize)]
pub struct ParserOutput {
    pub game: Game,
    pub context: ImportContext,
    pub iterable: Vec<CanonicalScoreCandidate>,
}

/// Run the full pipeline for one import
pub fn parse_import(
    import_type: ImportType,
    payload: &RawPayload,
    tables: &ImportTables,
) -> ImportResult<ParserOutput> {
    let format = SourceFormat::for_import_type(import_type).ok_or_else(|| {
        info!(import_type = %import_type, "Import type not supported by this server");
        ImportError::bad_request(format!(
            "Import type {} is not supported by this server.",
            import_type
        ))
    })?;

    let mut extracted = match format {
        SourceFormat::EamusementCsv => extract::eamusement_csv::parse(payload, import_type, tables)?,
        SourceFormat::ArcApi => extract::arc_api::parse(payload, import_type, tables)?,
        SourceFormat::FervidexHook => extract::fervidex::parse(payload, import_type, tables)?,
    };

    settle_version(&mut extracted.context, &tables.game_config)?;
    let iterable = assemble::assemble(extracted.records, &extracted.context);

    info!(
        import_type = %import_type,
        playtype = %extracted.context.playtype,
        version = %extracted.context.version,
        scores = iterable.len(),
        "Import parsed"
    );

    Ok(ParserOutput {
        game: extracted.context.game,
        context: extracted.context,
        iterable,
    })
}

/// Confirm the batch version is one the game knows and attach its display name
///
/// The allowlist is operator configuration, so a version it lets through
/// that the game does not know is a server fault.
fn settle_version(context: &mut ImportContext, game_config: &GameConfigTable) -> ImportResult<()> {
    let gpt = GamePlaytype {
        game: context.game,
        playtype: context.playtype,
    };
    let config = game_config
        .require(gpt)
        .map_err(|e| ImportError::internal(e.to_string()))?;

    if !config.supports_version(&context.version) {
        tracing::error!(gpt = %gpt, version = %context.version, "Allowed import version unknown to game config");
        return Err(ImportError::internal(format!(
            "Version {} is not a version of {}.",
            context.version,
            gpt.format_human()
        )));
    }

    context.version_name = pretty_version(gpt, &context.version).map(str::to_string);
    Ok(())
}
