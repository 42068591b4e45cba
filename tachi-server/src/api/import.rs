//! Score import endpoint
//!
//! `POST /api/v1/import/{import type}` takes the raw payload as the request
//! body. Query parameters become the import's metadata (`playtype`,
//! `assertPlaytypeCorrect`); the uploaded file's name and the game client's
//! model arrive as headers.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tachi_common::{ImportKind, ImportType};
use tracing::{error, info};

use crate::import::context::ImportMetadata;
use crate::import::error::StatusClass;
use crate::import::{parse_import, ParserOutput, RawPayload};
use crate::{ApiError, ApiResult, AppState};

pub const FILENAME_HEADER: &str = "X-Filename";
pub const SOFTWARE_MODEL_HEADER: &str = "X-Software-Model";

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// POST /api/v1/import/*import_type
pub async fn import_scores(
    State(state): State<AppState>,
    Path(import_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ParserOutput>> {
    let import_type: ImportType = import_type.parse().map_err(|_| {
        ApiError::BadRequest(format!("Unknown import type '{}'.", import_type))
    })?;

    let metadata: ImportMetadata = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    // Uploads are named by the user; pushed scores carry the client's model
    let kind = import_type.kind();
    let payload = RawPayload {
        bytes: body.to_vec(),
        metadata,
        filename: match kind {
            ImportKind::File => header_string(&headers, FILENAME_HEADER),
            _ => None,
        },
        software_model: match kind {
            ImportKind::Ir => header_string(&headers, SOFTWARE_MODEL_HEADER),
            _ => None,
        },
    };

    info!(
        import_type = %import_type,
        bytes = payload.bytes.len(),
        filename = ?payload.filename,
        "Received import"
    );

    match parse_import(import_type, &payload, &state.tables) {
        Ok(output) => Ok(Json(output)),
        Err(err) => {
            if err.status == StatusClass::Internal {
                error!(import_type = %import_type, error = %err, "Import failed internally");
                state.record_error(format!("Import {} failed: {}", import_type, err)).await;
            }
            Err(err.into())
        }
    }
}

pub fn import_routes() -> Router<AppState> {
    Router::new().route("/api/v1/import/*import_type", post(import_scores))
}
