//! Quest endpoints under `/api/v1/games/:game/:playtype/targets/quests`

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::error;

use super::{resolve_gpt, resolve_user, EvaluateForQuery};
use crate::goals::{GoalError, QuestProgress};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct QuestEvaluationResponse {
    pub description: String,
    pub body: QuestProgress,
}

/// GET /api/v1/games/:game/:playtype/targets/quests/:quest_id/evaluate-for?userID=
pub async fn evaluate_quest_for(
    State(state): State<AppState>,
    Path((game, playtype, quest_id)): Path<(String, String, String)>,
    Query(query): Query<EvaluateForQuery>,
) -> ApiResult<Json<QuestEvaluationResponse>> {
    let gpt = resolve_gpt(&state, &game, &playtype)?;
    let quest = state
        .datastore
        .find_quest(&quest_id, gpt)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("A quest with ID {} doesn't exist.", quest_id)))?;
    let user = resolve_user(&state, &query).await?;

    let progress = match state.quests.evaluate_quest(&quest, user.id).await {
        Ok(progress) => progress,
        Err(GoalError::NotAPlayer { gpt, .. }) => {
            return Err(ApiError::BadRequest(format!(
                "The user {} hasn't played {}.",
                user.username,
                gpt.format_human()
            )));
        }
        Err(err) => {
            error!(quest_id = %quest.quest_id, user_id = user.id, error = %err, "Quest evaluation failed");
            state.record_error(err.to_string()).await;
            return Err(err.into());
        }
    };

    Ok(Json(QuestEvaluationResponse {
        description: format!(
            "Evaluated {} for {} ({}/{} goals achieved).",
            quest.name, user.username, progress.progress, progress.out_of
        ),
        body: progress,
    }))
}

pub fn quest_routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/games/:game/:playtype/targets/quests/:quest_id/evaluate-for",
        get(evaluate_quest_for),
    )
}
