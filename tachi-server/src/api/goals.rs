//! Goal endpoints under `/api/v1/games/:game/:playtype/targets/goals`

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tachi_common::GamePlaytype;
use tracing::error;

use super::{resolve_gpt, resolve_user, EvaluateForQuery};
use crate::goals::types::{EvaluatedGoalReturn, Goal, GoalSubscription, Quest, User};
use crate::goals::GoalError;
use crate::{ApiError, ApiResult, AppState};

/// Number of goals returned by the popular listing
pub const POPULAR_GOAL_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInfoResponse {
    pub goal: Goal,
    pub goal_subs: Vec<GoalSubscription>,
    pub users: Vec<User>,
    pub parent_quests: Vec<Quest>,
}

#[derive(Debug, Serialize)]
pub struct GoalEvaluationResponse {
    pub description: String,
    /// "subscription" or "live"
    pub source: &'static str,
    pub body: EvaluatedGoalReturn,
}

async fn resolve_goal(state: &AppState, goal_id: &str, gpt: GamePlaytype) -> ApiResult<Goal> {
    state
        .datastore
        .find_goal(goal_id, gpt)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("A goal with ID {} doesn't exist.", goal_id)))
}

/// GET /api/v1/games/:game/:playtype/targets/goals/popular
pub async fn popular_goals(
    State(state): State<AppState>,
    Path((game, playtype)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Goal>>> {
    let gpt = resolve_gpt(&state, &game, &playtype)?;
    let goals = state
        .datastore
        .most_subscribed_goals(gpt, POPULAR_GOAL_LIMIT)
        .await?;
    Ok(Json(goals))
}

/// GET /api/v1/games/:game/:playtype/targets/goals/:goal_id
///
/// The goal, everyone subscribed to it, and the quests it belongs to.
pub async fn goal_info(
    State(state): State<AppState>,
    Path((game, playtype, goal_id)): Path<(String, String, String)>,
) -> ApiResult<Json<GoalInfoResponse>> {
    let gpt = resolve_gpt(&state, &game, &playtype)?;
    let goal = resolve_goal(&state, &goal_id, gpt).await?;

    let goal_subs = state.datastore.find_subscribers_of(&goal.goal_id).await?;
    let user_ids: Vec<i64> = goal_subs.iter().map(|s| s.user_id).collect();
    let users = state.datastore.find_users(&user_ids).await?;
    let parent_quests = state.quests.find_quests_containing(&goal.goal_id).await?;

    Ok(Json(GoalInfoResponse {
        goal,
        goal_subs,
        users,
        parent_quests,
    }))
}

/// GET /api/v1/games/:game/:playtype/targets/goals/:goal_id/evaluate-for?userID=
///
/// Evaluates the goal for a user whether or not they are subscribed to it.
pub async fn evaluate_goal_for(
    State(state): State<AppState>,
    Path((game, playtype, goal_id)): Path<(String, String, String)>,
    Query(query): Query<EvaluateForQuery>,
) -> ApiResult<Json<GoalEvaluationResponse>> {
    let gpt = resolve_gpt(&state, &game, &playtype)?;
    let goal = resolve_goal(&state, &goal_id, gpt).await?;
    let user = resolve_user(&state, &query).await?;

    let evaluation = match state.evaluator.evaluate(&goal, user.id).await {
        Ok(evaluation) => evaluation,
        Err(GoalError::NotAPlayer { gpt, .. }) => {
            return Err(ApiError::BadRequest(format!(
                "The user {} hasn't played {}.",
                user.username,
                gpt.format_human()
            )));
        }
        Err(err) => {
            error!(goal_id = %goal.goal_id, user_id = user.id, error = %err, "Goal evaluation failed");
            state.record_error(err.to_string()).await;
            return Err(err.into());
        }
    };

    Ok(Json(GoalEvaluationResponse {
        description: format!("Evaluated {} for {}.", goal.name, user.username),
        source: evaluation.source(),
        body: evaluation.into_result(),
    }))
}

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/games/:game/:playtype/targets/goals/popular",
            get(popular_goals),
        )
        .route(
            "/api/v1/games/:game/:playtype/targets/goals/:goal_id",
            get(goal_info),
        )
        .route(
            "/api/v1/games/:game/:playtype/targets/goals/:goal_id/evaluate-for",
            get(evaluate_goal_for),
        )
}
