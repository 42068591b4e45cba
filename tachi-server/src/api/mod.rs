//! HTTP API handlers

pub mod goals;
pub mod health;
pub mod import;
pub mod quests;

pub use goals::goal_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use quests::quest_routes;

use serde::Deserialize;
use tachi_common::GamePlaytype;

use crate::goals::types::User;
use crate::{ApiError, ApiResult, AppState};

/// `?userID=` on the evaluate-for routes
#[derive(Debug, Deserialize)]
pub struct EvaluateForQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

/// Parse and check the `:game/:playtype` path segments
pub(crate) fn resolve_gpt(state: &AppState, game: &str, playtype: &str) -> ApiResult<GamePlaytype> {
    let gpt = GamePlaytype::parse(game, playtype)?;
    state.game_config.require(gpt)?;
    Ok(gpt)
}

/// Resolve the `userID` query parameter to a user
pub(crate) async fn resolve_user(state: &AppState, query: &EvaluateForQuery) -> ApiResult<User> {
    let user_ref = query
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userID is required.".to_string()))?;

    state
        .datastore
        .find_user(user_ref)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("The user {} does not exist.", user_ref)))
}
