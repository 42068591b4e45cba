//! tachi-server library interface
//!
//! Exposes the import pipeline, the goal/quest engine and the HTTP router
//! for the binary and for integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod goals;
pub mod import;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tachi_common::config::ImportConfig;
use tachi_common::game::GameConfigTable;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::goals::{Datastore, GoalEvaluator, PersonalBestEvaluator, QuestAggregator};
use crate::import::ImportTables;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub datastore: Arc<dyn Datastore>,
    pub evaluator: GoalEvaluator,
    pub quests: QuestAggregator,
    /// Read-only lookup tables for the import pipeline
    pub tables: ImportTables,
    pub game_config: Arc<GameConfigTable>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last internal error, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(datastore: Arc<dyn Datastore>, import_config: Arc<ImportConfig>) -> Self {
        let game_config = Arc::new(GameConfigTable::builtin());
        let criteria = Arc::new(PersonalBestEvaluator::new(game_config.clone()));
        let evaluator = GoalEvaluator::new(datastore.clone(), criteria);

        Self {
            quests: QuestAggregator::new(datastore.clone(), evaluator.clone()),
            evaluator,
            datastore,
            tables: ImportTables::new(import_config, game_config.clone()),
            game_config,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember a server-side failure for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::import_routes())
        .merge(api::goal_routes())
        .merge(api::quest_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
