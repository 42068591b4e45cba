//! Goal evaluation for a single user
//!
//! Evaluation is an explicit two-way decision. A user subscribed to the goal
//! already has their progress on the subscription record, kept current by
//! the import path, and that record is returned as-is. Anyone else is
//! evaluated live from their personal bests.

use std::sync::Arc;

use tachi_common::GamePlaytype;
use thiserror::Error;
use tracing::{debug, error, info};

use super::criteria::CriteriaEvaluator;
use super::datastore::Datastore;
use super::types::{EvaluatedGoalReturn, Goal, GoalCharts};

#[derive(Debug, Error)]
pub enum GoalError {
    /// The user has no statistics for the goal's game/playtype
    #[error("User {user_id} hasn't played {}.", .gpt.format_human())]
    NotAPlayer { user_id: i64, gpt: GamePlaytype },

    /// Live evaluation produced nothing for an eligible user
    #[error("Failed to evaluate goal {name} ({goal_id}) for user {user_id}.")]
    EvaluationFailed {
        goal_id: String,
        name: String,
        user_id: i64,
    },

    #[error(transparent)]
    Datastore(#[from] tachi_common::Error),
}

/// Evaluation result, tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub enum GoalEvaluation {
    /// Copied from the user's subscription to the goal
    Cached(EvaluatedGoalReturn),
    /// Computed from the user's scores just now
    Live(EvaluatedGoalReturn),
}

impl GoalEvaluation {
    pub fn result(&self) -> &EvaluatedGoalReturn {
        match self {
            GoalEvaluation::Cached(r) | GoalEvaluation::Live(r) => r,
        }
    }

    pub fn into_result(self) -> EvaluatedGoalReturn {
        match self {
            GoalEvaluation::Cached(r) | GoalEvaluation::Live(r) => r,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            GoalEvaluation::Cached(_) => "subscription",
            GoalEvaluation::Live(_) => "live",
        }
    }
}

#[derive(Clone)]
pub struct GoalEvaluator {
    datastore: Arc<dyn Datastore>,
    criteria: Arc<dyn CriteriaEvaluator>,
}

impl GoalEvaluator {
    pub fn new(datastore: Arc<dyn Datastore>, criteria: Arc<dyn CriteriaEvaluator>) -> Self {
        Self {
            datastore,
            criteria,
        }
    }

    /// Evaluate a goal for a user, preferring their subscription record
    pub async fn evaluate(&self, goal: &Goal, user_id: i64) -> Result<GoalEvaluation, GoalError> {
        let gpt = goal.gpt();
        if !self.datastore.has_user_statistic(user_id, gpt).await? {
            info!(user_id, gpt = %gpt, goal_id = %goal.goal_id, "User is not a player of this game");
            return Err(GoalError::NotAPlayer { user_id, gpt });
        }

        match self.datastore.find_subscription(user_id, &goal.goal_id).await? {
            Some(sub) => {
                debug!(user_id, goal_id = %goal.goal_id, "Using subscription progress");
                Ok(GoalEvaluation::Cached(sub.evaluation()))
            }
            None => self.evaluate_live(goal, user_id).await.map(GoalEvaluation::Live),
        }
    }

    /// Evaluate from the user's scores, ignoring any subscription
    pub async fn evaluate_live(
        &self,
        goal: &Goal,
        user_id: i64,
    ) -> Result<EvaluatedGoalReturn, GoalError> {
        let chart_ids = self.resolve_charts(&goal.charts).await?;
        let personal_bests = self.datastore.find_personal_bests(user_id, &chart_ids).await?;

        debug!(
            user_id,
            goal_id = %goal.goal_id,
            charts = chart_ids.len(),
            personal_bests = personal_bests.len(),
            "Evaluating goal live"
        );

        self.criteria
            .evaluate(goal, &chart_ids, &personal_bests)
            .ok_or_else(|| {
                error!(user_id, goal_id = %goal.goal_id, name = %goal.name, "Goal evaluation returned nothing");
                GoalError::EvaluationFailed {
                    goal_id: goal.goal_id.clone(),
                    name: goal.name.clone(),
                    user_id,
                }
            })
    }

    async fn resolve_charts(&self, charts: &GoalCharts) -> Result<Vec<String>, GoalError> {
        Ok(match charts {
            GoalCharts::Single(chart_id) => vec![chart_id.clone()],
            GoalCharts::Multi(chart_ids) => chart_ids.clone(),
            GoalCharts::Folder(folder_id) => self.datastore.find_folder_chart_ids(folder_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::testing::{lamp_goal, subscription, MemoryDatastore};
    use crate::goals::types::PersonalBest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and always reports a fixed result
    struct CountingCriteria {
        calls: AtomicUsize,
        result: Option<EvaluatedGoalReturn>,
    }

    impl CountingCriteria {
        fn returning(result: Option<EvaluatedGoalReturn>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CriteriaEvaluator for CountingCriteria {
        fn evaluate(
            &self,
            _goal: &Goal,
            _chart_ids: &[String],
            _personal_bests: &[PersonalBest],
        ) -> Option<EvaluatedGoalReturn> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn live_result() -> EvaluatedGoalReturn {
        EvaluatedGoalReturn {
            achieved: true,
            out_of: 5.0,
            out_of_human: "HARD CLEAR".to_string(),
            progress: Some(6.0),
            progress_human: "EX HARD CLEAR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscription_short_circuits_live_evaluation() {
        let mut store = MemoryDatastore::default();
        store.players.push((1, lamp_goal("g1").gpt()));
        store.subscriptions.push(subscription(1, "g1", false));
        let criteria = CountingCriteria::returning(Some(live_result()));
        let evaluator = GoalEvaluator::new(Arc::new(store), criteria.clone());

        let evaluation = evaluator.evaluate(&lamp_goal("g1"), 1).await.unwrap();

        assert_eq!(evaluation.source(), "subscription");
        assert!(!evaluation.result().achieved);
        assert_eq!(evaluation.result().progress_human, "CLEAR");
        assert_eq!(criteria.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribed_user_is_evaluated_live() {
        let mut store = MemoryDatastore::default();
        store.players.push((1, lamp_goal("g1").gpt()));
        store.subscriptions.push(subscription(2, "g1", false));
        let criteria = CountingCriteria::returning(Some(live_result()));
        let evaluator = GoalEvaluator::new(Arc::new(store), criteria.clone());

        let evaluation = evaluator.evaluate(&lamp_goal("g1"), 1).await.unwrap();

        assert_eq!(evaluation, GoalEvaluation::Live(live_result()));
        assert_eq!(criteria.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_player_is_not_eligible() {
        let mut store = MemoryDatastore::default();
        // Subscribed, but no statistics for the game
        store.subscriptions.push(subscription(1, "g1", true));
        let criteria = CountingCriteria::returning(Some(live_result()));
        let evaluator = GoalEvaluator::new(Arc::new(store), criteria.clone());

        let err = evaluator.evaluate(&lamp_goal("g1"), 1).await.unwrap_err();

        assert!(matches!(err, GoalError::NotAPlayer { user_id: 1, .. }));
        assert_eq!(err.to_string(), "User 1 hasn't played beatmania IIDX (SP).");
        assert_eq!(criteria.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_live_result_is_a_hard_failure() {
        let mut store = MemoryDatastore::default();
        store.players.push((1, lamp_goal("g1").gpt()));
        let evaluator = GoalEvaluator::new(Arc::new(store), CountingCriteria::returning(None));

        let err = evaluator.evaluate(&lamp_goal("g1"), 1).await.unwrap_err();

        assert!(matches!(err, GoalError::EvaluationFailed { ref goal_id, .. } if goal_id == "g1"));
    }

    #[tokio::test]
    async fn test_folder_goals_resolve_folder_charts() {
        use crate::goals::criteria::PersonalBestEvaluator;
        use tachi_common::game::GameConfigTable;

        let mut store = MemoryDatastore::default();
        store.players.push((1, lamp_goal("g1").gpt()));
        store
            .folders
            .push(("lv12".to_string(), vec!["a".to_string(), "b".to_string()]));
        store.personal_bests.push(PersonalBest {
            user_id: 1,
            chart_id: "b".to_string(),
            score: 2000.0,
            percent: 80.0,
            lamp_index: 6,
            grade_index: 6,
        });

        let mut goal = lamp_goal("g1");
        goal.charts = GoalCharts::Folder("lv12".to_string());

        let evaluator = GoalEvaluator::new(
            Arc::new(store),
            Arc::new(PersonalBestEvaluator::new(Arc::new(GameConfigTable::builtin()))),
        );
        let result = evaluator.evaluate(&goal, 1).await.unwrap().into_result();

        assert!(result.achieved);
        assert_eq!(result.progress_human, "EX HARD CLEAR");
    }
}
