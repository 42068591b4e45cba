//! Quest lookup and roll-up
//!
//! A quest is achieved once every member goal is; partial progress is the
//! number of achieved goals out of the total.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tachi_common::{Error, GamePlaytype};
use tracing::debug;

use super::datastore::Datastore;
use super::evaluator::{GoalError, GoalEvaluator};
use super::types::{EvaluatedGoalReturn, Quest};

/// One member goal's evaluation within a quest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestGoalResult {
    #[serde(rename = "goalID")]
    pub goal_id: String,
    pub source: &'static str,
    #[serde(flatten)]
    pub result: EvaluatedGoalReturn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    #[serde(rename = "questID")]
    pub quest_id: String,
    pub achieved: bool,
    /// Achieved member goals
    pub progress: usize,
    /// Total member goals
    pub out_of: usize,
    /// Member results in the quest's goal order
    pub goals: Vec<QuestGoalResult>,
}

#[derive(Clone)]
pub struct QuestAggregator {
    datastore: Arc<dyn Datastore>,
    evaluator: GoalEvaluator,
}

impl QuestAggregator {
    pub fn new(datastore: Arc<dyn Datastore>, evaluator: GoalEvaluator) -> Self {
        Self {
            datastore,
            evaluator,
        }
    }

    /// Quests that list the goal as a member, each reported once
    pub async fn find_quests_containing(&self, goal_id: &str) -> Result<Vec<Quest>, GoalError> {
        let mut quests = self.datastore.find_quests_referencing(goal_id).await?;
        let mut seen = HashSet::new();
        quests.retain(|q| seen.insert(q.quest_id.clone()));
        Ok(quests)
    }

    /// Evaluate every member goal and roll the results up
    pub async fn evaluate_quest(
        &self,
        quest: &Quest,
        user_id: i64,
    ) -> Result<QuestProgress, GoalError> {
        let gpt = GamePlaytype {
            game: quest.game,
            playtype: quest.playtype,
        };
        if !self.datastore.has_user_statistic(user_id, gpt).await? {
            return Err(GoalError::NotAPlayer { user_id, gpt });
        }

        let mut goals = Vec::with_capacity(quest.goal_ids.len());
        for goal_id in &quest.goal_ids {
            let goal = self.datastore.find_goal(goal_id, gpt).await?.ok_or_else(|| {
                Error::Internal(format!(
                    "Quest {} references goal {}, which doesn't exist.",
                    quest.quest_id, goal_id
                ))
            })?;

            let evaluation = self.evaluator.evaluate(&goal, user_id).await?;
            goals.push(QuestGoalResult {
                goal_id: goal_id.clone(),
                source: evaluation.source(),
                result: evaluation.into_result(),
            });
        }

        let progress = goals.iter().filter(|g| g.result.achieved).count();
        let out_of = goals.len();

        debug!(user_id, quest_id = %quest.quest_id, progress, out_of, "Evaluated quest");

        Ok(QuestProgress {
            quest_id: quest.quest_id.clone(),
            // A quest with no goals has nothing to complete
            achieved: out_of > 0 && progress == out_of,
            progress,
            out_of,
            goals,
        })
    }
}
