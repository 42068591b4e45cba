//! In-memory datastore for unit tests

use async_trait::async_trait;
use tachi_common::{Game, GamePlaytype, Playtype, Result};

use super::datastore::Datastore;
use super::types::{
    CriteriaKey, CriteriaMode, Goal, GoalCharts, GoalCriteria, GoalSubscription, PersonalBest,
    Quest, User,
};

#[derive(Default)]
pub struct MemoryDatastore {
    pub users: Vec<User>,
    pub players: Vec<(i64, GamePlaytype)>,
    pub goals: Vec<Goal>,
    pub subscriptions: Vec<GoalSubscription>,
    pub quests: Vec<Quest>,
    pub personal_bests: Vec<PersonalBest>,
    pub folders: Vec<(String, Vec<String>)>,
}

/// IIDX SP goal: HARD CLEAR one chart
pub fn lamp_goal(goal_id: &str) -> Goal {
    Goal {
        goal_id: goal_id.to_string(),
        game: Game::Iidx,
        playtype: Playtype::SP,
        name: format!("HARD CLEAR {}", goal_id),
        criteria: GoalCriteria {
            key: CriteriaKey::LampIndex,
            value: 5.0,
            mode: CriteriaMode::Single,
            count_num: None,
        },
        charts: GoalCharts::Single(format!("chart-{}", goal_id)),
    }
}

pub fn subscription(user_id: i64, goal_id: &str, achieved: bool) -> GoalSubscription {
    GoalSubscription {
        user_id,
        goal_id: goal_id.to_string(),
        game: Game::Iidx,
        playtype: Playtype::SP,
        achieved,
        out_of: 5.0,
        out_of_human: "HARD CLEAR".to_string(),
        progress: Some(if achieved { 5.0 } else { 4.0 }),
        progress_human: if achieved { "HARD CLEAR" } else { "CLEAR" }.to_string(),
        last_interaction: None,
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn find_goal(&self, goal_id: &str, gpt: GamePlaytype) -> Result<Option<Goal>> {
        Ok(self
            .goals
            .iter()
            .find(|g| g.goal_id == goal_id && g.gpt() == gpt)
            .cloned())
    }

    async fn find_subscription(
        &self,
        user_id: i64,
        goal_id: &str,
    ) -> Result<Option<GoalSubscription>> {
        Ok(self
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.goal_id == goal_id)
            .cloned())
    }

    async fn find_subscribers_of(&self, goal_id: &str) -> Result<Vec<GoalSubscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.goal_id == goal_id)
            .cloned()
            .collect())
    }

    async fn find_quests_referencing(&self, goal_id: &str) -> Result<Vec<Quest>> {
        Ok(self
            .quests
            .iter()
            .filter(|q| q.goal_ids.iter().any(|g| g == goal_id))
            .cloned()
            .collect())
    }

    async fn find_quest(&self, quest_id: &str, gpt: GamePlaytype) -> Result<Option<Quest>> {
        Ok(self
            .quests
            .iter()
            .find(|q| q.quest_id == quest_id && q.game == gpt.game && q.playtype == gpt.playtype)
            .cloned())
    }

    async fn has_user_statistic(&self, user_id: i64, gpt: GamePlaytype) -> Result<bool> {
        Ok(self.players.contains(&(user_id, gpt)))
    }

    async fn find_user(&self, user_ref: &str) -> Result<Option<User>> {
        let by_id = user_ref.parse::<i64>().ok();
        Ok(self
            .users
            .iter()
            .find(|u| Some(u.id) == by_id || u.username.eq_ignore_ascii_case(user_ref))
            .cloned())
    }

    async fn find_users(&self, user_ids: &[i64]) -> Result<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_personal_bests(
        &self,
        user_id: i64,
        chart_ids: &[String],
    ) -> Result<Vec<PersonalBest>> {
        Ok(self
            .personal_bests
            .iter()
            .filter(|pb| pb.user_id == user_id && chart_ids.contains(&pb.chart_id))
            .cloned()
            .collect())
    }

    async fn find_folder_chart_ids(&self, folder_id: &str) -> Result<Vec<String>> {
        Ok(self
            .folders
            .iter()
            .find(|(id, _)| id == folder_id)
            .map(|(_, charts)| charts.clone())
            .unwrap_or_default())
    }

    async fn most_subscribed_goals(&self, gpt: GamePlaytype, limit: u32) -> Result<Vec<Goal>> {
        let mut goals: Vec<_> = self.goals.iter().filter(|g| g.gpt() == gpt).cloned().collect();
        goals.sort_by_key(|g| {
            std::cmp::Reverse(
                self.subscriptions
                    .iter()
                    .filter(|s| s.goal_id == g.goal_id)
                    .count(),
            )
        });
        goals.truncate(limit as usize);
        Ok(goals)
    }
}
