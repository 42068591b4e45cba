//! Read access to goals, subscriptions, quests and score history

use async_trait::async_trait;
use tachi_common::{GamePlaytype, Result};

use super::types::{Goal, GoalSubscription, PersonalBest, Quest, User};

/// Storage the goal and quest engine reads from
///
/// All lookups are read-only. Reads are not isolated from concurrent score
/// imports, so a caller may observe a user's state from just before or just
/// after an import.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn find_goal(&self, goal_id: &str, gpt: GamePlaytype) -> Result<Option<Goal>>;

    async fn find_subscription(&self, user_id: i64, goal_id: &str)
        -> Result<Option<GoalSubscription>>;

    async fn find_subscribers_of(&self, goal_id: &str) -> Result<Vec<GoalSubscription>>;

    /// Quests listing the goal among their members
    async fn find_quests_referencing(&self, goal_id: &str) -> Result<Vec<Quest>>;

    async fn find_quest(&self, quest_id: &str, gpt: GamePlaytype) -> Result<Option<Quest>>;

    /// Whether the user has any statistics for the game/playtype
    async fn has_user_statistic(&self, user_id: i64, gpt: GamePlaytype) -> Result<bool>;

    /// Resolve a user by numeric ID or (case-insensitive) username
    async fn find_user(&self, user_ref: &str) -> Result<Option<User>>;

    async fn find_users(&self, user_ids: &[i64]) -> Result<Vec<User>>;

    /// The user's personal bests on the given charts; charts without one are omitted
    async fn find_personal_bests(
        &self,
        user_id: i64,
        chart_ids: &[String],
    ) -> Result<Vec<PersonalBest>>;

    async fn find_folder_chart_ids(&self, folder_id: &str) -> Result<Vec<String>>;

    /// Goals for the game/playtype ordered by subscriber count, most first
    async fn most_subscribed_goals(&self, gpt: GamePlaytype, limit: u32) -> Result<Vec<Goal>>;
}
