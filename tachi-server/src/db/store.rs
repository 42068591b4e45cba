//! [`Datastore`] backed by the SQLite pool

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tachi_common::{Error, Game, GamePlaytype, Playtype, Result};

use crate::goals::datastore::Datastore;
use crate::goals::types::{Goal, GoalSubscription, PersonalBest, Quest, User};

#[derive(Debug, Clone)]
pub struct SqliteDatastore {
    pool: SqlitePool,
}

impl SqliteDatastore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn quest_goal_ids(&self, quest_id: &str) -> Result<Vec<String>> {
        let goal_ids = sqlx::query_scalar(
            "SELECT goal_id FROM quest_goals WHERE quest_id = ? ORDER BY position",
        )
        .bind(quest_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goal_ids)
    }

    async fn quest_from_row(&self, row: &SqliteRow) -> Result<Quest> {
        let quest_id: String = row.get("quest_id");
        let (game, playtype) = read_gpt(row)?;
        Ok(Quest {
            goal_ids: self.quest_goal_ids(&quest_id).await?,
            quest_id,
            game,
            playtype,
            name: row.get("name"),
        })
    }
}

fn read_gpt(row: &SqliteRow) -> Result<(Game, Playtype)> {
    let game: String = row.get("game");
    let playtype: String = row.get("playtype");
    let game = game
        .parse()
        .map_err(|e| Error::Internal(format!("Stored game is invalid: {}", e)))?;
    let playtype = playtype
        .parse()
        .map_err(|e| Error::Internal(format!("Stored playtype is invalid: {}", e)))?;
    Ok((game, playtype))
}

fn goal_from_row(row: &SqliteRow) -> Result<Goal> {
    let (game, playtype) = read_gpt(row)?;

    let criteria: String = row.get("criteria");
    let criteria = serde_json::from_str(&criteria)
        .map_err(|e| Error::Internal(format!("Failed to deserialize criteria: {}", e)))?;

    let charts: String = row.get("charts");
    let charts = serde_json::from_str(&charts)
        .map_err(|e| Error::Internal(format!("Failed to deserialize charts: {}", e)))?;

    Ok(Goal {
        goal_id: row.get("goal_id"),
        game,
        playtype,
        name: row.get("name"),
        criteria,
        charts,
    })
}

fn subscription_from_row(row: &SqliteRow) -> Result<GoalSubscription> {
    let (game, playtype) = read_gpt(row)?;

    let last_interaction: Option<String> = row.get("last_interaction");
    let last_interaction = last_interaction
        .map(|s| DateTime::parse_from_rfc3339(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to parse last_interaction: {}", e)))?
        .map(|dt| dt.with_timezone(&Utc));

    Ok(GoalSubscription {
        user_id: row.get("user_id"),
        goal_id: row.get("goal_id"),
        game,
        playtype,
        achieved: row.get("achieved"),
        out_of: row.get("out_of"),
        out_of_human: row.get("out_of_human"),
        progress: row.get("progress"),
        progress_human: row.get("progress_human"),
        last_interaction,
    })
}

const SUBSCRIPTION_COLUMNS: &str = "user_id, goal_id, game, playtype, achieved, out_of, \
     out_of_human, progress, progress_human, last_interaction";

#[async_trait]
impl Datastore for SqliteDatastore {
    async fn find_goal(&self, goal_id: &str, gpt: GamePlaytype) -> Result<Option<Goal>> {
        let row = sqlx::query(
            r#"
            SELECT goal_id, game, playtype, name, criteria, charts
            FROM goals
            WHERE goal_id = ? AND game = ? AND playtype = ?
            "#,
        )
        .bind(goal_id)
        .bind(gpt.game.as_str())
        .bind(gpt.playtype.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(goal_from_row).transpose()
    }

    async fn find_subscription(
        &self,
        user_id: i64,
        goal_id: &str,
    ) -> Result<Option<GoalSubscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM goal_subs WHERE user_id = ? AND goal_id = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(subscription_from_row).transpose()
    }

    async fn find_subscribers_of(&self, goal_id: &str) -> Result<Vec<GoalSubscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM goal_subs WHERE goal_id = ? ORDER BY user_id",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(subscription_from_row).collect()
    }

    async fn find_quests_referencing(&self, goal_id: &str) -> Result<Vec<Quest>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT q.quest_id, q.game, q.playtype, q.name
            FROM quests q
            JOIN quest_goals qg ON qg.quest_id = q.quest_id
            WHERE qg.goal_id = ?
            ORDER BY q.quest_id
            "#,
        )
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;

        let mut quests = Vec::with_capacity(rows.len());
        for row in &rows {
            quests.push(self.quest_from_row(row).await?);
        }
        Ok(quests)
    }

    async fn find_quest(&self, quest_id: &str, gpt: GamePlaytype) -> Result<Option<Quest>> {
        let row = sqlx::query(
            "SELECT quest_id, game, playtype, name FROM quests WHERE quest_id = ? AND game = ? AND playtype = ?",
        )
        .bind(quest_id)
        .bind(gpt.game.as_str())
        .bind(gpt.playtype.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.quest_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn has_user_statistic(&self, user_id: i64, gpt: GamePlaytype) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM game_stats WHERE user_id = ? AND game = ? AND playtype = ?",
        )
        .bind(user_id)
        .bind(gpt.game.as_str())
        .bind(gpt.playtype.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn find_user(&self, user_ref: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username FROM users WHERE id = ? OR username = ?")
            .bind(user_ref.parse::<i64>().ok())
            .bind(user_ref)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
        }))
    }

    async fn find_users(&self, user_ids: &[i64]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, username FROM users WHERE id IN (");
        let mut ids = query.separated(", ");
        for id in user_ids {
            ids.push_bind(*id);
        }
        query.push(") ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| User {
                id: row.get("id"),
                username: row.get("username"),
            })
            .collect())
    }

    async fn find_personal_bests(
        &self,
        user_id: i64,
        chart_ids: &[String],
    ) -> Result<Vec<PersonalBest>> {
        if chart_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT user_id, chart_id, score, percent, lamp_index, grade_index \
             FROM personal_bests WHERE user_id = ",
        );
        query.push_bind(user_id);
        query.push(" AND chart_id IN (");
        let mut charts = query.separated(", ");
        for chart_id in chart_ids {
            charts.push_bind(chart_id.as_str());
        }
        query.push(")");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| PersonalBest {
                user_id: row.get("user_id"),
                chart_id: row.get("chart_id"),
                score: row.get("score"),
                percent: row.get("percent"),
                lamp_index: row.get::<i64, _>("lamp_index") as u32,
                grade_index: row.get::<i64, _>("grade_index") as u32,
            })
            .collect())
    }

    async fn find_folder_chart_ids(&self, folder_id: &str) -> Result<Vec<String>> {
        let chart_ids = sqlx::query_scalar(
            "SELECT chart_id FROM folder_charts WHERE folder_id = ? ORDER BY chart_id",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chart_ids)
    }

    async fn most_subscribed_goals(&self, gpt: GamePlaytype, limit: u32) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            r#"
            SELECT g.goal_id, g.game, g.playtype, g.name, g.criteria, g.charts,
                   COUNT(s.user_id) AS subscribers
            FROM goals g
            LEFT JOIN goal_subs s ON s.goal_id = g.goal_id
            WHERE g.game = ? AND g.playtype = ?
            GROUP BY g.goal_id
            ORDER BY subscribers DESC, g.goal_id
            LIMIT ?
            "#,
        )
        .bind(gpt.game.as_str())
        .bind(gpt.playtype.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(goal_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, writes};
    use crate::goals::types::{CriteriaKey, CriteriaMode, GoalCharts, GoalCriteria};

    fn iidx_sp() -> GamePlaytype {
        GamePlaytype {
            game: Game::Iidx,
            playtype: Playtype::SP,
        }
    }

    fn goal(goal_id: &str, charts: GoalCharts) -> Goal {
        Goal {
            goal_id: goal_id.to_string(),
            game: Game::Iidx,
            playtype: Playtype::SP,
            name: format!("Goal {}", goal_id),
            criteria: GoalCriteria {
                key: CriteriaKey::Percent,
                value: 80.0,
                mode: CriteriaMode::Absolute,
                count_num: Some(2.0),
            },
            charts,
        }
    }

    fn sub(user_id: i64, goal_id: &str) -> GoalSubscription {
        GoalSubscription {
            user_id,
            goal_id: goal_id.to_string(),
            game: Game::Iidx,
            playtype: Playtype::SP,
            achieved: false,
            out_of: 2.0,
            out_of_human: "2".to_string(),
            progress: Some(1.0),
            progress_human: "1".to_string(),
            last_interaction: Some(
                DateTime::parse_from_rfc3339("2022-05-01T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        }
    }

    async fn seeded() -> SqliteDatastore {
        let pool = memory_pool().await.unwrap();
        for (id, name) in [(1, "zkldi"), (2, "Lumiere")] {
            writes::insert_user(&pool, &User { id, username: name.to_string() })
                .await
                .unwrap();
        }
        SqliteDatastore::new(pool)
    }

    #[tokio::test]
    async fn test_goal_round_trips_json_columns() {
        let store = seeded().await;
        let stored = goal("g1", GoalCharts::Multi(vec!["a".to_string(), "b".to_string()]));
        writes::insert_goal(store.pool(), &stored).await.unwrap();

        assert_eq!(store.find_goal("g1", iidx_sp()).await.unwrap(), Some(stored));

        let dp = GamePlaytype {
            game: Game::Iidx,
            playtype: Playtype::DP,
        };
        assert_eq!(store.find_goal("g1", dp).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscriptions() {
        let store = seeded().await;
        writes::insert_goal(store.pool(), &goal("g1", GoalCharts::Single("a".to_string())))
            .await
            .unwrap();
        writes::upsert_goal_subscription(store.pool(), &sub(2, "g1")).await.unwrap();
        writes::upsert_goal_subscription(store.pool(), &sub(1, "g1")).await.unwrap();

        let mut updated = sub(1, "g1");
        updated.achieved = true;
        writes::upsert_goal_subscription(store.pool(), &updated).await.unwrap();

        assert_eq!(store.find_subscription(1, "g1").await.unwrap(), Some(updated));
        assert_eq!(store.find_subscription(3, "g1").await.unwrap(), None);

        let subscribers: Vec<_> = store
            .find_subscribers_of("g1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        assert_eq!(subscribers, [1, 2]);
    }

    #[tokio::test]
    async fn test_quests_keep_goal_order() {
        let store = seeded().await;
        let quest = Quest {
            quest_id: "q1".to_string(),
            game: Game::Iidx,
            playtype: Playtype::SP,
            name: "Quest".to_string(),
            goal_ids: vec!["z".to_string(), "a".to_string(), "m".to_string()],
        };
        writes::insert_quest(store.pool(), &quest).await.unwrap();

        assert_eq!(store.find_quest("q1", iidx_sp()).await.unwrap(), Some(quest.clone()));
        assert_eq!(store.find_quests_referencing("a").await.unwrap(), vec![quest]);
        assert!(store.find_quests_referencing("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_user_by_id_or_name() {
        let store = seeded().await;

        assert_eq!(store.find_user("1").await.unwrap().map(|u| u.username), Some("zkldi".to_string()));
        assert_eq!(store.find_user("lumiere").await.unwrap().map(|u| u.id), Some(2));
        assert_eq!(store.find_user("nobody").await.unwrap(), None);

        let users = store.find_users(&[2, 1, 9]).await.unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), [1, 2]);
        assert!(store.find_users(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_and_personal_bests() {
        let store = seeded().await;
        assert!(!store.has_user_statistic(1, iidx_sp()).await.unwrap());

        writes::record_game_stats(store.pool(), 1, iidx_sp()).await.unwrap();
        assert!(store.has_user_statistic(1, iidx_sp()).await.unwrap());

        let pb = PersonalBest {
            user_id: 1,
            chart_id: "a".to_string(),
            score: 1500.0,
            percent: 75.5,
            lamp_index: 4,
            grade_index: 5,
        };
        writes::upsert_personal_best(store.pool(), &pb).await.unwrap();

        let charts = vec!["a".to_string(), "b".to_string()];
        assert_eq!(store.find_personal_bests(1, &charts).await.unwrap(), vec![pb]);
        assert!(store.find_personal_bests(2, &charts).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_most_subscribed_goals_orders_by_subscribers() {
        let store = seeded().await;
        for id in ["g1", "g2", "g3"] {
            writes::insert_goal(store.pool(), &goal(id, GoalCharts::Folder("lv12".to_string())))
                .await
                .unwrap();
        }
        writes::upsert_goal_subscription(store.pool(), &sub(1, "g2")).await.unwrap();
        writes::upsert_goal_subscription(store.pool(), &sub(2, "g2")).await.unwrap();
        writes::upsert_goal_subscription(store.pool(), &sub(1, "g3")).await.unwrap();

        let ids: Vec<_> = store
            .most_subscribed_goals(iidx_sp(), 2)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.goal_id)
            .collect();
        assert_eq!(ids, ["g2", "g3"]);
    }

    #[tokio::test]
    async fn test_folder_charts() {
        let store = seeded().await;
        let charts = vec!["b".to_string(), "a".to_string()];
        writes::insert_folder_charts(store.pool(), "lv12", &charts).await.unwrap();

        assert_eq!(store.find_folder_chart_ids("lv12").await.unwrap(), ["a", "b"]);
        assert!(store.find_folder_chart_ids("lv11").await.unwrap().is_empty());
    }
}
