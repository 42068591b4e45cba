//! Write helpers
//!
//! Scores and goal documents are normally written by the score processing
//! path; these cover seeding and subscription upkeep.

use sqlx::SqlitePool;
use tachi_common::{Error, GamePlaytype, Result};

use crate::goals::types::{Goal, GoalSubscription, PersonalBest, Quest, User};

pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query("INSERT INTO users (id, username) VALUES (?, ?)")
        .bind(user.id)
        .bind(&user.username)
        .execute(pool)
        .await?;
    Ok(())
}

/// Record that the user has played a game/playtype
pub async fn record_game_stats(pool: &SqlitePool, user_id: i64, gpt: GamePlaytype) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO game_stats (user_id, game, playtype) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(gpt.game.as_str())
        .bind(gpt.playtype.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn upsert_personal_best(pool: &SqlitePool, pb: &PersonalBest) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO personal_bests (user_id, chart_id, score, percent, lamp_index, grade_index)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, chart_id) DO UPDATE SET
            score = excluded.score,
            percent = excluded.percent,
            lamp_index = excluded.lamp_index,
            grade_index = excluded.grade_index
        "#,
    )
    .bind(pb.user_id)
    .bind(&pb.chart_id)
    .bind(pb.score)
    .bind(pb.percent)
    .bind(i64::from(pb.lamp_index))
    .bind(i64::from(pb.grade_index))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_folder_charts(
    pool: &SqlitePool,
    folder_id: &str,
    chart_ids: &[String],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    for chart_id in chart_ids {
        sqlx::query("INSERT OR IGNORE INTO folder_charts (folder_id, chart_id) VALUES (?, ?)")
            .bind(folder_id)
            .bind(chart_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn insert_goal(pool: &SqlitePool, goal: &Goal) -> Result<()> {
    let criteria = serde_json::to_string(&goal.criteria)
        .map_err(|e| Error::Internal(format!("Failed to serialize criteria: {}", e)))?;
    let charts = serde_json::to_string(&goal.charts)
        .map_err(|e| Error::Internal(format!("Failed to serialize charts: {}", e)))?;

    sqlx::query(
        "INSERT INTO goals (goal_id, game, playtype, name, criteria, charts) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&goal.goal_id)
    .bind(goal.game.as_str())
    .bind(goal.playtype.as_str())
    .bind(&goal.name)
    .bind(criteria)
    .bind(charts)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store a subscription, replacing the user's previous progress on the goal
pub async fn upsert_goal_subscription(pool: &SqlitePool, sub: &GoalSubscription) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO goal_subs (
            user_id, goal_id, game, playtype, achieved,
            out_of, out_of_human, progress, progress_human, last_interaction
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, goal_id) DO UPDATE SET
            achieved = excluded.achieved,
            out_of = excluded.out_of,
            out_of_human = excluded.out_of_human,
            progress = excluded.progress,
            progress_human = excluded.progress_human,
            last_interaction = excluded.last_interaction
        "#,
    )
    .bind(sub.user_id)
    .bind(&sub.goal_id)
    .bind(sub.game.as_str())
    .bind(sub.playtype.as_str())
    .bind(sub.achieved)
    .bind(sub.out_of)
    .bind(&sub.out_of_human)
    .bind(sub.progress)
    .bind(&sub.progress_human)
    .bind(sub.last_interaction.map(|dt| dt.to_rfc3339()))
    .execute(pool)
    .await?;
    Ok(())
}

/// Store a quest and its ordered member goals
pub async fn insert_quest(pool: &SqlitePool, quest: &Quest) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO quests (quest_id, game, playtype, name) VALUES (?, ?, ?, ?)")
        .bind(&quest.quest_id)
        .bind(quest.game.as_str())
        .bind(quest.playtype.as_str())
        .bind(&quest.name)
        .execute(&mut *tx)
        .await?;

    for (position, goal_id) in quest.goal_ids.iter().enumerate() {
        sqlx::query("INSERT INTO quest_goals (quest_id, goal_id, position) VALUES (?, ?, ?)")
            .bind(&quest.quest_id)
            .bind(goal_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}
