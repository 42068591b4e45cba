//! Goal, subscription and quest records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tachi_common::{Game, GamePlaytype, Playtype};

/// Score property a goal is measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriteriaKey {
    Score,
    Percent,
    LampIndex,
    GradeIndex,
}

/// How a goal's charts must meet the criteria value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriteriaMode {
    /// Any one chart reaching the value
    Single,
    /// At least `count_num` charts reaching the value
    Absolute,
    /// At least `count_num` (0..=1) of the charts reaching the value
    Proportion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCriteria {
    pub key: CriteriaKey,
    pub value: f64,
    pub mode: CriteriaMode,
    /// Required for `absolute` and `proportion`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_num: Option<f64>,
}

/// Charts a goal is measured over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum GoalCharts {
    Single(String),
    Multi(Vec<String>),
    Folder(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(rename = "goalID")]
    pub goal_id: String,
    pub game: Game,
    pub playtype: Playtype,
    pub name: String,
    pub criteria: GoalCriteria,
    pub charts: GoalCharts,
}

impl Goal {
    pub fn gpt(&self) -> GamePlaytype {
        GamePlaytype {
            game: self.game,
            playtype: self.playtype,
        }
    }
}

/// Result of evaluating a goal for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedGoalReturn {
    pub achieved: bool,
    pub out_of: f64,
    pub out_of_human: String,
    /// `None` when the user has no score to measure
    pub progress: Option<f64>,
    pub progress_human: String,
}

/// A user's standing subscription to a goal
///
/// The progress fields are kept current by the score import path, so
/// reading them is equivalent to re-evaluating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSubscription {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "goalID")]
    pub goal_id: String,
    pub game: Game,
    pub playtype: Playtype,
    pub achieved: bool,
    pub out_of: f64,
    pub out_of_human: String,
    pub progress: Option<f64>,
    pub progress_human: String,
    pub last_interaction: Option<DateTime<Utc>>,
}

impl GoalSubscription {
    /// The cached evaluation this subscription carries
    pub fn evaluation(&self) -> EvaluatedGoalReturn {
        EvaluatedGoalReturn {
            achieved: self.achieved,
            out_of: self.out_of,
            out_of_human: self.out_of_human.clone(),
            progress: self.progress,
            progress_human: self.progress_human.clone(),
        }
    }
}

/// An ordered group of goals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    #[serde(rename = "questID")]
    pub quest_id: String,
    pub game: Game,
    pub playtype: Playtype,
    pub name: String,
    #[serde(rename = "goalIDs")]
    pub goal_ids: Vec<String>,
}

/// A user's best result on one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "chartID")]
    pub chart_id: String,
    pub score: f64,
    pub percent: f64,
    pub lamp_index: u32,
    pub grade_index: u32,
}

impl PersonalBest {
    pub fn value_of(&self, key: CriteriaKey) -> f64 {
        match key {
            CriteriaKey::Score => self.score,
            CriteriaKey::Percent => self.percent,
            CriteriaKey::LampIndex => f64::from(self.lamp_index),
            CriteriaKey::GradeIndex => f64::from(self.grade_index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}
