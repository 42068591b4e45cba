//! Criteria matching over a user's personal bests

use std::sync::Arc;

use tachi_common::game::{GameConfigTable, GptConfig};
use tracing::warn;

use super::types::{CriteriaKey, CriteriaMode, EvaluatedGoalReturn, Goal, PersonalBest};

/// Shown when the user has no score on any of the goal's charts
pub const NO_DATA: &str = "NO DATA";

/// Applies a goal's criteria to the user's scores on the goal's charts
///
/// Returns `None` when the goal cannot be evaluated at all (no charts, or
/// criteria missing a required count).
pub trait CriteriaEvaluator: Send + Sync {
    fn evaluate(
        &self,
        goal: &Goal,
        chart_ids: &[String],
        personal_bests: &[PersonalBest],
    ) -> Option<EvaluatedGoalReturn>;
}

/// Default evaluator, measuring goals against personal bests
#[derive(Debug, Clone)]
pub struct PersonalBestEvaluator {
    game_config: Arc<GameConfigTable>,
}

impl PersonalBestEvaluator {
    pub fn new(game_config: Arc<GameConfigTable>) -> Self {
        Self { game_config }
    }
}

impl CriteriaEvaluator for PersonalBestEvaluator {
    fn evaluate(
        &self,
        goal: &Goal,
        chart_ids: &[String],
        personal_bests: &[PersonalBest],
    ) -> Option<EvaluatedGoalReturn> {
        if chart_ids.is_empty() {
            warn!(goal_id = %goal.goal_id, "Goal has no charts to evaluate against");
            return None;
        }

        let criteria = &goal.criteria;
        let gpt = self.game_config.get(goal.gpt());
        let values = personal_bests
            .iter()
            .filter(|pb| chart_ids.contains(&pb.chart_id))
            .map(|pb| pb.value_of(criteria.key));

        match criteria.mode {
            CriteriaMode::Single => {
                let best = values.fold(None, |best: Option<f64>, v| {
                    Some(best.map_or(v, |b| b.max(v)))
                });

                Some(EvaluatedGoalReturn {
                    achieved: best.is_some_and(|b| b >= criteria.value),
                    out_of: criteria.value,
                    out_of_human: humanise(criteria.key, gpt, criteria.value),
                    progress: best,
                    progress_human: best
                        .map(|b| humanise(criteria.key, gpt, b))
                        .unwrap_or_else(|| NO_DATA.to_string()),
                })
            }
            CriteriaMode::Absolute | CriteriaMode::Proportion => {
                let Some(count_num) = criteria.count_num else {
                    warn!(goal_id = %goal.goal_id, mode = ?criteria.mode, "Goal criteria has no countNum");
                    return None;
                };
                let out_of = match criteria.mode {
                    CriteriaMode::Proportion => (count_num * chart_ids.len() as f64).floor(),
                    _ => count_num,
                };
                let count = values.filter(|v| *v >= criteria.value).count() as f64;

                Some(EvaluatedGoalReturn {
                    achieved: count >= out_of,
                    out_of,
                    out_of_human: format_number(out_of),
                    progress: Some(count),
                    progress_human: format_number(count),
                })
            }
        }
    }
}

/// Render a criteria value the way players read it
fn humanise(key: CriteriaKey, gpt: Option<&GptConfig>, value: f64) -> String {
    let named = |names: fn(&GptConfig, usize) -> Option<&'static str>| {
        gpt.and_then(|cfg| names(cfg, value as usize))
            .map(str::to_string)
            .unwrap_or_else(|| format_number(value))
    };

    match key {
        CriteriaKey::Score => format_number(value),
        CriteriaKey::Percent => format!("{:.2}%", value),
        CriteriaKey::LampIndex => named(GptConfig::lamp_name),
        CriteriaKey::GradeIndex => named(GptConfig::grade_name),
    }
}

/// Whole numbers without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
