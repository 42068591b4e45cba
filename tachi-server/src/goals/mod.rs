//! Goal and quest evaluation

pub mod criteria;
pub mod datastore;
pub mod evaluator;
pub mod quests;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use criteria::{CriteriaEvaluator, PersonalBestEvaluator};
pub use datastore::Datastore;
pub use evaluator::{GoalError, GoalEvaluation, GoalEvaluator};
pub use quests::{QuestAggregator, QuestProgress};
