//! Lot lifecycle status and the rule that derives it from step completion.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Where a lot sits in its lifecycle.
///
/// Serialized kebab-case (`"in-progress"`), matching the wire form consumers
/// of the change feed see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotStatus {
    /// Created but no pipeline step completed yet.
    Draft,
    /// At least one step completed, not all seven.
    InProgress,
    /// All seven steps completed, or force-completed by an operator.
    Completed,
    /// Retired from the active board. Still stored and still updatable.
    Archived,
}

impl LotStatus {
    /// Status after a step completion, given how many distinct steps are now
    /// done.
    ///
    /// All seven done always yields [`LotStatus::Completed`], even from
    /// `Archived`: re-completing the final step of an archived lot pulls it
    /// back onto the board. Otherwise a `Draft` lot is promoted to
    /// `InProgress` on its first completion and any other status is left
    /// alone, so completing a step on an archived lot with six steps done
    /// does not unarchive it.
    pub fn after_step_completion(self, completed_count: usize) -> LotStatus {
        if completed_count >= crate::model::Step::COUNT {
            LotStatus::Completed
        } else if self == LotStatus::Draft && completed_count > 0 {
            LotStatus::InProgress
        } else {
            self
        }
    }
}

/// `Display` matches the serde wire form, so log lines and serialized
/// documents agree on spelling.
impl Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LotStatus::Draft => "draft",
            LotStatus::InProgress => "in-progress",
            LotStatus::Completed => "completed",
            LotStatus::Archived => "archived",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_seven_always_complete() {
        for status in [
            LotStatus::Draft,
            LotStatus::InProgress,
            LotStatus::Completed,
            LotStatus::Archived,
        ] {
            assert_eq!(status.after_step_completion(7), LotStatus::Completed);
        }
    }

    #[test]
    fn first_completion_promotes_draft() {
        assert_eq!(
            LotStatus::Draft.after_step_completion(1),
            LotStatus::InProgress
        );
    }

    #[test]
    fn partial_completion_leaves_other_statuses_alone() {
        assert_eq!(
            LotStatus::InProgress.after_step_completion(3),
            LotStatus::InProgress
        );
        assert_eq!(
            LotStatus::Archived.after_step_completion(6),
            LotStatus::Archived
        );
        assert_eq!(
            LotStatus::Completed.after_step_completion(6),
            LotStatus::Completed
        );
    }

    #[test]
    fn serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&LotStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(LotStatus::InProgress.to_string(), "in-progress");
    }
}
