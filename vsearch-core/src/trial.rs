use crate::design::Condition;
use crate::geometry::Orientation;
use crate::scoring::{Accuracy, Answer, Score};
use serde::{Deserialize, Serialize};

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub target_orientation: Orientation,
    pub target_present: bool,
    pub answer: Answer,
    pub accuracy: Accuracy,
    pub reaction_time_ms: u64,
    pub distractors: usize,
}

impl TrialResult {
    /// Header of the results file, in row order.
    pub const COLUMNS: [&'static str; 7] = [
        "trial",
        "target_type",
        "target_presence",
        "answer",
        "accuracy",
        "rt",
        "nb_distractors",
    ];

    pub fn new(trial: usize, condition: &Condition, score: Score, reaction_time_ms: u64) -> Self {
        Self {
            trial,
            target_orientation: condition.target,
            target_present: condition.target_present,
            answer: score.answer,
            accuracy: score.accuracy,
            reaction_time_ms,
            distractors: condition.distractors,
        }
    }

    pub fn condition(&self) -> Condition {
        Condition::new(self.target_orientation, self.target_present, self.distractors)
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.trial.to_string(),
            self.target_orientation.label().to_string(),
            if self.target_present { "present" } else { "absent" }.to_string(),
            self.answer.label().to_string(),
            self.accuracy.label().to_string(),
            self.reaction_time_ms.to_string(),
            self.distractors.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lines_up_with_columns() {
        let condition = Condition::new(Orientation::Oblique, false, 10);
        let score = Score {
            answer: Answer::No,
            accuracy: Accuracy::Correct,
        };
        let result = TrialResult::new(3, &condition, score, 642);
        let row = result.to_row();
        assert_eq!(row.len(), TrialResult::COLUMNS.len());
        assert_eq!(
            row,
            ["3", "oblique", "absent", "no", "correct", "642", "10"]
        );
        assert_eq!(result.condition(), condition);
    }
}
