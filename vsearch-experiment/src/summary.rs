use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use vsearch_core::{Accuracy, Condition, TrialResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RtStats {
    pub mean_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl RtStats {
    fn from_results<'a>(results: impl Iterator<Item = &'a TrialResult>) -> Option<Self> {
        let times: Vec<u64> = results.map(|r| r.reaction_time_ms).collect();
        if times.is_empty() {
            return None;
        }
        Some(Self {
            mean_ms: times.iter().sum::<u64>() as f64 / times.len() as f64,
            min_ms: times.iter().copied().min().unwrap_or_default(),
            max_ms: times.iter().copied().max().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSummary {
    pub condition: Condition,
    pub trials: usize,
    pub correct: usize,
    pub mean_rt_ms: Option<f64>,
}

/// Aggregate view of a run, written at debrief.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub planned: usize,
    pub trials: usize,
    pub scored: usize,
    pub correct: usize,
    pub accuracy_pct: f64,
    pub rt: Option<RtStats>,
    pub conditions: Vec<ConditionSummary>,
}

impl Summary {
    pub fn from_results(results: &[TrialResult], planned: usize) -> Self {
        let scored = results
            .iter()
            .filter(|r| r.accuracy != Accuracy::NotApplicable)
            .count();
        let correct = results.iter().filter(|r| r.accuracy.is_correct()).count();
        let accuracy_pct = if scored > 0 {
            correct as f64 / scored as f64 * 100.0
        } else {
            0.0
        };

        // First-seen order keeps the breakdown stable for a given results file.
        let mut conditions: Vec<ConditionSummary> = Vec::new();
        for result in results {
            let condition = result.condition();
            if conditions.iter().any(|c| c.condition == condition) {
                continue;
            }
            let matching: Vec<&TrialResult> = results
                .iter()
                .filter(|r| r.condition() == condition)
                .collect();
            conditions.push(ConditionSummary {
                condition,
                trials: matching.len(),
                correct: matching.iter().filter(|r| r.accuracy.is_correct()).count(),
                mean_rt_ms: RtStats::from_results(matching.iter().copied()).map(|s| s.mean_ms),
            });
        }

        Self {
            planned,
            trials: results.len(),
            scored,
            correct,
            accuracy_pct,
            rt: RtStats::from_results(results.iter()),
            conditions,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), crate::ExperimentError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_core::{Answer, Orientation, Score};

    fn result(trial: usize, present: bool, answer: Answer, rt: u64) -> TrialResult {
        let condition = Condition::new(Orientation::Vertical, present, 5);
        let score = Score {
            answer,
            accuracy: vsearch_core::accuracy(present, answer),
        };
        TrialResult::new(trial, &condition, score, rt)
    }

    #[test]
    fn aggregates_accuracy_and_rt() {
        let results = vec![
            result(0, true, Answer::Yes, 400),
            result(1, false, Answer::Yes, 600),
            result(2, false, Answer::No, 500),
        ];
        let summary = Summary::from_results(&results, 4);
        assert_eq!(summary.planned, 4);
        assert_eq!(summary.trials, 3);
        assert_eq!(summary.correct, 2);
        assert!((summary.accuracy_pct - 200.0 / 3.0).abs() < 1e-9);

        let rt = summary.rt.unwrap();
        assert_eq!(rt.mean_ms, 500.0);
        assert_eq!((rt.min_ms, rt.max_ms), (400, 600));

        assert_eq!(summary.conditions.len(), 2);
        assert!(summary.conditions[0].condition.target_present);
        assert_eq!(summary.conditions[1].trials, 2);
        assert_eq!(summary.conditions[1].mean_rt_ms, Some(550.0));
    }

    #[test]
    fn json_lands_in_a_fresh_directory() {
        let dir = std::env::temp_dir().join(format!("vsearch-summary-dir-{}", std::process::id()));
        let path = dir.join("nested").join("summary.json");
        let summary = Summary::from_results(&[result(0, true, Answer::Yes, 420)], 12);
        summary.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["trials"], 1);
        assert_eq!(json["rt"]["max_ms"], 420);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_run_has_no_rt() {
        let summary = Summary::from_results(&[], 12);
        assert_eq!(summary.rt, None);
        assert_eq!(summary.accuracy_pct, 0.0);
    }
}
