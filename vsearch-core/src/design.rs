use crate::geometry::Orientation;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trial type: which orientation is the target, whether it is shown, and
/// how many distractors surround it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub target: Orientation,
    pub target_present: bool,
    pub distractors: usize,
}

impl Condition {
    pub fn new(target: Orientation, target_present: bool, distractors: usize) -> Self {
        Self {
            target,
            target_present,
            distractors,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} target {}, {} distractors",
            self.target,
            if self.target_present { "present" } else { "absent" },
            self.distractors
        )
    }
}

/// Value lists of the three crossed design dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignFactors {
    pub orientations: Vec<Orientation>,
    pub presence: Vec<bool>,
    pub distractor_counts: Vec<usize>,
}

impl Default for DesignFactors {
    fn default() -> Self {
        Self {
            orientations: Orientation::ALL.to_vec(),
            presence: vec![true, false],
            distractor_counts: vec![5, 10, 15],
        }
    }
}

impl DesignFactors {
    pub fn condition_count(&self) -> usize {
        self.orientations.len() * self.presence.len() * self.distractor_counts.len()
    }

    /// Full cross product, orientation-major.
    pub fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::with_capacity(self.condition_count());
        for &target in &self.orientations {
            for &present in &self.presence {
                for &distractors in &self.distractor_counts {
                    out.push(Condition::new(target, present, distractors));
                }
            }
        }
        out
    }

    /// `(repeats, dropped)` for a requested total: how many full blocks of the
    /// cross product fit, and how many requested trials are truncated away.
    pub fn plan(&self, total_trials: usize) -> (usize, usize) {
        match self.condition_count() {
            0 => (0, total_trials),
            n => (total_trials / n, total_trials % n),
        }
    }
}

/// Balanced, shuffled sequence of conditions for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialList {
    conditions: Vec<Condition>,
    repeats: usize,
    dropped: usize,
}

impl TrialList {
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Condition> {
        self.conditions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn as_slice(&self) -> &[Condition] {
        &self.conditions
    }

    /// Number of times each condition appears.
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Requested trials lost to truncation.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<'a> IntoIterator for &'a TrialList {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

/// Repeats the cross product of `factors` as many whole times as fit in
/// `total_trials` and shuffles the result.
///
/// The remainder of `total_trials / condition_count` is truncated, so every
/// condition appears exactly [`TrialList::repeats`] times and the length is
/// `repeats * condition_count`. Only the order depends on `rng`.
pub fn build_trial_list<R: Rng + ?Sized>(
    factors: &DesignFactors,
    total_trials: usize,
    rng: &mut R,
) -> TrialList {
    let block = factors.conditions();
    let (repeats, dropped) = factors.plan(total_trials);

    let mut conditions = Vec::with_capacity(repeats * block.len());
    for _ in 0..repeats {
        conditions.extend_from_slice(&block);
    }
    conditions.shuffle(rng);

    TrialList {
        conditions,
        repeats,
        dropped,
    }
}
