use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Answer {
    Yes,
    No,
    Invalid,
}

impl Answer {
    pub fn label(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accuracy {
    Correct,
    Incorrect,
    NotApplicable,
}

impl Accuracy {
    pub fn label(self) -> &'static str {
        match self {
            Accuracy::Correct => "correct",
            Accuracy::Incorrect => "incorrect",
            Accuracy::NotApplicable => "n/a",
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Accuracy::Correct)
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub answer: Answer,
    pub accuracy: Accuracy,
}

/// Accuracy of `answer` against ground truth.
pub fn accuracy(target_present: bool, answer: Answer) -> Accuracy {
    match (answer, target_present) {
        (Answer::Invalid, _) => Accuracy::NotApplicable,
        (Answer::Yes, true) | (Answer::No, false) => Accuracy::Correct,
        (Answer::Yes, false) | (Answer::No, true) => Accuracy::Incorrect,
    }
}

/// The two keys that answer "target present" and "target absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseKeys {
    pub yes: Key,
    pub no: Key,
}

impl Default for ResponseKeys {
    fn default() -> Self {
        Self {
            yes: Key::ArrowRight,
            no: Key::ArrowLeft,
        }
    }
}

impl ResponseKeys {
    pub fn answer(&self, key: Key) -> Answer {
        if key == self.yes {
            Answer::Yes
        } else if key == self.no {
            Answer::No
        } else {
            Answer::Invalid
        }
    }

    pub fn score(&self, target_present: bool, key: Key) -> Score {
        let answer = self.answer(key);
        Score {
            answer,
            accuracy: accuracy(target_present, answer),
        }
    }

    pub fn allowed(&self) -> [Key; 2] {
        [self.yes, self.no]
    }
}
