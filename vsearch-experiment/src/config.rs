use crate::error::ConfigError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use vsearch_core::{
    Aperture, DesignFactors, Key, Layout, LineGeometry, ResponseKeys, Screen, Style,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Requested trial count. Truncated to a whole number of design blocks.
    pub total_trials: usize,
    pub design: DesignFactors,
    pub aperture: Aperture,
    pub line: LineGeometry,
    pub style: Style,
    pub keys: ResponseKeys,
    pub abort_key: Key,
    pub inter_trial_ms: u64,
    /// Fixed seed for the trial order and line positions. Fresh entropy when unset.
    pub seed: Option<u64>,
    pub results_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub title: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            total_trials: 20,
            design: DesignFactors::default(),
            aperture: Aperture::default(),
            line: LineGeometry::default(),
            style: Style::default(),
            keys: ResponseKeys::default(),
            abort_key: Key::Escape,
            inter_trial_ms: 500,
            seed: None,
            results_path: PathBuf::from("results.csv"),
            summary_path: None,
            title: "Target Detection".to_string(),
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks the configuration and returns how many requested trials the
    /// design truncates away.
    pub fn validate(&self) -> Result<usize, ConfigError> {
        let Aperture { radius, margin } = self.aperture;
        let length = self.line.length;
        for (field, value) in [
            ("aperture.radius", radius),
            ("aperture.margin", margin),
            ("line.length", length),
            ("style.line_width", f64::from(self.style.line_width)),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if radius <= margin + length {
            return Err(ConfigError::ApertureTooSmall {
                radius,
                margin,
                length,
            });
        }
        if !(0.0..=90.0).contains(&self.line.oblique_angle_deg) {
            return Err(ConfigError::ObliqueAngleOutOfRange(
                self.line.oblique_angle_deg,
            ));
        }

        if self.keys.yes == self.keys.no {
            return Err(ConfigError::AmbiguousKeys(self.keys.yes));
        }
        if let Some(key) = self
            .keys
            .allowed()
            .into_iter()
            .find(|k| *k == self.abort_key)
        {
            return Err(ConfigError::ReservedKey(key));
        }

        for (name, empty) in [
            ("orientations", self.design.orientations.is_empty()),
            ("presence", self.design.presence.is_empty()),
            ("distractor_counts", self.design.distractor_counts.is_empty()),
        ] {
            if empty {
                return Err(ConfigError::EmptyDimension(name));
            }
        }

        let conditions = self.design.condition_count();
        let (repeats, dropped) = self.design.plan(self.total_trials);
        if repeats == 0 {
            return Err(ConfigError::TooFewTrials {
                total: self.total_trials,
                conditions,
            });
        }
        if dropped > 0 {
            warn!(
                requested = self.total_trials,
                conditions,
                running = repeats * conditions,
                dropped,
                "trial count is not a multiple of the condition count; truncating"
            );
        }
        Ok(dropped)
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.aperture, self.line)
    }

    pub fn planned_trials(&self) -> usize {
        self.design.plan(self.total_trials).0 * self.design.condition_count()
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn instructions(&self) -> Screen {
        let body = format!(
            "You will see lines inside a circle. On some trials one line, the target, \
             is tilted differently from all the others.\n\n\
             Press the {yes} if the target is present or the {no} if it is absent, \
             as quickly as possible (we measure your reaction time).\n\n\
             There will be {n} trials in total.\n\n\
             Press the spacebar to start.",
            yes = self.keys.yes,
            no = self.keys.no,
            n = self.planned_trials(),
        );
        Screen::Instructions {
            title: self.title.clone(),
            body,
        }
    }
}
