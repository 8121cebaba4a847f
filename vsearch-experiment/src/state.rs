use crate::config::ExperimentConfig;
use crate::error::{ConfigError, ExperimentError};
use crate::frontend::{Frontend, ResultLog};
use crate::summary::Summary;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use vsearch_core::{
    Condition, Key, Layout, Phase, Screen, TrialList, TrialResult, build_trial_list,
};
use vsearch_timing::Timer;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub summary: Summary,
    /// False when the participant aborted before the last trial.
    pub completed: bool,
}

/// Sequential trial loop: instructions, then present, wait, score, log and
/// blank for every trial in the shuffled list, then debrief.
pub struct ExperimentStateMachine<P, T, R>
where
    P: Phase,
    T: Timer,
    R: Rng,
{
    pub phase: P,
    pub timer: T,
    pub rng: R,
    pub config: ExperimentConfig,
    layout: Layout,
    trials: TrialList,
    pub trial_number: usize,
    pub results: Vec<TrialResult>,
    aborted: bool,
}

impl<P, T, R> ExperimentStateMachine<P, T, R>
where
    P: Phase + Default,
    T: Timer,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let trials = build_trial_list(&config.design, config.total_trials, &mut rng);
        info!(
            trials = trials.len(),
            repeats = trials.repeats(),
            conditions = config.design.condition_count(),
            "trial list built"
        );

        Ok(Self {
            phase: P::default(),
            layout: config.layout(),
            timer,
            rng,
            config,
            trials,
            trial_number: 0,
            results: Vec::new(),
            aborted: false,
        })
    }

    pub fn advance_phase(&mut self) -> bool {
        if let Some(next) = self.phase.next() {
            info!(from = ?self.phase, to = ?next, "phase change");
            self.phase = next;
            true
        } else {
            false
        }
    }

    /// Runs every phase to the end, or until the abort key is pressed.
    pub fn run<F, L>(&mut self, frontend: &mut F, log: &mut L) -> Result<RunOutcome, ExperimentError>
    where
        F: Frontend,
        L: ResultLog,
    {
        log.declare_header(&TrialResult::COLUMNS)?;

        loop {
            if self.phase.is_instructions() {
                self.run_instructions(frontend)?;
            } else if self.phase.is_trials() {
                while let Some(condition) = self.trials.get(self.trial_number).copied() {
                    if !self.run_trial(condition, frontend, log)? {
                        break;
                    }
                }
            } else if self.phase.is_debrief() {
                break;
            }

            if self.aborted || !self.advance_phase() {
                break;
            }
        }

        self.debrief()
    }

    fn run_instructions<F: Frontend>(&mut self, frontend: &mut F) -> Result<(), ExperimentError> {
        frontend.present(&self.config.instructions())?;
        let abort = self.config.abort_key;
        let press = frontend.wait_for_key(Some(&[Key::Space, abort]))?;
        if press.key == abort {
            self.abort();
        }
        Ok(())
    }

    /// Runs one trial. Returns false when the run was aborted instead.
    fn run_trial<F, L>(
        &mut self,
        condition: Condition,
        frontend: &mut F,
        log: &mut L,
    ) -> Result<bool, ExperimentError>
    where
        F: Frontend,
        L: ResultLog,
    {
        let id = self.trial_number;
        let stimulus = self.layout.build_for(&condition, &mut self.rng);
        debug!(trial = id, %condition, segments = stimulus.set_size(), "trial started");
        frontend.present(&Screen::Stimulus(stimulus))?;

        let [yes, no] = self.config.keys.allowed();
        let abort = self.config.abort_key;
        let press = frontend.wait_for_key(Some(&[yes, no, abort]))?;
        if press.key == abort {
            self.abort();
            return Ok(false);
        }

        let score = self.config.keys.score(condition.target_present, press.key);
        let result = TrialResult::new(id, &condition, score, press.reaction_time_ms);
        log.log_row(&result.to_row())?;
        debug!(
            trial = id,
            answer = %score.answer,
            accuracy = %score.accuracy,
            rt_ms = press.reaction_time_ms,
            "response recorded"
        );
        self.results.push(result);
        self.trial_number += 1;

        frontend.present(&Screen::Blank)?;
        self.timer.sleep(Duration::from_millis(self.config.inter_trial_ms));
        Ok(true)
    }

    fn abort(&mut self) {
        warn!(
            completed = self.trial_number,
            planned = self.trials.len(),
            "run aborted by participant"
        );
        self.aborted = true;
    }

    fn debrief(&mut self) -> Result<RunOutcome, ExperimentError> {
        let summary = Summary::from_results(&self.results, self.trials.len());
        match &summary.rt {
            Some(rt) => info!(
                trials = summary.trials,
                accuracy_pct = summary.accuracy_pct,
                mean_rt_ms = rt.mean_ms,
                min_rt_ms = rt.min_ms,
                max_rt_ms = rt.max_ms,
                "experiment results"
            ),
            None => info!(trials = summary.trials, "experiment ended without responses"),
        }

        if let Some(path) = &self.config.summary_path {
            summary.write_json(path)?;
            info!(path = %path.display(), "summary saved");
        }

        Ok(RunOutcome {
            summary,
            completed: !self.aborted,
        })
    }

    /// Returns current phase
    pub fn current_phase(&self) -> &P {
        &self.phase
    }

    pub fn trial_list(&self) -> &TrialList {
        &self.trials
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// 1-based `(current, total)` while in the trial phase. Stays at
    /// `(total, total)` once the last trial is done.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        if self.phase.is_trials() {
            let total = self.trials.len();
            Some(((self.trial_number + 1).min(total), total))
        } else {
            None
        }
    }
}
