use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vsearch_experiment::ExperimentConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Visual search target detection experiment")]
pub struct Args {
    /// Path to a JSON config; defaults are used when omitted
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Requested number of trials (overrides config)
    #[arg(long, short = 'n')]
    pub trials: Option<usize>,

    /// Seed for the trial order and line positions (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// CSV results file (overrides config)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write a JSON summary here at the end of the run (overrides config)
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Run in a 1280x800 window instead of fullscreen
    #[arg(long, short, default_value_t = false)]
    pub windowed: bool,

    /// Log per-trial detail
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Loads the config file, if any, and applies command line overrides.
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExperimentConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(trials) = self.trials {
            config.total_trials = trials;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(output) = &self.output {
            config.results_path = output.clone();
        }
        if self.summary.is_some() {
            config.summary_path = self.summary.clone();
        }
    }
}
