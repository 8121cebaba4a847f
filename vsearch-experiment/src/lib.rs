pub mod config;
pub mod error;
pub mod frontend;
pub mod log;
pub mod state;
pub mod summary;

pub use config::ExperimentConfig;
pub use error::{ConfigError, ExperimentError, FrontendError};
pub use frontend::{Frontend, KeyPress, ResultLog};
pub use log::CsvResultLog;
pub use state::{ExperimentStateMachine, RunOutcome};
pub use summary::{ConditionSummary, RtStats, Summary};
