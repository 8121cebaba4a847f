use crate::error::FrontendError;
use vsearch_core::{Key, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Milliseconds from the onset of the last presented screen.
    pub reaction_time_ms: u64,
}

/// Display and keyboard side of the experiment.
pub trait Frontend {
    /// Shows `screen` and returns once it is on the display. The onset becomes
    /// the reference point for the next [`Frontend::wait_for_key`].
    fn present(&mut self, screen: &Screen) -> Result<(), FrontendError>;

    /// Blocks until a key from `allowed` (any key when `None`) is pressed after
    /// the last onset. No timeout.
    fn wait_for_key(&mut self, allowed: Option<&[Key]>) -> Result<KeyPress, FrontendError>;
}

/// Append-only tabular sink for trial rows.
pub trait ResultLog {
    fn declare_header(&mut self, columns: &[&str]) -> std::io::Result<()>;
    fn log_row(&mut self, values: &[String]) -> std::io::Result<()>;
}
