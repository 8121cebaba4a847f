use crate::stimulus::Stimulus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Colours and stroke widths shared by every screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub background: [u8; 4],
    pub foreground: [u8; 4],
    pub line_width: f32,
    pub aperture_line_width: f32,
    pub text_size: f32,
    /// TrueType font for the instructions. System fonts are searched when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            foreground: [0, 0, 0, 255],
            line_width: 2.0,
            aperture_line_width: 2.0,
            text_size: 40.0,
            font_path: None,
        }
    }
}

/// Everything the display collaborator can be asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Instructions { title: String, body: String },
    Stimulus(Stimulus),
    Blank,
}

impl Screen {
    pub fn is_stimulus(&self) -> bool {
        matches!(self, Screen::Stimulus(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Screen::Instructions { .. } => "instructions",
            Screen::Stimulus(_) => "stimulus",
            Screen::Blank => "blank",
        }
    }
}
