use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-neutral key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Escape,
    Char(char),
    Other,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowLeft => f.write_str("left arrow"),
            Key::ArrowRight => f.write_str("right arrow"),
            Key::ArrowUp => f.write_str("up arrow"),
            Key::ArrowDown => f.write_str("down arrow"),
            Key::Space => f.write_str("spacebar"),
            Key::Enter => f.write_str("enter"),
            Key::Escape => f.write_str("escape"),
            Key::Char(c) => write!(f, "'{}'", c),
            Key::Other => f.write_str("other"),
        }
    }
}
