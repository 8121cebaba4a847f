pub mod render;
pub mod text;

pub use render::{FrameStats, SkiaRenderer};
pub use text::{TextBlock, load_font};
