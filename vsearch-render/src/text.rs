use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use std::path::{Path, PathBuf};
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::{debug, warn};

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads `path`, or the first readable system font when `None`.
pub fn load_font(path: Option<&Path>) -> Option<FontVec> {
    let candidates: Vec<PathBuf> = match path {
        Some(p) => vec![p.to_path_buf()],
        None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
    };
    for candidate in candidates {
        let Ok(bytes) = std::fs::read(&candidate) else {
            continue;
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                debug!(path = %candidate.display(), "font loaded");
                return Some(font);
            }
            Err(e) => warn!(path = %candidate.display(), error = %e, "unreadable font"),
        }
    }
    warn!("no usable font found; instructions will be drawn without text");
    None
}

pub fn line_width<F: Font>(font: &F, scale: PxScale, text: &str) -> f32 {
    let sf = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = sf.glyph_id(ch);
        if let Some(p) = prev {
            width += sf.kern(p, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Text broken into lines no wider than a limit. Explicit newlines start a
/// new line; an empty line is kept as vertical space.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub scale: PxScale,
    pub ascent: f32,
    pub line_height: f32,
}

impl TextBlock {
    pub fn layout<F: Font>(font: &F, text: &str, size: f32, max_width: f32) -> Self {
        let scale = PxScale::from(size);
        let sf = font.as_scaled(scale);

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{line} {word}")
                };
                if !line.is_empty() && line_width(font, scale, &candidate) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line = word.to_string();
                } else {
                    line = candidate;
                }
            }
            lines.push(line);
        }

        Self {
            lines,
            scale,
            ascent: sf.ascent(),
            line_height: sf.height() + sf.line_gap(),
        }
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Draws one line with its left edge at `x` and baseline at `baseline`,
/// blending glyph coverage over what is already on the canvas.
pub fn draw_line<F: Font>(
    canvas: &mut Pixmap,
    font: &F,
    scale: PxScale,
    text: &str,
    x: f32,
    baseline: f32,
    color: [u8; 4],
) {
    let sf = font.as_scaled(scale);
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let stride = canvas.width() as usize;
    let pixels = canvas.pixels_mut();

    let mut pen = x;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = sf.glyph_id(ch);
        if let Some(p) = prev {
            pen += sf.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(pen, baseline));
        pen += sf.h_advance(id);
        prev = Some(id);

        let Some(outline) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outline.px_bounds();
        outline.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            if coverage <= f32::EPSILON || px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let i = py as usize * stride + px as usize;
            pixels[i] = blend(pixels[i], color, coverage);
        });
    }
}

/// Source-over in premultiplied space.
fn blend(dst: PremultipliedColorU8, color: [u8; 4], coverage: f32) -> PremultipliedColorU8 {
    let a = coverage.clamp(0.0, 1.0) * f32::from(color[3]) / 255.0;
    let inv = 1.0 - a;
    let mix = |src: u8, bg: u8| (f32::from(src) * a + f32::from(bg) * inv).round().clamp(0.0, 255.0) as u8;
    let alpha = mix(255, dst.alpha());
    PremultipliedColorU8::from_rgba(
        mix(color[0], dst.red()).min(alpha),
        mix(color[1], dst.green()).min(alpha),
        mix(color[2], dst.blue()).min(alpha),
        alpha,
    )
    .unwrap_or(dst)
}
