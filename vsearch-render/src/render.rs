use crate::text::{TextBlock, draw_line, line_width, load_font};
use ab_glyph::FontVec;
use anyhow::{Result, anyhow, bail};
use std::time::Duration;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};
use vsearch_core::{Point, Screen, Stimulus, Style};
use vsearch_timing::Timer;

/// Share of the window width text may occupy.
const TEXT_WIDTH: f32 = 0.8;
const TITLE_SCALE: f32 = 1.25;
const BODY_SCALE: f32 = 0.75;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Software renderer: draws a `Screen` onto an offscreen pixmap and copies it
/// into an RGBA frame buffer. Stimulus coordinates are centred on the window
/// with y pointing up.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    style: Style,
    font: Option<FontVec>,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, style: Style) -> Result<Self> {
        let font = load_font(style.font_path.as_deref());
        Self::with_font(width, height, style, font)
    }

    pub fn with_font(width: u32, height: u32, style: Style, font: Option<FontVec>) -> Result<Self> {
        let canvas = new_canvas(width, height, &style)?;
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            style,
            font,
            canvas,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = new_canvas(new_width, new_height, &self.style)?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Maps stimulus space onto canvas pixels.
    pub fn to_canvas(&self, p: Point) -> (f32, f32) {
        (self.center.0 + p.x as f32, self.center.1 - p.y as f32)
    }

    /// Redraws the whole canvas for `screen`.
    pub fn draw(&mut self, screen: &Screen) {
        self.canvas.fill(color(self.style.background));
        match screen {
            Screen::Blank => {}
            Screen::Stimulus(stimulus) => self.draw_stimulus(stimulus),
            Screen::Instructions { title, body } => self.draw_instructions(title, body),
        }
    }

    pub fn render_frame<T: Timer>(
        &mut self,
        screen: &Screen,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats> {
        if frame_buffer.len() != self.canvas.data().len() {
            bail!(
                "frame buffer is {} bytes but the canvas is {}x{}",
                frame_buffer.len(),
                self.width,
                self.height
            );
        }

        let start = timer.now();
        let (draw, copy) = match screen {
            // Nothing but background: skip the canvas.
            Screen::Blank => {
                let pixels: &mut [[u8; 4]] = bytemuck::try_cast_slice_mut(frame_buffer)
                    .map_err(|e| anyhow!("frame buffer is not RGBA: {e}"))?;
                pixels.fill(self.style.background);
                (Duration::ZERO, timer.elapsed(start))
            }
            _ => {
                self.draw(screen);
                let draw = timer.elapsed(start);
                let t = timer.now();
                frame_buffer.copy_from_slice(self.canvas.data());
                (draw, timer.elapsed(t))
            }
        };

        let total = timer.elapsed(start);
        timer.record_frame(total);
        Ok(FrameStats { draw, copy, total })
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color(self.style.foreground));
        paint.anti_alias = true;
        paint
    }

    fn draw_stimulus(&mut self, stimulus: &Stimulus) {
        let paint = self.paint();
        let (cx, cy) = self.center;

        if let Some(circle) = PathBuilder::from_circle(cx, cy, stimulus.aperture.radius as f32) {
            let stroke = Stroke {
                width: self.style.aperture_line_width,
                ..Stroke::default()
            };
            self.canvas
                .stroke_path(&circle, &paint, &stroke, Transform::identity(), None);
        }

        let mut pb = PathBuilder::new();
        for segment in &stimulus.segments {
            let (x0, y0) = self.to_canvas(segment.start);
            let (x1, y1) = self.to_canvas(segment.end);
            pb.move_to(x0, y0);
            pb.line_to(x1, y1);
        }
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: self.style.line_width,
                ..Stroke::default()
            };
            self.canvas
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn draw_instructions(&mut self, title: &str, body: &str) {
        let Some(font) = &self.font else {
            return;
        };
        let max_width = self.width as f32 * TEXT_WIDTH;
        let size = self.style.text_size;
        let heading = TextBlock::layout(font, title, size * TITLE_SCALE, max_width);
        let text = TextBlock::layout(font, body, size * BODY_SCALE, max_width);

        let gap = text.line_height;
        let total = heading.height() + gap + text.height();
        let mut top = ((self.height as f32 - total) / 2.0).max(0.0);

        for block in [&heading, &text] {
            for (i, line) in block.lines.iter().enumerate() {
                let w = line_width(font, block.scale, line);
                let x = self.center.0 - w / 2.0;
                let baseline = top + block.ascent + i as f32 * block.line_height;
                draw_line(
                    &mut self.canvas,
                    font,
                    block.scale,
                    line,
                    x,
                    baseline,
                    self.style.foreground,
                );
            }
            top += block.height() + gap;
        }
    }
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

fn new_canvas(width: u32, height: u32, style: &Style) -> Result<Pixmap> {
    let mut canvas =
        Pixmap::new(width, height).ok_or_else(|| anyhow!("invalid canvas size {width}x{height}"))?;
    canvas.fill(color(style.background));
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_core::{Aperture, LineGeometry, Orientation};
    use vsearch_timing::HighPrecisionTimer;

    const W: u32 = 1000;
    const H: u32 = 800;

    fn renderer() -> SkiaRenderer {
        SkiaRenderer::with_font(W, H, Style::default(), None).unwrap()
    }

    fn frame() -> Vec<u8> {
        vec![0u8; (W * H * 4) as usize]
    }

    fn is_dark(r: &SkiaRenderer, x: u32, y: u32) -> bool {
        r.canvas().pixel(x, y).is_some_and(|p| p.red() < 128)
    }

    fn single_vertical() -> Stimulus {
        Stimulus {
            aperture: Aperture::default(),
            segments: vec![LineGeometry::default().segment(Orientation::Vertical, Point::ORIGIN)],
        }
    }

    #[test]
    fn blank_is_all_background() {
        let mut r = renderer();
        let mut fb = frame();
        r.render_frame(&Screen::Blank, &mut fb, &mut HighPrecisionTimer::new())
            .unwrap();
        assert!(fb.iter().all(|&b| b == 255));
    }

    #[test]
    fn y_axis_points_up() {
        let r = renderer();
        assert_eq!(r.to_canvas(Point::new(0.0, 10.0)), (500.0, 390.0));
        assert_eq!(r.to_canvas(Point::new(-20.0, 0.0)), (480.0, 400.0));
    }

    #[test]
    fn stimulus_draws_aperture_and_segments() {
        let mut r = renderer();
        let mut fb = frame();
        let screen = Screen::Stimulus(single_vertical());
        r.render_frame(&screen, &mut fb, &mut HighPrecisionTimer::new())
            .unwrap();

        // Left rim of the aperture, then the middle of the segment.
        assert!(is_dark(&r, 140, 400));
        assert!(is_dark(&r, 500, 390));
        // Centre of the aperture away from the segment stays clear.
        assert!(!is_dark(&r, 600, 400));
        assert_eq!(fb.as_slice(), r.canvas().data());
    }

    #[test]
    fn blank_after_stimulus_clears_the_frame() {
        let mut r = renderer();
        let mut fb = frame();
        let mut timer = HighPrecisionTimer::new();
        r.render_frame(&Screen::Stimulus(single_vertical()), &mut fb, &mut timer)
            .unwrap();
        r.render_frame(&Screen::Blank, &mut fb, &mut timer).unwrap();
        assert!(fb.iter().all(|&b| b == 255));
        assert_eq!(timer.frame_stats().samples, 2);
    }

    #[test]
    fn mismatched_frame_is_an_error() {
        let mut r = renderer();
        let mut fb = vec![0u8; 16];
        let result = r.render_frame(&Screen::Blank, &mut fb, &mut HighPrecisionTimer::new());
        assert!(result.is_err());
    }

    #[test]
    fn resize_moves_the_centre() {
        let mut r = renderer();
        r.resize(200, 100).unwrap();
        assert_eq!(r.size(), (200, 100));
        assert_eq!(r.to_canvas(Point::ORIGIN), (100.0, 50.0));
        assert!(r.resize(0, 0).is_err());
    }

    #[test]
    fn instructions_without_font_are_blank() {
        let mut r = renderer();
        r.draw(&Screen::Instructions {
            title: "Title".into(),
            body: "Body".into(),
        });
        assert!(r.canvas().data().iter().all(|&b| b == 255));
    }

    #[test]
    fn instructions_draw_text_when_a_font_exists() {
        let Some(font) = load_font(None) else {
            return;
        };
        let mut r = SkiaRenderer::with_font(W, H, Style::default(), Some(font)).unwrap();
        r.draw(&Screen::Instructions {
            title: "Target Detection".into(),
            body: "Press the spacebar to start.".into(),
        });
        assert!(r.canvas().pixels().iter().any(|p| p.red() < 128));
    }
}
