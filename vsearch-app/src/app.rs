use crate::link::{self, DisplaySide, KeyStamp, UserEvent};
use anyhow::{Context, Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};
use vsearch_core::{Screen, StandardPhase, Style};
use vsearch_experiment::{
    CsvResultLog, ExperimentConfig, ExperimentError, ExperimentStateMachine, RunOutcome,
};
use vsearch_render::SkiaRenderer;
use vsearch_timing::{HighPrecisionTimer, Timer};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

const WINDOWED_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 800);

/// Runs the experiment on a worker thread while the event loop owns the
/// window on this one.
pub fn run(config: ExperimentConfig, windowed: bool) -> Result<()> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    info!(
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "starting visual search experiment"
    );

    let timer = HighPrecisionTimer::new();
    let rng = config.rng();
    let mut experiment =
        ExperimentStateMachine::<StandardPhase, _, _>::new(config.clone(), timer.clone(), rng)?;
    let mut log = CsvResultLog::create(&config.results_path)
        .with_context(|| format!("creating {}", config.results_path.display()))?;
    info!(path = %config.results_path.display(), "writing results");

    let (mut frontend, display) = link::channel(event_loop.create_proxy(), config.abort_key);
    let worker = thread::Builder::new()
        .name("experiment".into())
        .spawn(move || {
            let outcome = experiment.run(&mut frontend, &mut log);
            frontend.finish();
            outcome
        })?;

    let mut app = App::new(display, config.style.clone(), windowed, timer);
    let loop_result = event_loop.run_app(&mut app);
    let failure = app.failure.take();
    app.report_timing();
    // Closes the channels so a still-waiting experiment thread returns.
    drop(app);

    let outcome = worker
        .join()
        .map_err(|_| anyhow!("experiment thread panicked"))?;
    loop_result?;
    if let Some(e) = failure {
        return Err(e);
    }
    report_outcome(outcome, &config)
}

fn report_outcome(outcome: Result<RunOutcome, ExperimentError>, config: &ExperimentConfig) -> Result<()> {
    match outcome {
        Ok(outcome) if outcome.completed => {
            info!(
                trials = outcome.summary.trials,
                accuracy_pct = outcome.summary.accuracy_pct,
                "experiment completed"
            );
        }
        Ok(outcome) => {
            info!(
                trials = outcome.summary.trials,
                planned = outcome.summary.planned,
                "experiment aborted"
            );
        }
        Err(ExperimentError::Frontend(e)) => {
            warn!(error = %e, "window closed before the run finished");
        }
        Err(e) => return Err(e.into()),
    }
    info!(path = %config.results_path.display(), "results saved");
    Ok(())
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    style: Style,
    windowed: bool,
    display: DisplaySide,
    timer: HighPrecisionTimer,

    screen: Screen,
    /// A presented screen whose onset has not been reported yet.
    pending_onset: bool,
    refresh_rate: Option<f64>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(display: DisplaySide, style: Style, windowed: bool, timer: HighPrecisionTimer) -> Self {
        Self {
            window: None,
            pixels: None,
            renderer: None,
            style,
            windowed,
            display,
            timer,
            screen: Screen::Blank,
            pending_onset: false,
            refresh_rate: None,
            failure: None,
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let mut window_attributes = Window::default_attributes()
            .with_title("Visual Search")
            .with_resizable(false);
        window_attributes = if self.windowed {
            window_attributes.with_inner_size(WINDOWED_SIZE)
        } else {
            window_attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
        };

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = ?self.refresh_rate,
            windowed = self.windowed,
            "display configured"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, self.style.clone())?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Draws the current screen. Reports the onset once the frame has been
    /// handed to the display.
    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_frame(&self.screen, pixels.frame_mut(), &mut self.timer)?;
        pixels.render()?;
        let onset = self.timer.now();
        debug!(
            screen = self.screen.kind(),
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            "frame presented"
        );

        if self.pending_onset {
            self.pending_onset = false;
            // The experiment thread is gone when this fails; nothing to report to.
            let _ = self.display.onsets.send(onset);
        }
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        if new_size.width == 0 || new_size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(new_size.width, new_size.height)?;
            pixels.resize_buffer(new_size.width, new_size.height)?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height)?;
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        self.request_redraw();
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!(error = %e, "display failure");
        self.failure = Some(e);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }

    fn report_timing(&self) {
        let stats = self.timer.frame_stats();
        if stats.samples == 0 {
            return;
        }
        info!(
            frames = stats.samples,
            mean_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            min_ms = stats.min_frame_time_ns / 1e6,
            max_ms = stats.max_frame_time_ns / 1e6,
            "render timing"
        );
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(event_loop, e.context("creating window and surface"));
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Present(screen) => {
                self.screen = screen;
                self.pending_onset = true;
                self.request_redraw();
            }
            UserEvent::Finished => self.exit(event_loop),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                warn!("window close requested");
                self.exit(event_loop);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                let key = link::map_key(event.physical_key, &event.logical_key);
                let stamp = KeyStamp {
                    key,
                    at_ns: self.timer.now(),
                };
                debug!(%key, at_ns = stamp.at_ns, "key pressed");
                let _ = self.display.keys.send(stamp);
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.handle_resize(size) {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    if let Err(e) = self.handle_resize(size) {
                        self.fail(event_loop, e);
                    }
                }
            }
            _ => {}
        }
    }
}
