use crate::keys::map_key;
use anyhow::{Context, Result, anyhow};
use lexis_core::{Frame, SetupForm};
use lexis_experiment::{
    ExperimentConfig, ExperimentEvent, ExperimentStateMachine, Outcome, PreparedSession,
    ResultWriter, SetupStep, apply_setup_key,
};
use lexis_render::{FontVec, SkiaRenderer, load_font};
use lexis_timing::{FrameLog, HighPrecisionTimer};
use log::{debug, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use rand::Rng;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

type Session = ExperimentStateMachine<HighPrecisionTimer, StdRng, ResultWriter<File>>;

enum Mode {
    Setup(SetupForm),
    Running(Box<Session>),
    Done,
}

pub struct App {
    config: ExperimentConfig,
    mode: Mode,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    font: Option<FontVec>,
    output: Option<PathBuf>,
    clock: HighPrecisionTimer,
    frames: FrameLog,
    scale_factor: f64,
    refresh_rate: Option<f64>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        let (_, font) = load_font(config.font_path.as_deref()).context("loading font")?;
        let date = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let form = SetupForm::new(config.experiment_name.clone(), date);

        Ok(Self {
            config,
            mode: Mode::Setup(form),
            window: None,
            pixels: None,
            renderer: None,
            font: Some(font),
            output: None,
            clock: HighPrecisionTimer::new(),
            frames: FrameLog::default(),
            scale_factor: 1.0,
            refresh_rate: None,
            error: None,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            "Starting '{}' on {}/{}",
            self.config.experiment_name,
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        let result = event_loop.run_app(&mut self);
        self.log_frame_summary();

        if let Some(err) = self.error.take() {
            return Err(err);
        }
        result.map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        self.refresh_rate = monitor
            .as_ref()
            .and_then(|m| m.refresh_rate_millihertz())
            .map(|rate| rate as f64 / 1000.0);

        let mut attributes = Window::default_attributes()
            .with_title(self.config.experiment_name.clone())
            .with_resizable(false);
        if self.config.window.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else {
            attributes = attributes.with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        self.scale_factor = window.scale_factor();

        info!(
            "Display: {}x{} px, scale factor {:.2}, refresh {}",
            size.width,
            size.height,
            self.scale_factor,
            self.refresh_rate
                .map_or_else(|| "unknown".to_string(), |hz| format!("{hz:.1} Hz"))
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);

        let font = self
            .font
            .take()
            .ok_or_else(|| anyhow!("font already consumed"))?;
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        if let Mode::Running(session) = &mut self.mode {
            session.poll()?;
        }
        self.check_finished();

        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let frame = match &self.mode {
            Mode::Setup(form) => Frame::Setup(form),
            Mode::Running(session) => session.view(),
            Mode::Done => Frame::Blank,
        };

        renderer.render_frame(&frame, pixels.frame_mut())?;
        pixels.render()?;
        self.frames.present(self.clock.start.elapsed());

        if let Mode::Running(session) = &mut self.mode {
            session.handle_event(ExperimentEvent::FramePresented)?;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<()> {
        let code = match event.physical_key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        };
        let typing = matches!(self.mode, Mode::Setup(_));
        if event.repeat && !typing {
            return Ok(());
        }
        let Some(key) = map_key(code, event.text.as_deref(), typing) else {
            return Ok(());
        };

        match &mut self.mode {
            Mode::Setup(form) => {
                let step = apply_setup_key(form, &key, &self.config, || rand::rng().random())
                    .context("preparing session")?;
                match step {
                    SetupStep::Editing => {}
                    SetupStep::Ready(prepared) => self.start_session(*prepared),
                    SetupStep::Cancelled => self.mode = Mode::Done,
                }
            }
            Mode::Running(session) => {
                debug!("Key {:?} on {:?}", key, session.screen());
                session.handle_event(ExperimentEvent::KeyPressed(key))?;
            }
            Mode::Done => {}
        }
        self.check_finished();
        Ok(())
    }

    fn start_session(&mut self, prepared: PreparedSession) {
        let PreparedSession {
            plan,
            rng,
            output,
            writer,
            ..
        } = prepared;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.prepare(plan.trials());
        }

        let session =
            ExperimentStateMachine::new(self.config.clone(), plan, HighPrecisionTimer::new(), rng, writer);
        self.output = Some(output);
        self.mode = Mode::Running(Box::new(session));
        if let Some(window) = &self.window {
            window.set_cursor_visible(false);
        }
    }

    /// Moves a finished session to `Done` and reports how it ended
    fn check_finished(&mut self) {
        let Mode::Running(session) = &self.mode else {
            return;
        };
        let Some(outcome) = session.outcome() else {
            return;
        };
        let records = session.records_written();
        let output = self
            .output
            .as_ref()
            .map_or_else(String::new, |p| p.display().to_string());
        match outcome {
            Outcome::Completed => info!("Experiment completed, {records} records in {output}"),
            Outcome::Aborted => warn!("Experiment aborted, {records} records in {output}"),
            Outcome::Quit => warn!("Experiment quit early, {records} records in {output}"),
        }
        self.mode = Mode::Done;
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
            if let Mode::Running(session) = &self.mode {
                renderer.prepare(session.plan().trials());
            }
        }
        info!("Display resized to {}x{}", new_size.width, new_size.height);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Mode::Running(session) = &mut self.mode {
            session.quit()?;
        }
        self.check_finished();
        self.mode = Mode::Done;
        Ok(())
    }

    fn fail(&mut self, err: anyhow::Error, event_loop: &ActiveEventLoop) {
        if let Err(close_err) = self.close() {
            warn!("Closing session after error failed: {close_err:#}");
        }
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn log_frame_summary(&self) {
        if self.frames.is_empty() {
            return;
        }
        let stats = self.frames.stats();
        info!(
            "Frame intervals: mean {:.3} ms, jitter {:.3} ms, min {:.3} ms, max {:.3} ms, {:.1} fps ({} samples)",
            stats.average_frame_time_ns / 1e6,
            stats.jitter_ns / 1e6,
            stats.min_frame_time_ns / 1e6,
            stats.max_frame_time_ns / 1e6,
            stats.effective_fps,
            stats.samples
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e.context("creating window"), event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                warn!("Window closed");
                self.close()
            }
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(&event)
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                match &self.window {
                    Some(window) => {
                        let size = window.inner_size();
                        self.handle_resize(size)
                    }
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(err, event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if matches!(self.mode, Mode::Done) {
            if let Some(window) = &self.window {
                window.set_cursor_visible(true);
            }
            event_loop.exit();
        }
    }
}
