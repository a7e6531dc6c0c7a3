use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::gpu::GpuCompositor;
use crate::session::Session;
use crate::types::{EngineOptions, ImageSource, Overlay, Slide};
use crate::viewport::Viewport;

/// Everything the window host needs to play a deck.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub title: String,
    /// Initial inner size in physical pixels.
    pub size: (u32, u32),
    pub slides: Vec<Slide>,
    pub options: EngineOptions,
    /// Shown cover-fitted, without animation, if any slide fails to load.
    pub fallback: Option<ImageSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostCommand {
    Next,
    Previous,
    Goto(usize),
    Exit,
}

fn command_for_key(key: &Key) -> Option<HostCommand> {
    match key {
        Key::Named(NamedKey::ArrowRight | NamedKey::Space) => Some(HostCommand::Next),
        Key::Named(NamedKey::ArrowLeft) => Some(HostCommand::Previous),
        Key::Named(NamedKey::Escape) => Some(HostCommand::Exit),
        Key::Character(value) if value.as_str() == " " => Some(HostCommand::Next),
        Key::Character(value) => match value.as_str().parse::<usize>() {
            Ok(digit @ 1..=9) => Some(HostCommand::Goto(digit - 1)),
            _ => None,
        },
        _ => None,
    }
}

fn window_title(base: &str, overlay: &Overlay<'_>) -> String {
    if !overlay.ready {
        return base.to_string();
    }
    let caption = overlay.caption;
    let mut title = format!("{base} [{}/{}]", overlay.index + 1, overlay.slide_count);
    if !caption.eyebrow.is_empty() {
        title.push_str(&format!(" {}:", caption.eyebrow));
    }
    if !caption.title.is_empty() {
        title.push(' ');
        title.push_str(&caption.title);
    }
    if let Some(subtitle) = caption.subtitle.as_deref().filter(|s| !s.is_empty()) {
        title.push_str(&format!(" ({subtitle})"));
    }
    if let Some(cta) = overlay.cta {
        title.push_str(&format!(" > {}", cta.label));
    }
    title
}

/// Aggregates the session and the window it draws into. The session is
/// declared first so the surface is dropped before the window.
struct WindowState {
    session: Option<Session<GpuCompositor>>,
    window: Arc<Window>,
    config: HostConfig,
    fell_back: bool,
    title: String,
}

impl WindowState {
    fn new(window: Arc<Window>, config: HostConfig) -> Result<Self> {
        let viewport = viewport_for(&window, config.options.max_pixel_ratio)
            .context("window has zero size")?;
        let compositor = GpuCompositor::new(window.as_ref(), viewport)?;
        let session = Session::activate(
            compositor,
            config.slides.clone(),
            config.options.clone(),
            viewport,
        )?;
        Ok(Self {
            session: Some(session),
            window,
            title: config.title.clone(),
            config,
            fell_back: false,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), EngineError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let scale = self.window.scale_factor();
        let max_ratio = self.config.options.max_pixel_ratio;
        match Viewport::for_window((size.width, size.height), scale, max_ratio) {
            Some(viewport) => session.resize(viewport),
            // Minimised; keep the last surface.
            None => Ok(()),
        }
    }

    fn apply(&mut self, command: HostCommand, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return true;
        };
        match command {
            HostCommand::Next => {
                session.next(now);
            }
            HostCommand::Previous => {
                session.previous(now);
            }
            HostCommand::Goto(index) => {
                session.goto(index, now);
            }
            HostCommand::Exit => return false,
        }
        true
    }

    fn render(&mut self) -> Result<(), EngineError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        match session.frame(Instant::now()) {
            Ok(_) => {
                self.sync_title();
                Ok(())
            }
            Err(err @ EngineError::AssetLoad { .. }) => self.fall_back(err),
            Err(err) => Err(err),
        }
    }

    fn sync_title(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let title = window_title(&self.config.title, &session.overlay());
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }

    /// Swaps in a static, single-slide session showing the fallback image.
    fn fall_back(&mut self, err: EngineError) -> Result<(), EngineError> {
        let Some(image) = self.config.fallback.clone().filter(|_| !self.fell_back) else {
            warn!(error = %err, "no fallback image; keeping background");
            return Ok(());
        };
        self.fell_back = true;
        info!(%image, "falling back to static image");

        let Some(mut failed) = self.session.take() else {
            return Ok(());
        };
        let viewport = failed.viewport();
        let caption = self
            .config
            .slides
            .first()
            .map(|slide| slide.caption.clone())
            .unwrap_or_default();
        // The failed session must give up the surface before a new one binds.
        failed.teardown();
        drop(failed);

        let compositor = GpuCompositor::new(self.window.as_ref(), viewport)?;
        let options = EngineOptions {
            autoplay: None,
            ..self.config.options.clone()
        };
        let slide = Slide::new(image).with_caption(caption);
        self.session = Some(Session::activate(compositor, vec![slide], options, viewport)?);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
    }
}

fn viewport_for(window: &Window, max_pixel_ratio: f64) -> Option<Viewport> {
    let size = window.inner_size();
    Viewport::for_window((size.width, size.height), window.scale_factor(), max_pixel_ratio)
}

/// Opens a window and plays the deck until it is closed.
///
/// Returns an error if the GPU context is lost; the caller may start over.
pub fn run_window(config: HostConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.size.0, config.size.1))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(Arc::clone(&window), config)
        .context("failed to initialise slideshow renderer")?;
    let mut failure: Option<EngineError> = None;

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(command) = command_for_key(&event.logical_key) {
                        if !state.apply(command, Instant::now()) {
                            elwt.exit();
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Err(err) = state.resize(new_size) {
                    error!(error = %err, "failed to resize render target");
                    failure = Some(err);
                    elwt.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.render() {
                    error!(error = %err, "slideshow stopped");
                    failure = Some(err);
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            state.window.request_redraw();
            elwt.set_control_flow(ControlFlow::Wait);
        }
        Event::LoopExiting => {
            state.shutdown();
        }
        _ => {}
    });

    state.shutdown();
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))?;
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
