//! Lifecycle of one mounted slideshow.
//!
//! A [`Session`] owns the compositor, the texture loader and the scheduler.
//! It is created when the host surface appears and torn down when it goes
//! away; dropping it releases every GPU resource. All methods are safe to
//! call after teardown and do nothing.

use std::time::Instant;

use scheduler::{FrameUpdate, Slideshow};
use tracing::{debug, error, info};

use crate::compositor::Compositor;
use crate::error::EngineError;
use crate::shader::ShaderUniforms;
use crate::textures::{DecodedImage, TextureLoad};
use crate::types::{EngineOptions, Overlay, Slide};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Textures are still decoding; frames show the background color.
    Loading,
    Ready,
    /// A slide failed to load. Frames keep showing the background color.
    Failed,
    Released,
}

pub struct Session<C: Compositor> {
    compositor: C,
    slides: Vec<Slide>,
    options: EngineOptions,
    slideshow: Slideshow,
    load: Option<TextureLoad>,
    aspects: Vec<f32>,
    viewport: Viewport,
    phase: SessionPhase,
}

impl<C: Compositor> Session<C> {
    /// Binds `compositor` to a new deck and starts decoding every slide.
    pub fn activate(
        mut compositor: C,
        slides: Vec<Slide>,
        options: EngineOptions,
        viewport: Viewport,
    ) -> Result<Self, EngineError> {
        let slideshow = Slideshow::new(slides.len(), options.autoplay)?;
        if let Err(err) = compositor.resize(viewport) {
            compositor.release();
            return Err(err);
        }
        let sources: Vec<_> = slides.iter().map(|slide| slide.image.clone()).collect();
        debug!(
            slides = slides.len(),
            width = viewport.width(),
            height = viewport.height(),
            autoplay = ?slideshow.autoplay().interval(),
            "activating slideshow session"
        );
        Ok(Self {
            compositor,
            load: Some(TextureLoad::spawn(&sources)),
            aspects: Vec::with_capacity(slides.len()),
            slides,
            options,
            slideshow,
            viewport,
            phase: SessionPhase::Loading,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_live(&self) -> bool {
        self.phase != SessionPhase::Released
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_index(&self) -> usize {
        self.slideshow.current_index()
    }

    pub fn is_transitioning(&self) -> bool {
        self.slideshow.is_transitioning()
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Renders one display frame.
    ///
    /// While loading, this polls the decoders and clears to the background.
    /// Once ready, it advances the scheduler and draws the blend. An asset
    /// failure is reported exactly once; later frames keep the background.
    pub fn frame(&mut self, now: Instant) -> Result<Option<FrameUpdate>, EngineError> {
        match self.phase {
            SessionPhase::Released => Ok(None),
            SessionPhase::Failed => {
                self.compositor.clear(self.options.background_rgba())?;
                Ok(None)
            }
            SessionPhase::Loading => {
                let polled = match self.load.as_mut() {
                    Some(load) => load.poll(),
                    None => Ok(None),
                };
                match polled {
                    Ok(Some(images)) => {
                        self.become_ready(&images, now)?;
                        self.draw_ready(now).map(Some)
                    }
                    Ok(None) => {
                        self.compositor.clear(self.options.background_rgba())?;
                        Ok(None)
                    }
                    Err(err) => {
                        self.fail(&err);
                        self.compositor.clear(self.options.background_rgba())?;
                        Err(err)
                    }
                }
            }
            SessionPhase::Ready => self.draw_ready(now).map(Some),
        }
    }

    /// Blocks until every texture is resident. Useful when there is no frame
    /// loop to poll from.
    pub fn wait_for_textures(&mut self, now: Instant) -> Result<(), EngineError> {
        if self.phase != SessionPhase::Loading {
            return Ok(());
        }
        let Some(load) = self.load.take() else {
            return Ok(());
        };
        match load.wait() {
            Ok(images) => self.become_ready(&images, now),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Applies a new host surface size. The running transition is left
    /// untouched; the next frame picks up the new canvas aspect.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError> {
        if !self.is_live() || viewport == self.viewport {
            return Ok(());
        }
        self.compositor.resize(viewport)?;
        debug!(
            width = viewport.width(),
            height = viewport.height(),
            "resized render target"
        );
        self.viewport = viewport;
        Ok(())
    }

    pub fn next(&mut self, now: Instant) -> bool {
        if !self.is_live() {
            return false;
        }
        let accepted = self.slideshow.next(now);
        self.started(accepted)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        if !self.is_live() {
            return false;
        }
        let accepted = self.slideshow.previous(now);
        self.started(accepted)
    }

    /// Out-of-range indices are ignored like any other redundant request.
    pub fn goto(&mut self, index: usize, now: Instant) -> bool {
        if !self.is_live() {
            return false;
        }
        let accepted = self.slideshow.goto(index, now);
        self.started(accepted)
    }

    /// Uniforms for the current state, as the next draw would use them.
    pub fn uniforms(&self) -> ShaderUniforms {
        ShaderUniforms::derive(&self.slideshow.state(), &self.aspects, self.viewport)
    }

    /// What the overlay should show for the resting slide.
    pub fn overlay(&self) -> Overlay<'_> {
        let index = self.slideshow.current_index();
        let slide = &self.slides[index];
        Overlay {
            index,
            slide_count: self.slides.len(),
            transitioning: self.slideshow.is_transitioning(),
            ready: self.phase == SessionPhase::Ready,
            caption: &slide.caption,
            cta: slide.cta.as_ref().or(self.options.cta.as_ref()),
        }
    }

    /// Stops the session and releases the compositor. Idempotent.
    pub fn teardown(&mut self) {
        if !self.is_live() {
            return;
        }
        self.load = None;
        self.compositor.release();
        self.phase = SessionPhase::Released;
        debug!("slideshow session released");
    }

    fn become_ready(&mut self, images: &[DecodedImage], now: Instant) -> Result<(), EngineError> {
        self.load = None;
        if let Err(err) = self.compositor.upload_slides(images) {
            self.fail(&err);
            return Err(err);
        }
        self.aspects = images.iter().map(DecodedImage::aspect).collect();
        self.slideshow.mark_ready(now);
        self.phase = SessionPhase::Ready;
        info!(slides = images.len(), "slideshow ready");
        Ok(())
    }

    fn fail(&mut self, err: &EngineError) {
        error!(error = %err, "slideshow failed to become ready");
        self.load = None;
        self.slideshow.mark_failed();
        self.phase = SessionPhase::Failed;
    }

    fn draw_ready(&mut self, now: Instant) -> Result<FrameUpdate, EngineError> {
        let update = self.slideshow.tick(now);
        if let Some(done) = update.completed {
            debug!(from = done.from, to = done.to, "transition complete");
        }
        if update.autoplay_started {
            self.log_start("autoplay");
        }
        let uniforms = ShaderUniforms::derive(&update.state, &self.aspects, self.viewport);
        self.compositor.draw(&uniforms)?;
        Ok(update)
    }

    fn started(&self, accepted: bool) -> bool {
        if accepted {
            self.log_start("navigation");
        }
        accepted
    }

    fn log_start(&self, trigger: &str) {
        let state = self.slideshow.state();
        debug!(
            from = state.from,
            to = state.to,
            direction = ?state.direction,
            trigger,
            "transition started"
        );
    }
}

impl<C: Compositor> Drop for Session<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scheduler::{Direction, TransitionState, TRANSITION_DURATION};

    use super::*;
    use crate::software::SoftwareCompositor;
    use crate::textures::tests::png;
    use crate::types::{CallToAction, Caption, ImageSource};

    const FRAME: Duration = Duration::from_millis(16);

    const COLORS: [[u8; 4]; 5] = [
        [255, 0, 0, 255],
        [0, 255, 0, 255],
        [0, 0, 255, 255],
        [255, 255, 0, 255],
        [0, 255, 255, 255],
    ];

    fn deck(count: usize) -> Vec<Slide> {
        (0..count)
            .map(|index| {
                Slide::new(png(8, 4, COLORS[index % COLORS.len()])).with_caption(Caption {
                    eyebrow: format!("eyebrow {index}"),
                    title: format!("title {index}"),
                    subtitle: None,
                })
            })
            .collect()
    }

    fn options(autoplay: Option<Duration>) -> EngineOptions {
        EngineOptions {
            autoplay,
            ..EngineOptions::default()
        }
    }

    fn viewport(width: u32, height: u32) -> Viewport {
        Viewport::new(width, height).unwrap()
    }

    fn ready_session(
        count: usize,
        autoplay: Option<Duration>,
        now: Instant,
    ) -> Session<SoftwareCompositor> {
        let mut session = Session::activate(
            SoftwareCompositor::new(),
            deck(count),
            options(autoplay),
            viewport(4, 2),
        )
        .unwrap();
        session.wait_for_textures(now).unwrap();
        session
    }

    fn run(
        session: &mut Session<SoftwareCompositor>,
        from: Instant,
        to: Instant,
    ) -> Vec<FrameUpdate> {
        let mut updates = Vec::new();
        let mut now = from;
        while now <= to {
            if let Some(update) = session.frame(now).unwrap() {
                updates.push(update);
            }
            now += FRAME;
        }
        updates
    }

    #[test]
    fn empty_deck_is_rejected() {
        let result = Session::activate(
            SoftwareCompositor::new(),
            Vec::new(),
            EngineOptions::default(),
            viewport(4, 2),
        );
        assert!(matches!(result, Err(EngineError::Deck(_))));
    }

    #[test]
    fn navigation_is_ignored_while_loading() {
        let now = Instant::now();
        let slides = vec![
            Slide::new(png(2, 2, [1, 2, 3, 255])),
            Slide::new(ImageSource::Path("/nowhere/slow.png".into())),
        ];
        let mut session =
            Session::activate(SoftwareCompositor::new(), slides, options(None), viewport(2, 2))
                .unwrap();
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(!session.next(now));
        assert!(!session.overlay().ready);
    }

    #[test]
    fn becomes_ready_from_frame_loop() {
        let start = Instant::now();
        let mut session =
            Session::activate(SoftwareCompositor::new(), deck(3), options(None), viewport(4, 2))
                .unwrap();
        let deadline = start + Duration::from_secs(10);
        while session.phase() == SessionPhase::Loading {
            let now = Instant::now();
            assert!(now < deadline, "textures never became ready");
            session.frame(now).unwrap();
            if session.phase() == SessionPhase::Loading {
                assert!(session
                    .compositor()
                    .frame()
                    .pixels()
                    .all(|p| p.0 == [0x0c, 0x0a, 0x09, 255]));
                std::thread::sleep(Duration::from_millis(2));
            }
        }
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.compositor().slide_count(), 3);
        assert!(session.compositor().frame().pixels().all(|p| p.0 == COLORS[0]));
    }

    #[test]
    fn next_then_previous_round_trip() {
        let start = Instant::now();
        let mut session = ready_session(5, None, start);

        assert!(session.next(start));
        assert_eq!(
            session.uniforms(),
            ShaderUniforms::derive(
                &TransitionState {
                    from: 0,
                    to: 1,
                    progress: 0.0,
                    direction: Direction::Forward,
                    active: true,
                },
                &[2.0; 5],
                viewport(4, 2),
            )
        );
        assert!(session.overlay().transitioning);

        let updates = run(&mut session, start, start + TRANSITION_DURATION + FRAME);
        let completions: Vec<_> = updates.iter().filter_map(|u| u.completed).collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].progress, 1.0);
        assert_eq!(session.current_index(), 1);
        assert!(!session.is_transitioning());
        assert!(session.compositor().frame().pixels().all(|p| p.0 == COLORS[1]));

        let later = start + Duration::from_secs(3);
        assert!(session.previous(later));
        let uniforms = session.uniforms();
        assert_eq!((uniforms.from, uniforms.to), (1, 0));
        assert_eq!(uniforms.direction, Direction::Backward.vector());
    }

    #[test]
    fn double_next_starts_one_transition() {
        let start = Instant::now();
        let mut session = ready_session(5, None, start);
        assert!(session.next(start));
        assert!(!session.next(start + FRAME));
        let updates = run(&mut session, start, start + Duration::from_secs(4));
        assert_eq!(updates.iter().filter(|u| u.completed.is_some()).count(), 1);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn goto_current_is_noop() {
        let start = Instant::now();
        let mut session = ready_session(5, None, start);
        assert!(!session.goto(0, start));
        assert!(!session.goto(9, start));
        assert_eq!(session.uniforms().from, session.uniforms().to);
        assert!(!session.is_transitioning());
    }

    #[test]
    fn autoplay_cycles_whole_deck() {
        let start = Instant::now();
        let mut session = ready_session(5, Some(Duration::from_millis(5000)), start);
        let updates = run(&mut session, start, start + Duration::from_secs(27));
        let visited: Vec<_> = updates
            .iter()
            .filter_map(|u| u.completed.map(|done| done.to))
            .collect();
        assert_eq!(visited, vec![1, 2, 3, 4, 0]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn resize_mid_transition_keeps_progress() {
        let start = Instant::now();
        let mut session = ready_session(2, None, start);
        assert!(session.next(start));
        let halfway = start + TRANSITION_DURATION / 2;
        session.frame(halfway).unwrap();
        let before = *session.compositor().last_uniforms().unwrap();
        assert!((before.progress - 0.5).abs() < 1e-3);
        assert!((before.canvas_aspect - 2.0).abs() < 1e-6);

        session.resize(viewport(3, 6)).unwrap();
        assert_eq!(session.uniforms().progress, before.progress);

        session.frame(halfway).unwrap();
        let after = *session.compositor().last_uniforms().unwrap();
        assert_eq!(after.progress, before.progress);
        assert!((after.canvas_aspect - 0.5).abs() < 1e-6);
        assert_eq!(session.compositor().frame().dimensions(), (3, 6));
        assert!(session.is_transitioning());
    }

    #[test]
    fn asset_failure_is_reported_once_and_blocks_navigation() {
        let start = Instant::now();
        let slides = vec![
            Slide::new(png(2, 2, [1, 2, 3, 255])),
            Slide::new(ImageSource::encoded("broken.jpeg", vec![0xff, 0xd8, 0x00])),
        ];
        let mut session =
            Session::activate(SoftwareCompositor::new(), slides, options(None), viewport(2, 2))
                .unwrap();
        let deadline = start + Duration::from_secs(10);
        let err = loop {
            match session.frame(Instant::now()) {
                Err(err) => break err,
                Ok(_) => {
                    assert!(Instant::now() < deadline, "failure never surfaced");
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        };
        assert!(matches!(err, EngineError::AssetLoad { index: 1, .. }));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.frame(Instant::now()).unwrap().is_none());
        assert!(!session.next(Instant::now()));
        assert!(!session.overlay().ready);
        assert!(session
            .compositor()
            .frame()
            .pixels()
            .all(|p| p.0 == [0x0c, 0x0a, 0x09, 255]));
    }

    /// Decodes fine but refuses every texture upload.
    struct UploadRefused(SoftwareCompositor);

    impl Compositor for UploadRefused {
        fn resize(&mut self, viewport: Viewport) -> Result<(), EngineError> {
            self.0.resize(viewport)
        }

        fn upload_slides(&mut self, _images: &[DecodedImage]) -> Result<(), EngineError> {
            Err(EngineError::ContextLost("out of GPU memory".into()))
        }

        fn draw(&mut self, uniforms: &ShaderUniforms) -> Result<(), EngineError> {
            self.0.draw(uniforms)
        }

        fn clear(&mut self, color: [f32; 4]) -> Result<(), EngineError> {
            self.0.clear(color)
        }

        fn release(&mut self) {
            self.0.release();
        }
    }

    #[test]
    fn upload_failure_is_terminal() {
        let start = Instant::now();
        let mut session = Session::activate(
            UploadRefused(SoftwareCompositor::new()),
            deck(2),
            options(Some(Duration::from_secs(1))),
            viewport(4, 2),
        )
        .unwrap();
        let err = session.wait_for_textures(start).unwrap_err();
        assert!(matches!(err, EngineError::ContextLost(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);

        assert!(session.frame(start + Duration::from_secs(5)).unwrap().is_none());
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(!session.next(start));
        assert!(!session.overlay().ready);
        assert!(session
            .compositor()
            .0
            .frame()
            .pixels()
            .all(|p| p.0 == [0x0c, 0x0a, 0x09, 255]));
    }

    #[test]
    fn upload_failure_from_frame_loop_is_terminal() {
        let mut session = Session::activate(
            UploadRefused(SoftwareCompositor::new()),
            deck(2),
            options(None),
            viewport(4, 2),
        )
        .unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        let err = loop {
            match session.frame(Instant::now()) {
                Err(err) => break err,
                Ok(_) => {
                    assert!(Instant::now() < deadline, "upload never attempted");
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        };
        assert!(matches!(err, EngineError::ContextLost(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.frame(Instant::now()).unwrap().is_none());
    }

    #[test]
    fn overlay_passes_captions_and_cta_through() {
        let start = Instant::now();
        let mut slides = deck(3);
        slides[1].cta = Some(CallToAction {
            label: "Tour".into(),
            href: "/tour".into(),
        });
        let mut session = Session::activate(
            SoftwareCompositor::new(),
            slides,
            EngineOptions {
                autoplay: None,
                cta: Some(CallToAction {
                    label: "Contact".into(),
                    href: "/contact".into(),
                }),
                ..EngineOptions::default()
            },
            viewport(4, 2),
        )
        .unwrap();
        session.wait_for_textures(start).unwrap();

        let overlay = session.overlay();
        assert_eq!(overlay.caption.title, "title 0");
        assert_eq!(overlay.cta.map(|cta| cta.href.as_str()), Some("/contact"));
        assert_eq!(overlay.slide_count, 3);

        assert!(session.goto(1, start));
        run(&mut session, start, start + Duration::from_secs(2));
        let overlay = session.overlay();
        assert_eq!(overlay.index, 1);
        assert_eq!(overlay.caption.eyebrow, "eyebrow 1");
        assert_eq!(overlay.cta.map(|cta| cta.label.as_str()), Some("Tour"));
    }

    #[test]
    fn teardown_is_total_and_idempotent() {
        let start = Instant::now();
        let mut session = ready_session(3, Some(Duration::from_secs(5)), start);
        assert!(session.next(start));
        session.teardown();
        session.teardown();
        assert_eq!(session.phase(), SessionPhase::Released);
        assert!(session.compositor().is_released());
        assert!(session.frame(start + Duration::from_secs(10)).unwrap().is_none());
        assert!(!session.next(start));
        assert!(session.resize(viewport(10, 10)).is_ok());
    }
}
