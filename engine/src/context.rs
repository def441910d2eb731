use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use winit::{event_loop::EventLoop, window::Window};

use crate::audio::Audio;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::platform::{executable_dir, resolve_resource, Platform, PlatformEvent};
use crate::render::{create_renderer, RenderSurface, Renderer, RendererBackend};

/// Pumps allowed for the platform to deliver `resumed` and the first window.
const WINDOW_PUMP_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    ShutDown,
}

/// Engine façade: owns the window, renderer and audio, and drives them from
/// the caller's frame loop.
///
/// ```no_run
/// use nyanchu::{Engine, EngineConfig};
///
/// let mut engine = Engine::new(EngineConfig::default());
/// engine.init()?;
/// while engine.is_running() {
///     engine.poll_events();
///     engine.begin_frame()?;
///     engine.renderer()?.draw_triangle();
///     engine.end_frame()?;
/// }
/// engine.shutdown();
/// # Ok::<(), nyanchu::EngineError>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    state: EngineState,
    event_loop: Option<EventLoop<()>>,
    platform: Platform,
    renderer: Option<Box<dyn Renderer>>,
    audio: Option<Audio>,
    resource_dir: Option<PathBuf>,
    delta_time: f32,
    last_frame: Option<Instant>,
}

impl Engine {
    /// Creates an engine without touching any OS resources; call [`Engine::init`].
    pub fn new(config: EngineConfig) -> Self {
        let platform = Platform::new(config.window.clone());
        Self {
            config,
            state: EngineState::Uninitialized,
            event_loop: None,
            platform,
            renderer: None,
            audio: None,
            resource_dir: None,
            delta_time: 0.0,
            last_frame: None,
        }
    }

    pub fn init(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => return Err(EngineError::AlreadyInitialized),
            EngineState::ShutDown => return Err(EngineError::ShutDown),
            EngineState::Uninitialized => {}
        }

        if let Err(err) = self.try_init() {
            log::error!("engine initialization failed: {err}");
            self.release_subsystems();
            return Err(err);
        }

        self.state = EngineState::Running;
        log::info!("Engine initialized");
        Ok(())
    }

    fn try_init(&mut self) -> Result<(), EngineError> {
        // The headless backend runs without an event loop or window.
        let (surface, width, height) = match self.config.renderer.backend {
            RendererBackend::Headless => (
                RenderSurface::Offscreen,
                self.config.window.width,
                self.config.window.height,
            ),
            RendererBackend::Wgpu => {
                let window = self.open_window()?;
                let size = window.inner_size();
                (RenderSurface::Window(window), size.width, size.height)
            }
        };

        let mut renderer = create_renderer(&self.config.renderer);
        renderer.initialize(surface, width, height)?;
        self.renderer = Some(renderer);

        let mut audio = Audio::new(&self.config.audio);
        if let Err(err) = audio.init() {
            log::warn!("audio unavailable, continuing without sound: {err}");
        }
        self.audio = Some(audio);

        let resource_dir = match &self.config.resource_dir {
            Some(dir) => dir.clone(),
            None => executable_dir().map_err(EngineError::ResourceDir)?,
        };
        log::debug!("resource directory: {}", resource_dir.display());
        self.resource_dir = Some(resource_dir);

        Ok(())
    }

    fn open_window(&mut self) -> Result<Arc<Window>, EngineError> {
        // winit allows one event loop per process; the loop and window survive
        // a failed init so it can be retried.
        let event_loop = match self.event_loop.take() {
            Some(event_loop) => event_loop,
            None => EventLoop::new()?,
        };
        let event_loop = self.event_loop.insert(event_loop);

        for _ in 0..WINDOW_PUMP_ATTEMPTS {
            self.platform.pump(event_loop);

            if let Some(err) = self.platform.take_creation_error() {
                return Err(EngineError::WindowCreation(err));
            }
            if let Some(window) = self.platform.window() {
                return Ok(Arc::clone(window));
            }
        }

        Err(EngineError::WindowUnavailable)
    }

    fn release_subsystems(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.shutdown();
        }
        if let Some(mut renderer) = self.renderer.take() {
            renderer.shutdown();
        }
    }

    /// Tears down audio, renderer and window, in that order. Repeated calls,
    /// or calls before `init`, do nothing.
    pub fn shutdown(&mut self) {
        if self.state != EngineState::Running {
            log::debug!("shutdown ignored in state {:?}", self.state);
            return;
        }

        self.release_subsystems();
        self.platform.destroy_window();
        self.event_loop = None;
        self.state = EngineState::ShutDown;
        log::info!("Engine shutdown");
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running && !self.platform.close_requested()
    }

    /// Asks the frame loop to stop; `is_running` turns false on the next check.
    pub fn request_close(&mut self) {
        if self.state == EngineState::Running {
            self.platform.request_close();
        }
    }

    /// Processes pending OS events without blocking and forwards resizes.
    pub fn poll_events(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(event_loop) = self.event_loop.as_mut() {
            self.platform.pump(event_loop);
        }

        let events: Vec<PlatformEvent> = self.platform.drain_events().collect();
        for event in events {
            match event {
                PlatformEvent::Resized { width, height } => self.resize(width, height),
                PlatformEvent::CloseRequested => log::info!("window close requested"),
            }
        }
    }

    pub fn begin_frame(&mut self) -> Result<(), EngineError> {
        let renderer = self.renderer()?;
        renderer.begin_frame()?;

        let now = Instant::now();
        if let Some(last) = self.last_frame.replace(now) {
            self.delta_time = now.duration_since(last).as_secs_f32();
        }
        Ok(())
    }

    pub fn end_frame(&mut self) -> Result<(), EngineError> {
        self.renderer()?.end_frame()?;
        Ok(())
    }

    /// Forwards framebuffer dimensions to the renderer unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self.renderer.as_deref_mut() {
            Some(renderer) => renderer.resize(width, height),
            None => log::debug!("resize to {width}x{height} before init ignored"),
        }
    }

    pub fn renderer(&mut self) -> Result<&mut dyn Renderer, EngineError> {
        if self.state != EngineState::Running {
            return Err(EngineError::NotInitialized);
        }
        match self.renderer.as_deref_mut() {
            Some(renderer) => Ok(renderer),
            None => Err(EngineError::NotInitialized),
        }
    }

    pub fn audio(&mut self) -> Option<&mut Audio> {
        self.audio.as_mut()
    }

    /// Loops `sound_name`, resolved against the resource directory.
    pub fn play_bgm(&mut self, sound_name: &str) -> Result<(), EngineError> {
        let (Some(dir), Some(audio)) = (self.resource_dir.as_deref(), self.audio.as_mut()) else {
            return Err(EngineError::NotInitialized);
        };
        audio.play_bgm(&resolve_resource(dir, sound_name))?;
        Ok(())
    }

    pub fn resource_dir(&self) -> Option<&Path> {
        self.resource_dir.as_deref()
    }

    pub fn window(&self) -> Option<&Window> {
        self.platform.window().map(|w| &**w)
    }

    /// Seconds between the two most recent `begin_frame` calls.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.state == EngineState::Running {
            self.shutdown();
        }
    }
}
