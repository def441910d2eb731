use glam::Mat4;

use super::{Camera, Mesh, RenderSurface, Renderer, RendererBackend, RendererError};

/// A draw captured by [`HeadlessRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedDraw {
    Triangle,
    Cube { model: Mat4 },
    Mesh { index_count: u32, model: Mat4 },
}

/// Renderer that does no GPU work.
///
/// Follows the same frame protocol as the GPU backend and keeps enough
/// bookkeeping to assert on it, so the engine can run in CI or tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    initialized: bool,
    in_frame: bool,
    size: (u32, u32),
    camera: Camera,
    pending: Vec<RecordedDraw>,
    last_frame: Vec<RecordedDraw>,
    frames_submitted: u64,
    last_resize: Option<(u32, u32)>,
    resize_count: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Draws submitted by the most recent `end_frame`.
    pub fn last_frame(&self) -> &[RecordedDraw] {
        &self.last_frame
    }

    /// Dimensions passed to the most recent `resize`.
    pub fn last_resize(&self) -> Option<(u32, u32)> {
        self.last_resize
    }

    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    fn record(&mut self, draw: RecordedDraw) {
        if self.in_frame {
            self.pending.push(draw);
        } else {
            log::debug!("headless: draw outside of a frame dropped");
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn initialize(
        &mut self,
        _surface: RenderSurface,
        width: u32,
        height: u32,
    ) -> Result<(), RendererError> {
        if self.initialized {
            return Err(RendererError::AlreadyInitialized);
        }
        self.initialized = true;
        self.size = (width, height);
        log::info!("headless renderer initialized ({width}x{height})");
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.in_frame = false;
        self.pending.clear();
        log::info!("headless renderer shutdown");
    }

    fn begin_frame(&mut self) -> Result<(), RendererError> {
        if !self.initialized {
            return Err(RendererError::NotInitialized);
        }
        if self.in_frame {
            return Err(RendererError::FrameInProgress);
        }
        self.in_frame = true;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RendererError> {
        if !self.initialized {
            return Err(RendererError::NotInitialized);
        }
        if !self.in_frame {
            return Err(RendererError::NoActiveFrame);
        }
        self.in_frame = false;
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_submitted += 1;
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &Mesh, model: Mat4) {
        self.record(RecordedDraw::Mesh {
            index_count: mesh.index_count(),
            model,
        });
    }

    fn draw_triangle(&mut self) {
        self.record(RecordedDraw::Triangle);
    }

    fn draw_cube(&mut self, model: Mat4) {
        self.record(RecordedDraw::Cube { model });
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.last_resize = Some((width, height));
        self.resize_count += 1;
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn backend(&self) -> RendererBackend {
        RendererBackend::Headless
    }
}
