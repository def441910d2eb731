//! Renderer abstraction and backends.
//!
//! `Renderer` is the engine-facing contract. Backends are selected by
//! `RendererBackend` and built through [`create_renderer`].
//!
//! Frame protocol: `begin_frame` → any number of `draw_*` → `end_frame`.
//! Draws issued outside an open frame are dropped.

mod camera;
mod color;
mod error;
mod graphics;
mod headless;
mod mesh;

use std::sync::Arc;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use winit::window::Window;

use crate::config::RendererConfig;

pub use camera::Camera;
pub use color::ClearColor;
pub use error::{MeshError, RendererError};
pub use graphics::WgpuRenderer;
pub use headless::{HeadlessRenderer, RecordedDraw};
pub use mesh::{Mesh, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    /// GPU rendering through wgpu; the runtime picks Vulkan/Metal/DX12/GL.
    Wgpu,
    /// No GPU work; records frames and draws.
    Headless,
}

/// What a renderer draws into.
#[derive(Debug, Clone)]
pub enum RenderSurface {
    Window(Arc<Window>),
    Offscreen,
}

pub trait Renderer {
    /// Starts the backend and sets the clear state and viewport to `width` x `height`.
    fn initialize(
        &mut self,
        surface: RenderSurface,
        width: u32,
        height: u32,
    ) -> Result<(), RendererError>;

    /// Releases backend resources. Safe to call repeatedly.
    fn shutdown(&mut self);

    fn begin_frame(&mut self) -> Result<(), RendererError>;

    fn end_frame(&mut self) -> Result<(), RendererError>;

    fn draw_mesh(&mut self, mesh: &Mesh, model: Mat4);

    /// Draws the built-in triangle in clip space.
    fn draw_triangle(&mut self);

    fn draw_cube(&mut self, model: Mat4);

    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn set_camera(&mut self, camera: Camera);

    fn backend(&self) -> RendererBackend;
}

/// Builds the backend named in `config`. The result still needs `initialize`.
pub fn create_renderer(config: &RendererConfig) -> Box<dyn Renderer> {
    match config.backend {
        RendererBackend::Wgpu => Box::new(WgpuRenderer::new(config)),
        RendererBackend::Headless => Box::new(HeadlessRenderer::new()),
    }
}
