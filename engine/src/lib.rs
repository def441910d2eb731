//! Nyanchu engine crate.
//!
//! Wires a winit window, a renderer backend and rodio audio behind the
//! [`Engine`] façade. The game drives the frame loop itself:
//! `poll_events` → `begin_frame` → draw → `end_frame`.

pub mod audio;
pub mod config;
mod context;
mod error;
pub mod logging;
pub mod platform;
pub mod render;

pub use audio::{Audio, AudioError};
pub use config::{EngineConfig, LoggingConfig};
pub use context::{Engine, EngineState};
pub use error::EngineError;
pub use render::{Camera, Mesh, Renderer, RendererBackend, RendererError, Vertex};
