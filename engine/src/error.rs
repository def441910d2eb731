use thiserror::Error;

use crate::audio::AudioError;
use crate::render::RendererError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not initialized")]
    NotInitialized,

    #[error("engine is already initialized")]
    AlreadyInitialized,

    #[error("engine has been shut down")]
    ShutDown,

    #[error("failed to create event loop")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window")]
    WindowCreation(#[source] winit::error::OsError),

    #[error("platform never delivered a window")]
    WindowUnavailable,

    #[error("renderer error")]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("failed to resolve resource directory")]
    ResourceDir(#[source] std::io::Error),
}
