use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer used before initialize()")]
    NotInitialized,

    #[error("renderer is already initialized")]
    AlreadyInitialized,

    #[error("this backend needs a window to render into")]
    MissingWindow,

    #[error("begin_frame() called while a frame is in progress")]
    FrameInProgress,

    #[error("end_frame() called without a matching begin_frame()")]
    NoActiveFrame,

    #[error("failed to create GPU surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("unrecoverable surface error")]
    Surface(#[source] wgpu::SurfaceError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no indices")]
    Empty,

    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
