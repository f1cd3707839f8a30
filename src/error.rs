use thiserror::Error;

/// A configuration override that could not be used
#[derive(Debug, Error, PartialEq)]
#[error("invalid value {value:?} for {var}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Native startup failures. The running game itself has no error paths.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no usable texture format")]
    SurfaceUnsupported,
}
