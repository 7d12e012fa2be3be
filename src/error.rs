use std::path::PathBuf;

/// Errors that can occur while loading a scene or presenting frames.
/// Rendering itself never fails, degenerate geometry is skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an OBJ mesh file.
    #[error("OBJ parse error for {path}: {message}")]
    ObjParse { path: PathBuf, message: String },

    /// Face indices that do not point into the mesh arrays.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Failed to encode or save the rendered image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Window creation, event channel or image upload failed.
    #[error("Window error: {0}")]
    Window(String),

    /// Camera parameters were rejected.
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
}

/// Projection or look-at parameters that would produce a degenerate matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("near and far clip planes coincide ({0})")]
    CoincidentClipPlanes(f32),

    #[error("{axis} bounds are equal ({value})")]
    EmptyVolume { axis: &'static str, value: f32 },

    #[error("aspect ratio must be positive, got {0}")]
    InvalidAspect(f32),

    #[error("field of view must be in (0, pi), got {0}")]
    InvalidFieldOfView(f32),

    #[error("perspective near plane must be positive, got {0}")]
    InvalidNear(f32),

    #[error("eye and target coincide")]
    CoincidentEye,

    #[error("up vector is parallel to the view direction")]
    ParallelUp,
}
