use thiserror::Error;
use wasm_bindgen::JsValue;

/// Rejected geometric input: tessellation parameters or camera pose.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("segment count must be even and at least 2, got {0}")]
    InvalidSegments(u32),

    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("max polar angle must lie in (0, pi], got {0}")]
    InvalidMaxTheta(f32),

    #[error("camera eye, target and up vector are collinear")]
    DegeneratePose,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("could not create {0} buffer")]
    BufferAllocation(&'static str),

    #[error("malformed triangle batch: {0}")]
    MalformedBatch(String),

    #[error("geometry: {0}")]
    Geometry(#[from] GeometryError),
}

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("rendering context unavailable: {0}")]
    Context(String),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Config(err.to_string())
    }
}

impl From<JsValue> for ViewerError {
    fn from(value: JsValue) -> Self {
        ViewerError::Dom(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

impl From<ViewerError> for JsValue {
    fn from(err: ViewerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
