use thiserror::Error;

/// Programmer errors raised by the core. User input never produces these;
/// out-of-range values are clamped instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("magnitude level {0} is not a non-negative integer")]
    InvalidLevel(f64),
    #[error("magnitude level {level} outside [{min}, {max}]")]
    LevelOutOfRange { level: i64, min: u8, max: u8 },
    #[error("viewport width {0} must be finite and positive")]
    InvalidViewport(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Failures reported by a render backend. Any of these degrades the session
/// to the fallback path; none of them is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("rendering context lost")]
    ContextLost,
    #[error("surface error: {0}")]
    Surface(String),
    #[error("draw failed: {0}")]
    Draw(String),
}
