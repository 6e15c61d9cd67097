use crate::gfx::ShaderStage;

/// Result alias that carries the custom [`QuadtoneError`] type.
pub type Result<T> = std::result::Result<T, QuadtoneError>;

/// Fatal error type for the core crate.
///
/// Everything in here ends startup. Graphics errors raised after a successful
/// startup are advisory and go through [`crate::diagnostics`] instead.
#[derive(Debug, thiserror::Error)]
pub enum QuadtoneError {
    /// A platform capability (subsystem, audio device, window, context) could
    /// not be acquired.
    #[error("{stage}: {message}")]
    Platform {
        stage: &'static str,
        message: String,
    },
    /// A shader stage was rejected by the driver's compiler.
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    /// Both stages compiled but the program did not link.
    #[error("shader program failed to link:\n{log}")]
    ProgramLink { log: String },
    /// The backend refused to allocate a graphics object.
    #[error("{0}")]
    GlCreate(String),
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
}

impl QuadtoneError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates a platform error tagged with the startup stage that failed.
    pub fn platform<T: Into<String>>(stage: &'static str, message: T) -> Self {
        Self::Platform {
            stage,
            message: message.into(),
        }
    }
}

impl From<&str> for QuadtoneError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for QuadtoneError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
