use std::fmt;

use crate::gfx::Gl;

/// Code returned by the backend when no error is pending.
pub const NO_ERROR: u32 = 0;

/// Upper bound on error reads per check. A lost context can keep reporting
/// the same code forever.
pub const MAX_PENDING_ERRORS: usize = 32;

/// Known OpenGL error codes, plus a catch-all for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlErrorKind {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    StackOverflow,
    StackUnderflow,
    OutOfMemory,
    InvalidFramebufferOperation,
    ContextLost,
    TableTooLarge,
    Unknown(u32),
}

impl GlErrorKind {
    /// Maps a raw code onto a kind. Total: unrecognised codes become
    /// [`GlErrorKind::Unknown`].
    pub fn from_code(code: u32) -> Self {
        match code {
            0x0500 => Self::InvalidEnum,
            0x0501 => Self::InvalidValue,
            0x0502 => Self::InvalidOperation,
            0x0503 => Self::StackOverflow,
            0x0504 => Self::StackUnderflow,
            0x0505 => Self::OutOfMemory,
            0x0506 => Self::InvalidFramebufferOperation,
            0x0507 => Self::ContextLost,
            0x8031 => Self::TableTooLarge,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::InvalidEnum => 0x0500,
            Self::InvalidValue => 0x0501,
            Self::InvalidOperation => 0x0502,
            Self::StackOverflow => 0x0503,
            Self::StackUnderflow => 0x0504,
            Self::OutOfMemory => 0x0505,
            Self::InvalidFramebufferOperation => 0x0506,
            Self::ContextLost => 0x0507,
            Self::TableTooLarge => 0x8031,
            Self::Unknown(code) => code,
        }
    }

    /// Symbolic name as spelled in the GL headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidEnum => "GL_INVALID_ENUM",
            Self::InvalidValue => "GL_INVALID_VALUE",
            Self::InvalidOperation => "GL_INVALID_OPERATION",
            Self::StackOverflow => "GL_STACK_OVERFLOW",
            Self::StackUnderflow => "GL_STACK_UNDERFLOW",
            Self::OutOfMemory => "GL_OUT_OF_MEMORY",
            Self::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            Self::ContextLost => "GL_CONTEXT_LOST",
            Self::TableTooLarge => "GL_TABLE_TOO_LARGE",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Long-form description, after the Khronos wiki's error page.
    pub fn description(self) -> &'static str {
        match self {
            Self::InvalidEnum => {
                "An enumeration parameter is not a legal enumeration for that function. \
                 Only raised for local problems; if the enumeration is legal in other \
                 circumstances GL_INVALID_OPERATION is raised instead."
            }
            Self::InvalidValue => {
                "A value parameter is not a legal value for that function. Only raised \
                 for local problems; if the value is legal in other circumstances \
                 GL_INVALID_OPERATION is raised instead."
            }
            Self::InvalidOperation => {
                "The set of state for a command is not legal for the parameters given \
                 to that command, or the combination of parameters is illegal."
            }
            Self::StackOverflow => {
                "A stack pushing operation cannot be done because it would overflow \
                 the limit of that stack's size."
            }
            Self::StackUnderflow => {
                "A stack popping operation cannot be done because the stack is already \
                 at its lowest point."
            }
            Self::OutOfMemory => {
                "An operation that can allocate memory could not allocate it. The \
                 results of the failing command are undefined and it may have partially \
                 executed."
            }
            Self::InvalidFramebufferOperation => {
                "Attempted to read from or render to a framebuffer that is not complete."
            }
            Self::ContextLost => {
                "The context has been lost due to a graphics card reset (OpenGL 4.5 or \
                 KHR_robustness)."
            }
            Self::TableTooLarge => {
                "Part of the ARB_imaging extension. Deprecated in 3.0 and removed in 3.1 \
                 core and above."
            }
            Self::Unknown(_) => "",
        }
    }
}

impl fmt::Display for GlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Drains every error the backend has queued and logs each one against
/// `call`, the source text of the command that was just issued.
///
/// Advisory only: nothing is returned to abort on. The count is for callers
/// that want to keep statistics.
pub fn check_errors<G: Gl + ?Sized>(gl: &G, call: &str) -> usize {
    let mut reported = 0;
    while reported < MAX_PENDING_ERRORS {
        let code = gl.get_error();
        if code == NO_ERROR {
            break;
        }
        let kind = GlErrorKind::from_code(code);
        tracing::error!(
            call,
            index = reported,
            name = kind.name(),
            code,
            description = kind.description(),
            "graphics call raised an error"
        );
        reported += 1;
    }
    if reported == MAX_PENDING_ERRORS {
        tracing::warn!(call, "stopped draining graphics errors after {MAX_PENDING_ERRORS} reads");
    }
    reported
}

/// Runs a graphics call and reports whatever errors it queued, tagged with
/// the call's source text. Evaluates to the call's value.
///
/// ```ignore
/// gl_check!(gl, gl.clear_color_buffer());
/// ```
#[macro_export]
macro_rules! gl_check {
    ($gl:expr, $call:expr) => {{
        let value = $call;
        $crate::diagnostics::check_errors($gl, stringify!($call));
        value
    }};
}
