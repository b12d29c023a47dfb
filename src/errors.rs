use thiserror::Error;

/// The result type for the `grpr` crate.
pub type Result<T> = std::result::Result<T, GrprError>;

/// The error type for the `grpr` crate.
#[derive(Error, Debug)]
pub struct GrprError {
    /// The source of the error.
    pub source: Box<GrprErrorKind>,
}

impl GrprError {
    /// Create a new `GrprError`.
    pub fn new(kind: GrprErrorKind) -> Self {
        GrprError {
            source: Box::new(kind),
        }
    }

    /// Create a new pattern syntax error.
    pub(crate) fn syntax(pattern: &str, message: impl Into<String>, offset: usize) -> Self {
        GrprError::new(GrprErrorKind::Syntax {
            pattern: pattern.to_string(),
            message: message.into(),
            offset,
        })
    }
}

impl std::fmt::Display for GrprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum GrprErrorKind {
    /// The pattern is not a well-formed regular expression.
    #[error("'{pattern}': {message} at offset {offset}")]
    Syntax {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        message: String,
        /// Byte offset into the pattern where the problem was detected.
        offset: usize,
    },

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl From<std::io::Error> for GrprError {
    fn from(error: std::io::Error) -> Self {
        GrprError::new(GrprErrorKind::IoError(error))
    }
}
