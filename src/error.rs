use thiserror::Error;
use std::fmt;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanicError {
    #[error("Line {line}, col {column}: {message}")]
    Syntax { line: usize, column: usize, message: String },

    #[error("Line {line}, col {column}: {message}")]
    Semantic { line: usize, column: usize, message: String },
}

impl PanicError {
    pub fn message(&self) -> &str {
        match self {
            PanicError::Syntax { message, .. } | PanicError::Semantic { message, .. } => message,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            PanicError::Syntax { line, column, .. } | PanicError::Semantic { line, column, .. } => {
                SourceLocation { line: *line, column: *column }
            }
        }
    }
}

pub type PanicResult<T> = Result<T, PanicError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub fn syntax_error(loc: SourceLocation, message: impl Into<String>) -> PanicError {
    PanicError::Syntax {
        line: loc.line,
        column: loc.column,
        message: message.into(),
    }
}

pub fn semantic_error(loc: SourceLocation, message: impl Into<String>) -> PanicError {
    PanicError::Semantic {
        line: loc.line,
        column: loc.column,
        message: message.into(),
    }
}
