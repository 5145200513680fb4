use crate::path::Path;

/// Syntax error with a 1-based source position
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot read source")]
    Io(#[from] std::io::Error),
    #[error("invalid syntax")]
    Parse(#[from] ParseError),
}

/// A value somewhere in the tree evaluated to bottom
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: Path,
    pub reason: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FillError {
    #[error("no value at path {0}")]
    NotFound(Path),
    #[error("conflicting values at {path}: {reason}")]
    Conflict { path: Path, reason: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("unterminated string in attribute @{key}({body})")]
    UnterminatedString { key: String, body: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("incomplete value at {path}: {value}")]
    Incomplete { path: Path, value: String },
    #[error("invalid value at {path}: {reason}")]
    Invalid { path: Path, reason: String },
}
