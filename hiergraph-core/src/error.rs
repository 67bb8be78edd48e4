//! Typed error handling for hiergraph.
//!
//! Library functions return [`HierResult`]; the CLI wraps these in
//! `anyhow` for context chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for hiergraph operations.
#[derive(Error, Debug)]
pub enum HierError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A source unit could not be parsed
    #[error("Parse error in {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) of the first syntax error, if known
        line: Option<usize>,
    },

    /// The requested target type matched nothing in the scanned universe.
    ///
    /// Fatal for a run: no partial output is produced.
    #[error("no such type: {target}")]
    TargetNotFound { target: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Rendering failed (formatter errors, serialization)
    #[error("Render error: {message}")]
    Render { message: String },
}

impl HierError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Create a parse error pointing at a line.
    pub fn parse_at(path: impl Into<PathBuf>, message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create a target-not-found error.
    pub fn target_not_found(target: impl Into<String>) -> Self {
        Self::TargetNotFound {
            target: target.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

impl From<std::fmt::Error> for HierError {
    fn from(err: std::fmt::Error) -> Self {
        Self::render(err.to_string())
    }
}

/// Convenience type alias for hiergraph results.
pub type HierResult<T> = Result<T, HierError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> HierResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> HierResult<T> {
        self.map_err(|e| HierError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_io_error() {
        let err = HierError::io(
            PathBuf::from("/game/Player.cs"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, HierError::Io { ref path, .. } if path == Path::new("/game/Player.cs")));
        assert!(err.to_string().contains("/game/Player.cs"));
    }

    #[test]
    fn test_parse_error_with_line() {
        let err = HierError::parse_at("Scripts/Enemy.cs", "syntax error", 12);
        if let HierError::Parse { line, .. } = &err {
            assert_eq!(*line, Some(12));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_target_not_found_message() {
        let err = HierError::target_not_found("Ghost");
        assert_eq!(err.to_string(), "no such type: Ghost");
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let err = result.with_path("/missing/Base.cs").unwrap_err();
        assert!(matches!(err, HierError::Io { ref path, .. } if path == Path::new("/missing/Base.cs")));
    }
}
