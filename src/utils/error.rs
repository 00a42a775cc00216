//! Error handling for callweave

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Weaver error
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Input Errors ====================

    #[error("IO error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Malformed JSON in {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("Compiled unit not found: {name}")]
    UnitNotFound { name: String },

    // ==================== Rewrite Errors ====================

    #[error("Malformed method body in {method}: {message}")]
    MalformedBody { method: String, message: String },

    #[error("Rule '{rule}' failed in {method}: {message}")]
    Rule {
        rule: String,
        method: String,
        message: String,
    },

    #[error("Weaver '{weaver}' failed on unit {unit}: {source}")]
    Weaver {
        weaver: String,
        unit: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build an IO error carrying the offending path
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Build a JSON error carrying the offending path
    pub fn json(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Build a malformed-body error for a method
    pub fn malformed(method: &str, message: impl Into<String>) -> Self {
        Self::MalformedBody {
            method: method.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error came out of rule execution rather than input handling
    pub fn is_rewrite_error(&self) -> bool {
        match self {
            Self::MalformedBody { .. } | Self::Rule { .. } => true,
            Self::Weaver { source, .. } => source.is_rewrite_error(),
            Self::Io { .. } | Self::Json { .. } | Self::UnitNotFound { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weaver_error_wraps_rule_error() {
        let inner = Error::malformed("Foo::Bar()", "local index 4 out of range");
        let err = Error::Weaver {
            weaver: "network-capture".to_string(),
            unit: "Game".to_string(),
            source: Box::new(inner),
        };
        assert!(err.is_rewrite_error());
        assert!(err.to_string().contains("network-capture"));
        assert!(err.to_string().contains("local index 4"));
    }

    #[test]
    fn test_io_error_is_not_rewrite_error() {
        let err = Error::io(
            "Library/Game.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!err.is_rewrite_error());
        assert!(err.to_string().contains("Library/Game.json"));
    }
}
