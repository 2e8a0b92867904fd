//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by pipeline stage
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Build Artifact Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid build directory {path}: {reason}")]
    BuildDirInvalid { path: PathBuf, reason: String },

    #[error("Failed to extract compile flags from {path}: {message}")]
    FlagExtraction { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Editor Config Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration file {path} is not valid JSON: {message}")]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("Configuration file {path} has an unexpected structure: {message}")]
    ConfigSchema { path: PathBuf, message: String },

    #[error("No configuration entry named {name:?} in {path}")]
    EntryNotFound { name: String, path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Tool Settings Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Settings error: {message}")]
    Settings { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn build_dir_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BuildDirInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn flag_extraction(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FlagExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigMalformed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigSchema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn entry_not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::EntryNotFound {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Check whether the error happened before any file was modified.
    ///
    /// Every variant except [`Error::Io`] is raised strictly before the
    /// write step, so a failed run leaves the editor config untouched.
    pub fn is_pre_write(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::build_dir_invalid("/proj/build", "no build artifacts");
        assert_eq!(
            err.to_string(),
            "Invalid build directory /proj/build: no build artifacts"
        );

        let err = Error::entry_not_found("Mbed", "/proj/.vscode/c_cpp_properties.json");
        assert!(err.to_string().contains("\"Mbed\""));
        assert!(err.to_string().contains("c_cpp_properties.json"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_constructors() {
        let _ = Error::build_dir_invalid("/b", "missing");
        let _ = Error::flag_extraction("/b/compile_commands.json", "bad json");
        let _ = Error::config_not_found("/c.json");
        let _ = Error::config_malformed("/c.json", "expected value at line 1");
        let _ = Error::config_schema("/c.json", "configurations is not an array");
        let _ = Error::entry_not_found("Mbed", "/c.json");
        let _ = Error::settings("missing mbed_target");
    }

    #[test]
    fn test_error_is_pre_write() {
        assert!(Error::config_not_found("/c.json").is_pre_write());
        assert!(Error::entry_not_found("Mbed", "/c.json").is_pre_write());
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io_err).is_pre_write());
    }

    #[test]
    fn test_config_malformed_keeps_parser_message() {
        let err = Error::config_malformed("/c.json", "key must be a string at line 3 column 5");
        assert!(err.to_string().contains("line 3 column 5"));
    }
}
