//! Custom error types for FuncForge.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FunctionId, Language};

/// Top-level error type for the FuncForge orchestrator.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum ForgeError {
    // =========================================================================
    // Load Pipeline Errors
    // =========================================================================
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("image identifier extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    // =========================================================================
    // Execute Path Errors
    // =========================================================================
    #[error("function not found: {0}")]
    FunctionNotFound(FunctionId),

    #[error("run error: {0}")]
    Run(#[from] RunError),

    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("invalid configuration field: {field} - {reason}")]
    ConfigInvalid {
        field: &'static str,
        reason: String,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while unpacking an uploaded archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive: {reason}")]
    Open { reason: String },

    #[error("failed to read archive entry {index}: {reason}")]
    Entry { index: usize, reason: String },

    #[error("archive entry escapes the extraction root: {name}")]
    UnsafeEntryPath { name: String },

    #[error("failed to write archive entry to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while looking for the function's entry point.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("no recognized handler file in {dir}")]
    NoHandlerFound { dir: PathBuf },

    #[error("failed to scan {dir}: {source}")]
    Scan {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the build-template store.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no build template for language '{language}' at {path}")]
    NotFound { language: Language, path: PathBuf },

    #[error("malformed build template for language '{language}': {message}")]
    Parse { language: Language, message: String },

    #[error("build template for language '{language}' has no handler placeholder")]
    MissingPlaceholder { language: Language },
}

/// Errors raised by the container engine's build operation.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to invoke container engine build: {reason}")]
    Invocation { reason: String },

    #[error("container engine build exceeded the {secs}s deadline")]
    DeadlineExceeded { secs: u64 },

    #[error("container engine build failed (status {status:?}):\n{output}")]
    Failed { status: Option<i32>, output: String },
}

/// Errors raised while recovering the image identifier from build output.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no image-write marker with a content-address token in build output")]
    ImageIdNotFound,

    #[error("invalid image identifier '{value}': {reason}")]
    InvalidImageId { value: String, reason: &'static str },
}

/// Errors raised by the container engine's run operation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to invoke container engine run: {reason}")]
    Invocation { reason: String },

    #[error("container run exceeded the {secs}s deadline")]
    DeadlineExceeded { secs: u64 },

    #[error("container run failed (status {status:?}):\n{output}")]
    Failed { status: Option<i32>, output: String },
}

/// Result type alias using ForgeError.
pub type ForgeResult<T> = Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_entry_display() {
        let err = ArchiveError::UnsafeEntryPath {
            name: "../../etc/passwd".to_string(),
        };
        assert!(err.to_string().contains("../../etc/passwd"));
    }

    #[test]
    fn test_error_chain() {
        let build_err = BuildError::DeadlineExceeded { secs: 300 };
        let forge_err: ForgeError = build_err.into();
        assert!(matches!(forge_err, ForgeError::Build(_)));
        assert!(forge_err.to_string().contains("300"));
    }

    #[test]
    fn test_template_error_display() {
        let err = TemplateError::MissingPlaceholder {
            language: Language::Python,
        };
        assert!(err.to_string().contains("python"));
    }
}
