//! Error handling for FaceLink
//!
//! Substitution errors abort a single attempt and are retried by the host
//! poller. Configuration errors never abort; callers degrade to passthrough.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for FaceLink operations
pub type Result<T> = std::result::Result<T, FaceLinkError>;

/// Main error type for FaceLink operations
#[derive(Error, Debug)]
pub enum FaceLinkError {
    // Substitution Errors
    #[error("Target facial renderer '{name}' not found under the character root")]
    MissingTargetRenderer { name: String },

    #[error("Root joint '{name}' not found in the host skeleton")]
    MissingRootJoint { name: String },

    // Scene Errors
    #[error("Unknown scene node: {index}")]
    UnknownNode { index: usize },

    #[error("Unknown renderer: {index}")]
    UnknownRenderer { index: usize },

    #[error("Scene node {index} is its own ancestor")]
    CyclicHierarchy { index: usize },

    // Configuration Errors
    #[error("Config parse error: {reason}")]
    ConfigParse { reason: String },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FaceLinkError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FaceLinkError::MissingTargetRenderer { .. } => "MISSING_TARGET_RENDERER",
            FaceLinkError::MissingRootJoint { .. } => "MISSING_ROOT_JOINT",
            FaceLinkError::UnknownNode { .. } => "UNKNOWN_NODE",
            FaceLinkError::UnknownRenderer { .. } => "UNKNOWN_RENDERER",
            FaceLinkError::CyclicHierarchy { .. } => "CYCLIC_HIERARCHY",
            FaceLinkError::ConfigParse { .. } => "CONFIG_PARSE_ERROR",
            FaceLinkError::FileReadError { .. } => "FILE_READ_ERROR",
            FaceLinkError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            FaceLinkError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            FaceLinkError::Io(_) => "IO_ERROR",
            FaceLinkError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors either get retried on a later frame (substitution)
    /// or degrade to safe defaults (configuration).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FaceLinkError::MissingTargetRenderer { .. }
                | FaceLinkError::MissingRootJoint { .. }
                | FaceLinkError::ConfigParse { .. }
                | FaceLinkError::FileReadError { .. }
                | FaceLinkError::Serialization(_)
        )
    }
}

/// Non-fatal conditions collected while substituting a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionWarning {
    /// The forced shader could not be resolved; the part keeps its materials
    ShaderResolution { part: String, shader: String },
}

impl fmt::Display for SubstitutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionWarning::ShaderResolution { part, shader } => write!(
                f,
                "Shader '{}' not found for part '{}', materials may render incorrectly",
                shader, part
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = FaceLinkError::MissingRootJoint {
            name: "Character_Hips".to_string(),
        };
        assert_eq!(err.error_code(), "MISSING_ROOT_JOINT");
        assert!(err.to_string().contains("Character_Hips"));
    }

    #[test]
    fn test_substitution_errors_are_recoverable() {
        let err = FaceLinkError::MissingTargetRenderer {
            name: "Face".to_string(),
        };
        assert!(err.is_recoverable());

        let err = FaceLinkError::UnknownNode { index: 3 };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_warning_display() {
        let warning = SubstitutionWarning::ShaderResolution {
            part: "Hair".to_string(),
            shader: "Lit".to_string(),
        };
        assert!(warning.to_string().contains("Hair"));
    }
}
