//! Error types for the CLI

use std::path::Path;

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest could not be read or is malformed
    #[error("Invalid manifest {path}: {message}")]
    Manifest {
        /// Manifest path
        path: String,
        /// Error message
        message: String,
    },

    /// Manifest has no string `version` field
    #[error("Manifest {path} has no version")]
    MissingVersion {
        /// Manifest path
        path: String,
    },

    /// Extension source directory is missing
    #[error("Source directory not found: {path}")]
    MissingSource {
        /// Directory path
        path: String,
    },

    /// A file the manifest references is absent from the release
    #[error("Release is missing {asset} (referenced by the manifest); pass --wasm-pkg for pkg/ files")]
    MissingAsset {
        /// Manifest-relative path
        asset: String,
    },

    /// Archive writing error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a manifest error
    #[must_use]
    pub fn manifest(path: &Path, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a missing version error
    #[must_use]
    pub fn missing_version(path: &Path) -> Self {
        Self::MissingVersion {
            path: path.display().to_string(),
        }
    }

    /// Create a missing source error
    #[must_use]
    pub fn missing_source(path: &Path) -> Self {
        Self::MissingSource {
            path: path.display().to_string(),
        }
    }

    /// Create a missing asset error
    #[must_use]
    pub fn missing_asset(asset: impl Into<String>) -> Self {
        Self::MissingAsset {
            asset: asset.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error() {
        let err = CliError::manifest(Path::new("src/chrome/manifest.json"), "expected object");
        assert_eq!(
            err.to_string(),
            "Invalid manifest src/chrome/manifest.json: expected object"
        );
    }

    #[test]
    fn test_missing_version_error() {
        let err = CliError::missing_version(Path::new("manifest.json"));
        assert!(err.to_string().contains("no version"));
    }

    #[test]
    fn test_missing_source_error() {
        let err = CliError::missing_source(Path::new("extension/shared"));
        assert!(err.to_string().contains("extension/shared"));
    }

    #[test]
    fn test_missing_asset_error() {
        let err = CliError::missing_asset("pkg/deletudo.js");
        assert!(err.to_string().contains("pkg/deletudo.js"));
        assert!(err.to_string().contains("--wasm-pkg"));
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CliError = io.into();
        assert!(matches!(err, CliError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_json_error_from() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = json.into();
        assert!(matches!(err, CliError::Json(_)));
    }
}
